//! # booking-engine
//!
//! Conflict-free booking of shared resources (rooms, instructors, equipment)
//! against time-boxed events, plus utilization reporting.
//!
//! The engine owns the rules; persistence sits behind the [`BookingStore`]
//! trait and every function receives its store handle explicitly.
//!
//! ## Modules
//!
//! - [`range`] - Half-open `[start, end)` ranges and the overlap predicate
//! - [`model`] - Events, resources, allocations
//! - [`store`] - Storage contract and the in-memory/JSON store
//! - [`conflict`] - Find bookings colliding with a candidate range
//! - [`utilization`] - Booked hours per resource within a report window
//! - [`scheduler`] - Serialized add/edit/delete/allocate operations
//! - [`error`] - Error types

pub mod conflict;
pub mod error;
pub mod model;
pub mod range;
pub mod scheduler;
pub mod store;
pub mod utilization;

pub use conflict::{find_conflicts, find_conflicts_for_resources, Conflict};
pub use error::{BookingError, EntityKind};
pub use model::{
    Allocation, AllocationId, Booking, Event, EventId, EventUpdate, NewEvent, NewResource,
    Resource, ResourceId, ResourceType,
};
pub use range::{RangeError, TimeRange};
pub use scheduler::{AllocationDetail, AllocationOutcome, EditOutcome, Overview, Scheduler};
pub use store::{BookingStore, MemoryStore};
pub use utilization::{build_utilization_report, ResourceUtilization};
