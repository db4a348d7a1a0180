//! Detect existing bookings that collide with a candidate time range.
//!
//! A conflict is an allocation on the inspected resource whose event overlaps
//! the candidate range (see [`TimeRange::overlaps`]). Adjacent bookings, where
//! one ends exactly when the other starts, are NOT conflicts.
//!
//! Finding conflicts is never an error. An empty list means the candidate fits;
//! a non-empty list is for the caller to present and decide on.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Allocation, Event, EventId, Resource, ResourceId};
use crate::range::TimeRange;
use crate::store::BookingStore;

/// An existing booking that overlaps a candidate range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub allocation: Allocation,
    pub event: Event,
    pub resource: Resource,
}

/// Find the bookings on `resource_id` that overlap `candidate`.
///
/// When `exclude_event_id` is set, allocations of that event are skipped. This
/// is how an event being edited avoids colliding with its own prior bookings.
///
/// # Errors
/// Returns `BookingError::NotFound` if the resource does not exist.
pub fn find_conflicts<S>(
    store: &S,
    resource_id: ResourceId,
    candidate: &TimeRange,
    exclude_event_id: Option<EventId>,
) -> Result<Vec<Conflict>>
where
    S: BookingStore + ?Sized,
{
    let resource = store.resource(resource_id)?;
    let mut conflicts = Vec::new();

    for booking in store.allocations_for_resource(resource_id)? {
        if Some(booking.event.id) == exclude_event_id {
            continue;
        }
        if booking.event.range()?.overlaps(candidate) {
            conflicts.push(Conflict {
                allocation: booking.allocation,
                event: booking.event,
                resource: resource.clone(),
            });
        }
    }

    debug!(
        "resource {} has {} conflict(s) with {:?}",
        resource_id,
        conflicts.len(),
        candidate
    );
    Ok(conflicts)
}

/// Run [`find_conflicts`] for every resource in `resource_ids` and concatenate
/// the results, in the order the resources were given.
///
/// # Errors
/// Returns `BookingError::NotFound` for the first resource id that does not
/// exist; no partial result is returned.
pub fn find_conflicts_for_resources<S>(
    store: &S,
    candidate: &TimeRange,
    resource_ids: &[ResourceId],
    exclude_event_id: Option<EventId>,
) -> Result<Vec<Conflict>>
where
    S: BookingStore + ?Sized,
{
    let mut conflicts = Vec::new();
    for &resource_id in resource_ids {
        conflicts.extend(find_conflicts(store, resource_id, candidate, exclude_event_id)?);
    }
    Ok(conflicts)
}
