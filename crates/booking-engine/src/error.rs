//! Error types for booking-engine operations.
//!
//! Resource conflicts are deliberately absent from this taxonomy: a conflict is
//! an expected outcome and is returned as data (see [`crate::conflict`]).

use std::fmt;

use thiserror::Error;

use crate::range::RangeError;

/// The kind of record a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Event,
    Resource,
    Allocation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Event => "event",
            EntityKind::Resource => "resource",
            EntityKind::Allocation => "allocation",
        })
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BookingError {
    #[error("Invalid time range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    #[error("Inconsistent snapshot: {0}")]
    InconsistentSnapshot(String),
}

impl BookingError {
    pub(crate) fn not_found(kind: EntityKind, id: u64) -> Self {
        BookingError::NotFound { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
