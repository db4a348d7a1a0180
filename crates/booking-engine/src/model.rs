//! Records shared between the store, the conflict finder and the report.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};
use crate::range::TimeRange;

pub type EventId = u64;
pub type ResourceId = u64;
pub type AllocationId = u64;

/// Longest accepted event title / resource name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// A titled, time-boxed activity that resources can be booked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    /// The event's time range.
    ///
    /// Events held by a store always satisfy `start < end`; a record violating
    /// that is reported as an inconsistent snapshot.
    pub fn range(&self) -> Result<TimeRange> {
        TimeRange::new(self.start, self.end).map_err(|e| {
            BookingError::InconsistentSnapshot(format!("event {} has an invalid range: {}", self.id, e))
        })
    }
}

/// Field values for creating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Field values replacing those of an existing event.
pub type EventUpdate = NewEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Room,
    Instructor,
    Equipment,
    Other,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Room,
        ResourceType::Instructor,
        ResourceType::Equipment,
        ResourceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Room => "room",
            ResourceType::Instructor => "instructor",
            ResourceType::Equipment => "equipment",
            ResourceType::Other => "other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                BookingError::InvalidInput(format!(
                    "unknown resource type '{}' (expected room, instructor, equipment or other)",
                    s
                ))
            })
    }
}

/// A bookable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

/// A binding of one resource to one event. Unique per `(event_id, resource_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub event_id: EventId,
    pub resource_id: ResourceId,
}

/// An allocation together with the event it books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub allocation: Allocation,
    pub event: Event,
}

/// Trim a title or name and enforce the length limits.
pub(crate) fn normalize_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidInput(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(BookingError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}
