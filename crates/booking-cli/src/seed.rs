//! Sample data for trying the scheduler out.
//!
//! The sample events lie on 2025-12-20 and are written straight into the
//! store, so they are accepted even once that date has passed.

use anyhow::{bail, Result};
use booking_engine::{BookingStore, MemoryStore, NewEvent, NewResource, ResourceType};
use chrono_tz::Tz;
use log::info;

use crate::time::parse_datetime;

const RESOURCES: [(&str, ResourceType); 4] = [
    ("Conference Room A", ResourceType::Room),
    ("Conference Room B", ResourceType::Room),
    ("Dr. Smith", ResourceType::Instructor),
    ("Projector", ResourceType::Equipment),
];

const EVENTS: [(&str, &str, &str, &str); 4] = [
    (
        "Python Workshop",
        "2025-12-20T10:00",
        "2025-12-20T12:00",
        "Introduction to Python programming",
    ),
    (
        "Flask Training",
        "2025-12-20T11:00",
        "2025-12-20T13:00",
        "Web development with Flask framework",
    ),
    (
        "Data Science Seminar",
        "2025-12-20T14:00",
        "2025-12-20T16:00",
        "Machine Learning and AI fundamentals",
    ),
    (
        "Database Workshop",
        "2025-12-20T15:00",
        "2025-12-20T17:00",
        "SQL and database design",
    ),
];

/// `(event index, resource index)` pairs; none of them conflict.
const ALLOCATIONS: [(usize, usize); 6] = [(0, 0), (0, 2), (1, 1), (1, 3), (2, 0), (3, 1)];

/// Fill an empty store with the sample data set. Times are local to `tz`.
pub fn seed(store: &mut MemoryStore, tz: Tz) -> Result<()> {
    if !store.is_empty() {
        bail!("Refusing to seed: the data file already contains records");
    }

    let mut resources = Vec::with_capacity(RESOURCES.len());
    for (name, kind) in RESOURCES {
        let resource = store.insert_resource(NewResource {
            name: name.to_string(),
            kind,
        })?;
        resources.push(resource.id);
    }

    let mut events = Vec::with_capacity(EVENTS.len());
    for (title, start, end, description) in EVENTS {
        let event = store.insert_event(NewEvent {
            title: title.to_string(),
            start: parse_datetime(start, tz)?,
            end: parse_datetime(end, tz)?,
            description: Some(description.to_string()),
        })?;
        events.push(event.id);
    }

    for (event, resource) in ALLOCATIONS {
        store.insert_allocation(events[event], resources[resource])?;
    }

    info!(
        "seeded {} resources, {} events, {} allocations",
        resources.len(),
        events.len(),
        ALLOCATIONS.len()
    );
    Ok(())
}
