//! Per-resource utilization over a reporting window.
//!
//! A booking counts towards a resource when its event touches the window
//! (`event.start <= window_end && event.end >= window_start`). Unlike conflict
//! detection this comparison is inclusive, so an event ending exactly at the
//! window start is still counted, contributing zero hours. Only the part of each
//! event inside the window adds to the hour total.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Event, Resource};
use crate::store::BookingStore;

/// Utilization of one resource within a report window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    pub resource: Resource,
    /// Booked hours clipped to the window, rounded to 2 decimal places.
    pub total_hours: f64,
    /// Number of allocations whose event touches the window.
    pub allocation_count: usize,
    /// Events among those allocations that start at or after the report's `now`.
    pub upcoming_bookings: Vec<Event>,
}

/// Build one [`ResourceUtilization`] per resource in the store, in store order.
///
/// Resources without bookings are included with zero hours. `now` is evaluated
/// once for the whole report.
pub fn build_utilization_report<S>(
    store: &S,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<ResourceUtilization>>
where
    S: BookingStore + ?Sized,
{
    let mut report = Vec::new();

    for resource in store.resources() {
        let bookings: Vec<_> = store
            .allocations_for_resource(resource.id)?
            .into_iter()
            .filter(|b| b.event.start <= window_end && b.event.end >= window_start)
            .collect();

        let mut total_hours = 0.0;
        let mut upcoming_bookings = Vec::new();

        for booking in &bookings {
            if let Some(overlap) = booking.event.range()?.clip(window_start, window_end) {
                total_hours += overlap.hours();
            }
            if booking.event.start >= now {
                upcoming_bookings.push(booking.event.clone());
            }
        }

        debug!(
            "resource {} booked for {:.2}h across {} allocation(s)",
            resource.id,
            total_hours,
            bookings.len()
        );

        report.push(ResourceUtilization {
            resource,
            total_hours: round_hours(total_hours),
            allocation_count: bookings.len(),
            upcoming_bookings,
        });
    }

    Ok(report)
}

fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
