//! Serialized booking operations on top of a [`BookingStore`].
//!
//! [`Scheduler`] owns its store behind a mutex and runs every operation inside
//! a single lock scope. The conflict check and the inserts that follow it
//! therefore form one unit: two callers racing to book the same resource for
//! overlapping events cannot both observe "no conflict".

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::conflict::{find_conflicts_for_resources, Conflict};
use crate::error::{BookingError, Result};
use crate::model::{
    normalize_name, Allocation, AllocationId, Event, EventId, EventUpdate, NewEvent, NewResource,
    Resource, ResourceId,
};
use crate::range::TimeRange;
use crate::store::BookingStore;
use crate::utilization::{build_utilization_report, ResourceUtilization};

/// Number of upcoming events listed by [`Scheduler::overview`].
pub const OVERVIEW_UPCOMING_LIMIT: usize = 5;

/// Result of [`Scheduler::allocate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllocationOutcome {
    /// Every requested resource is now bound to the event.
    Allocated {
        created: Vec<Allocation>,
        already_present: Vec<Allocation>,
    },
    /// Nothing was created because at least one resource is booked elsewhere.
    Blocked { conflicts: Vec<Conflict> },
}

/// Result of [`Scheduler::edit_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Updated { event: Event },
    /// The new time range collides with other bookings of the event's resources.
    /// The event is left unchanged.
    Blocked { conflicts: Vec<Conflict> },
}

/// An allocation with both of its records resolved, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDetail {
    pub allocation: Allocation,
    pub event: Event,
    pub resource: Resource,
}

/// Record counts and the next few events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub event_count: usize,
    pub resource_count: usize,
    pub allocation_count: usize,
    pub upcoming_events: Vec<Event>,
}

pub struct Scheduler<S> {
    store: Mutex<S>,
}

impl<S: BookingStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Give the store back, e.g. to persist it.
    pub fn into_inner(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // Operations mutate only after all of their checks passed, so the store
    // behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Create an event. Its start must not lie before `now`.
    pub fn add_event(&self, event: NewEvent, now: DateTime<Utc>) -> Result<Event> {
        let event = NewEvent {
            title: normalize_name("title", &event.title)?,
            start: event.start,
            end: event.end,
            description: normalize_description(event.description),
        };
        TimeRange::new_upcoming(event.start, event.end, now)?;

        let created = self.lock().insert_event(event)?;
        info!("created event {} '{}'", created.id, created.title);
        Ok(created)
    }

    /// Change an event in place.
    ///
    /// The new range must be increasing but may lie in the past. If the event
    /// holds resources, the new range is checked against the other bookings of
    /// those resources first.
    pub fn edit_event(&self, id: EventId, update: EventUpdate) -> Result<EditOutcome> {
        let title = normalize_name("title", &update.title)?;
        let range = TimeRange::new(update.start, update.end)?;

        let mut store = self.lock();
        store.event(id)?;

        let resource_ids: Vec<ResourceId> = store
            .allocations_for_event(id)?
            .iter()
            .map(|a| a.resource_id)
            .collect();
        if !resource_ids.is_empty() {
            let conflicts = find_conflicts_for_resources(&*store, &range, &resource_ids, Some(id))?;
            if !conflicts.is_empty() {
                warn!(
                    "time change of event {} blocked by {} conflict(s)",
                    id,
                    conflicts.len()
                );
                return Ok(EditOutcome::Blocked { conflicts });
            }
        }

        let event = Event {
            id,
            title,
            start: range.start(),
            end: range.end(),
            description: normalize_description(update.description),
        };
        store.update_event(event.clone())?;
        info!("updated event {}", id);
        Ok(EditOutcome::Updated { event })
    }

    /// Delete an event and, with it, all of its allocations.
    pub fn delete_event(&self, id: EventId) -> Result<usize> {
        let removed = self.lock().delete_event(id)?;
        info!("deleted event {} ({} allocation(s) released)", id, removed);
        Ok(removed)
    }

    pub fn event(&self, id: EventId) -> Result<Event> {
        self.lock().event(id)
    }

    /// All events, latest start first.
    pub fn list_events(&self) -> Vec<Event> {
        let mut events = self.lock().events();
        events.sort_by(|a, b| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
        events
    }

    /// Events that have not ended before `now`, i.e. those resources can still
    /// be allocated to. Earliest start first.
    pub fn allocatable_events(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .lock()
            .events()
            .into_iter()
            .filter(|e| is_allocatable(e, now))
            .collect();
        events.sort_by_key(|e| (e.start, e.id));
        events
    }

    // ── Resources ───────────────────────────────────────────────────────────

    pub fn add_resource(&self, resource: NewResource) -> Result<Resource> {
        let resource = NewResource {
            name: normalize_name("name", &resource.name)?,
            kind: resource.kind,
        };
        let created = self.lock().insert_resource(resource)?;
        info!("created {} resource {} '{}'", created.kind, created.id, created.name);
        Ok(created)
    }

    pub fn edit_resource(&self, id: ResourceId, update: NewResource) -> Result<Resource> {
        let resource = Resource {
            id,
            name: normalize_name("name", &update.name)?,
            kind: update.kind,
        };
        self.lock().update_resource(resource.clone())?;
        info!("updated resource {}", id);
        Ok(resource)
    }

    /// Delete a resource and, with it, all of its allocations.
    pub fn delete_resource(&self, id: ResourceId) -> Result<usize> {
        let removed = self.lock().delete_resource(id)?;
        info!("deleted resource {} ({} allocation(s) released)", id, removed);
        Ok(removed)
    }

    pub fn resource(&self, id: ResourceId) -> Result<Resource> {
        self.lock().resource(id)
    }

    /// All resources, grouped by type, then by name.
    pub fn list_resources(&self) -> Vec<Resource> {
        let mut resources = self.lock().resources();
        resources.sort_by(|a, b| (a.kind, &a.name, a.id).cmp(&(b.kind, &b.name, b.id)));
        resources
    }

    // ── Allocations ─────────────────────────────────────────────────────────

    /// Bind `resource_ids` to an event, all or nothing.
    ///
    /// If any requested resource is booked by another event at an overlapping
    /// time, no allocation is created and the conflicts are returned. Resources
    /// already bound to this event are left as they are. The event's own
    /// bookings are never reported as conflicts, even though a plain
    /// [`find_conflicts_for_resources`] without exclusion would list them.
    ///
    /// # Errors
    /// `InvalidInput` for an empty request or an event that ended before `now`,
    /// `NotFound` for an unknown event or resource. None of them modify the store.
    pub fn allocate(
        &self,
        event_id: EventId,
        resource_ids: &[ResourceId],
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome> {
        let resource_ids = dedup(resource_ids);
        if resource_ids.is_empty() {
            return Err(BookingError::InvalidInput(
                "at least one resource must be selected".to_string(),
            ));
        }

        let mut store = self.lock();
        let event = store.event(event_id)?;
        if !is_allocatable(&event, now) {
            return Err(BookingError::InvalidInput(format!(
                "event {} has already ended",
                event_id
            )));
        }
        let conflicts = allocation_conflicts(&*store, &event, &resource_ids)?;
        if !conflicts.is_empty() {
            warn!(
                "allocation for event {} blocked by {} conflict(s)",
                event_id,
                conflicts.len()
            );
            return Ok(AllocationOutcome::Blocked { conflicts });
        }

        let mut created = Vec::new();
        let mut already_present = Vec::new();
        for resource_id in resource_ids {
            match store.find_allocation(event_id, resource_id) {
                Some(existing) => already_present.push(existing),
                None => created.push(store.insert_allocation(event_id, resource_id)?),
            }
        }
        info!(
            "allocated {} resource(s) to event {} ({} already present)",
            created.len(),
            event_id,
            already_present.len()
        );
        Ok(AllocationOutcome::Allocated {
            created,
            already_present,
        })
    }

    /// The conflicts that would block allocating `resource_ids` to an event.
    pub fn conflicts_for_event(&self, event_id: EventId, resource_ids: &[ResourceId]) -> Result<Vec<Conflict>> {
        let store = self.lock();
        let event = store.event(event_id)?;
        allocation_conflicts(&*store, &event, &dedup(resource_ids))
    }

    pub fn deallocate(&self, id: AllocationId) -> Result<Allocation> {
        let mut store = self.lock();
        let allocation = store.allocation(id)?;
        store.delete_allocation(id)?;
        info!(
            "removed allocation {} (event {}, resource {})",
            id, allocation.event_id, allocation.resource_id
        );
        Ok(allocation)
    }

    pub fn list_allocations(&self) -> Result<Vec<AllocationDetail>> {
        let store = self.lock();
        store
            .allocations()
            .into_iter()
            .map(|allocation| -> Result<AllocationDetail> {
                Ok(AllocationDetail {
                    event: store.event(allocation.event_id)?,
                    resource: store.resource(allocation.resource_id)?,
                    allocation,
                })
            })
            .collect()
    }

    // ── Reports ─────────────────────────────────────────────────────────────

    pub fn utilization_report(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ResourceUtilization>> {
        build_utilization_report(&*self.lock(), window_start, window_end, now)
    }

    pub fn overview(&self, now: DateTime<Utc>) -> Overview {
        let store = self.lock();
        let events = store.events();
        let mut upcoming_events: Vec<Event> =
            events.iter().filter(|e| e.start >= now).cloned().collect();
        upcoming_events.sort_by_key(|e| (e.start, e.id));
        upcoming_events.truncate(OVERVIEW_UPCOMING_LIMIT);

        Overview {
            event_count: events.len(),
            resource_count: store.resources().len(),
            allocation_count: store.allocations().len(),
            upcoming_events,
        }
    }
}

/// Conflicts between `event`'s range and the bookings of `resource_ids`.
///
/// An event never conflicts with its own allocations, which is what makes
/// re-allocating an already bound resource a no-op.
fn allocation_conflicts<S>(store: &S, event: &Event, resource_ids: &[ResourceId]) -> Result<Vec<Conflict>>
where
    S: BookingStore + ?Sized,
{
    let range = event.range()?;
    // Resolve every id before scanning so an unknown resource fails the whole request.
    for &resource_id in resource_ids {
        store.resource(resource_id)?;
    }
    find_conflicts_for_resources(store, &range, resource_ids, Some(event.id))
}

/// Resources can be booked for events that have not ended before `now`.
fn is_allocatable(event: &Event, now: DateTime<Utc>) -> bool {
    event.end >= now
}

fn dedup(ids: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
