//! The storage contract the engine reads from and writes to.
//!
//! [`BookingStore`] is the only way the conflict finder, the utilization report
//! and the [`Scheduler`](crate::scheduler::Scheduler) reach persisted records;
//! every operation receives its store handle explicitly. [`MemoryStore`] is the
//! bundled implementation. It serializes to JSON and is used as the on-disk
//! snapshot by the CLI and as the input format of the WASM bindings.
//!
//! ## Cascade contract
//!
//! Deleting an event or a resource deletes every allocation referencing it
//! within the same call. Implementations must not leave dangling allocations
//! behind, even transiently, for a caller holding the store.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, EntityKind, Result};
use crate::model::{
    Allocation, AllocationId, Booking, Event, EventId, NewEvent, NewResource, Resource,
    ResourceId,
};

pub trait BookingStore {
    /// All events, in ascending id order.
    fn events(&self) -> Vec<Event>;
    fn event(&self, id: EventId) -> Result<Event>;
    fn insert_event(&mut self, event: NewEvent) -> Result<Event>;
    /// Replace the stored fields of `event.id`.
    fn update_event(&mut self, event: Event) -> Result<()>;
    /// Delete an event and its allocations. Returns the number of allocations removed.
    fn delete_event(&mut self, id: EventId) -> Result<usize>;

    /// All resources, in ascending id order.
    fn resources(&self) -> Vec<Resource>;
    fn resource(&self, id: ResourceId) -> Result<Resource>;
    fn insert_resource(&mut self, resource: NewResource) -> Result<Resource>;
    fn update_resource(&mut self, resource: Resource) -> Result<()>;
    /// Delete a resource and its allocations. Returns the number of allocations removed.
    fn delete_resource(&mut self, id: ResourceId) -> Result<usize>;

    /// All allocations, in ascending id order.
    fn allocations(&self) -> Vec<Allocation>;
    fn allocation(&self, id: AllocationId) -> Result<Allocation>;
    /// Allocations bound to `resource_id`, each carrying its event.
    fn allocations_for_resource(&self, resource_id: ResourceId) -> Result<Vec<Booking>>;
    fn allocations_for_event(&self, event_id: EventId) -> Result<Vec<Allocation>>;
    fn find_allocation(&self, event_id: EventId, resource_id: ResourceId) -> Option<Allocation>;
    /// Bind a resource to an event. Both must exist.
    ///
    /// This performs no conflict check; callers go through the scheduler.
    fn insert_allocation(&mut self, event_id: EventId, resource_id: ResourceId) -> Result<Allocation>;
    fn delete_allocation(&mut self, id: AllocationId) -> Result<()>;
}

/// A [`BookingStore`] kept entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct MemoryStore {
    events: BTreeMap<EventId, Event>,
    resources: BTreeMap<ResourceId, Resource>,
    allocations: BTreeMap<AllocationId, Allocation>,
    next_id: NextIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct NextIds {
    event: EventId,
    resource: ResourceId,
    allocation: AllocationId,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            event: 1,
            resource: 1,
            allocation: 1,
        }
    }
}

/// The serialized form of a [`MemoryStore`]: flat record lists.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_id: Option<NextIds>,
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    allocations: Vec<Allocation>,
}

impl From<MemoryStore> for Snapshot {
    fn from(store: MemoryStore) -> Self {
        Snapshot {
            next_id: Some(store.next_id),
            events: store.events.into_values().collect(),
            resources: store.resources.into_values().collect(),
            allocations: store.allocations.into_values().collect(),
        }
    }
}

impl TryFrom<Snapshot> for MemoryStore {
    type Error = BookingError;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        let mut store = MemoryStore {
            next_id: snapshot.next_id.unwrap_or_default(),
            ..MemoryStore::default()
        };

        for event in snapshot.events {
            event.range()?;
            let next = successor(event.id, EntityKind::Event)?;
            store.next_id.event = store.next_id.event.max(next);
            if store.events.insert(event.id, event).is_some() {
                return Err(duplicate_id(EntityKind::Event));
            }
        }
        for resource in snapshot.resources {
            let next = successor(resource.id, EntityKind::Resource)?;
            store.next_id.resource = store.next_id.resource.max(next);
            if store.resources.insert(resource.id, resource).is_some() {
                return Err(duplicate_id(EntityKind::Resource));
            }
        }
        for allocation in snapshot.allocations {
            if !store.events.contains_key(&allocation.event_id)
                || !store.resources.contains_key(&allocation.resource_id)
            {
                return Err(BookingError::InconsistentSnapshot(format!(
                    "allocation {} references a missing event or resource",
                    allocation.id
                )));
            }
            if store
                .find_allocation(allocation.event_id, allocation.resource_id)
                .is_some()
            {
                return Err(BookingError::InconsistentSnapshot(format!(
                    "resource {} is allocated to event {} more than once",
                    allocation.resource_id, allocation.event_id
                )));
            }
            let next = successor(allocation.id, EntityKind::Allocation)?;
            store.next_id.allocation = store.next_id.allocation.max(next);
            if store.allocations.insert(allocation.id, allocation).is_some() {
                return Err(duplicate_id(EntityKind::Allocation));
            }
        }

        Ok(store)
    }
}

fn duplicate_id(kind: EntityKind) -> BookingError {
    BookingError::InconsistentSnapshot(format!("duplicate {} id", kind))
}

fn successor(id: u64, kind: EntityKind) -> Result<u64> {
    id.checked_add(1).ok_or_else(|| {
        BookingError::InconsistentSnapshot(format!("{} id space exhausted", kind))
    })
}

/// Hand out the id in `counter` and advance it.
fn take_id(counter: &mut u64, kind: EntityKind) -> Result<u64> {
    let id = *counter;
    *counter = successor(id, kind)?;
    Ok(id)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from its JSON snapshot, checking referential integrity.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BookingError::InconsistentSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BookingError::InconsistentSnapshot(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.resources.is_empty() && self.allocations.is_empty()
    }

    fn remove_allocations_where(&mut self, pred: impl Fn(&Allocation) -> bool) -> usize {
        let before = self.allocations.len();
        self.allocations.retain(|_, a| !pred(a));
        before - self.allocations.len()
    }
}

impl BookingStore for MemoryStore {
    fn events(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    fn event(&self, id: EventId) -> Result<Event> {
        self.events
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::not_found(EntityKind::Event, id))
    }

    fn insert_event(&mut self, event: NewEvent) -> Result<Event> {
        let id = take_id(&mut self.next_id.event, EntityKind::Event)?;
        let event = Event {
            id,
            title: event.title,
            start: event.start,
            end: event.end,
            description: event.description,
        };
        self.events.insert(id, event.clone());
        Ok(event)
    }

    fn update_event(&mut self, event: Event) -> Result<()> {
        match self.events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event;
                Ok(())
            }
            None => Err(BookingError::not_found(EntityKind::Event, event.id)),
        }
    }

    fn delete_event(&mut self, id: EventId) -> Result<usize> {
        if self.events.remove(&id).is_none() {
            return Err(BookingError::not_found(EntityKind::Event, id));
        }
        let removed = self.remove_allocations_where(|a| a.event_id == id);
        debug!("deleted event {} with {} allocation(s)", id, removed);
        Ok(removed)
    }

    fn resources(&self) -> Vec<Resource> {
        self.resources.values().cloned().collect()
    }

    fn resource(&self, id: ResourceId) -> Result<Resource> {
        self.resources
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::not_found(EntityKind::Resource, id))
    }

    fn insert_resource(&mut self, resource: NewResource) -> Result<Resource> {
        let id = take_id(&mut self.next_id.resource, EntityKind::Resource)?;
        let resource = Resource {
            id,
            name: resource.name,
            kind: resource.kind,
        };
        self.resources.insert(id, resource.clone());
        Ok(resource)
    }

    fn update_resource(&mut self, resource: Resource) -> Result<()> {
        match self.resources.get_mut(&resource.id) {
            Some(stored) => {
                *stored = resource;
                Ok(())
            }
            None => Err(BookingError::not_found(EntityKind::Resource, resource.id)),
        }
    }

    fn delete_resource(&mut self, id: ResourceId) -> Result<usize> {
        if self.resources.remove(&id).is_none() {
            return Err(BookingError::not_found(EntityKind::Resource, id));
        }
        let removed = self.remove_allocations_where(|a| a.resource_id == id);
        debug!("deleted resource {} with {} allocation(s)", id, removed);
        Ok(removed)
    }

    fn allocations(&self) -> Vec<Allocation> {
        self.allocations.values().copied().collect()
    }

    fn allocation(&self, id: AllocationId) -> Result<Allocation> {
        self.allocations
            .get(&id)
            .copied()
            .ok_or_else(|| BookingError::not_found(EntityKind::Allocation, id))
    }

    fn allocations_for_resource(&self, resource_id: ResourceId) -> Result<Vec<Booking>> {
        if !self.resources.contains_key(&resource_id) {
            return Err(BookingError::not_found(EntityKind::Resource, resource_id));
        }
        self.allocations
            .values()
            .filter(|a| a.resource_id == resource_id)
            .map(|a| -> Result<Booking> {
                let event = self.events.get(&a.event_id).cloned().ok_or_else(|| {
                    BookingError::InconsistentSnapshot(format!(
                        "allocation {} references missing event {}",
                        a.id, a.event_id
                    ))
                })?;
                Ok(Booking {
                    allocation: *a,
                    event,
                })
            })
            .collect()
    }

    fn allocations_for_event(&self, event_id: EventId) -> Result<Vec<Allocation>> {
        if !self.events.contains_key(&event_id) {
            return Err(BookingError::not_found(EntityKind::Event, event_id));
        }
        Ok(self
            .allocations
            .values()
            .filter(|a| a.event_id == event_id)
            .copied()
            .collect())
    }

    fn find_allocation(&self, event_id: EventId, resource_id: ResourceId) -> Option<Allocation> {
        self.allocations
            .values()
            .find(|a| a.event_id == event_id && a.resource_id == resource_id)
            .copied()
    }

    fn insert_allocation(&mut self, event_id: EventId, resource_id: ResourceId) -> Result<Allocation> {
        if !self.events.contains_key(&event_id) {
            return Err(BookingError::not_found(EntityKind::Event, event_id));
        }
        if !self.resources.contains_key(&resource_id) {
            return Err(BookingError::not_found(EntityKind::Resource, resource_id));
        }
        if let Some(existing) = self.find_allocation(event_id, resource_id) {
            return Ok(existing);
        }
        let allocation = Allocation {
            id: take_id(&mut self.next_id.allocation, EntityKind::Allocation)?,
            event_id,
            resource_id,
        };
        self.allocations.insert(allocation.id, allocation);
        Ok(allocation)
    }

    fn delete_allocation(&mut self, id: AllocationId) -> Result<()> {
        self.allocations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BookingError::not_found(EntityKind::Allocation, id))
    }
}
