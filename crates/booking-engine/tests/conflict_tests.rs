//! Tests for the conflict finder and the batch resolver.

use booking_engine::{
    find_conflicts, find_conflicts_for_resources, BookingError, BookingStore, EntityKind,
    MemoryStore, NewEvent, NewResource, ResourceType, TimeRange,
};
use chrono::{DateTime, TimeZone, Utc};

/// Helper to build an instant on 2025-12-20.
fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 20, hour, min, 0).unwrap()
}

fn range(start_hour: u32, end_hour: u32) -> TimeRange {
    TimeRange::new(at(start_hour, 0), at(end_hour, 0)).unwrap()
}

fn add_event(store: &mut MemoryStore, title: &str, start_hour: u32, end_hour: u32) -> u64 {
    store
        .insert_event(NewEvent {
            title: title.to_string(),
            start: at(start_hour, 0),
            end: at(end_hour, 0),
            description: None,
        })
        .unwrap()
        .id
}

fn add_resource(store: &mut MemoryStore, name: &str) -> u64 {
    store
        .insert_resource(NewResource {
            name: name.to_string(),
            kind: ResourceType::Room,
        })
        .unwrap()
        .id
}

#[test]
fn overlapping_booking_is_reported() {
    // E1 holds R at 10:00-12:00; a candidate at 11:00-13:00 collides with it.
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let room = add_resource(&mut store, "Conference Room A");
    let allocation = store.insert_allocation(e1, room).unwrap();

    let conflicts = find_conflicts(&store, room, &range(11, 13), None).unwrap();

    assert_eq!(conflicts.len(), 1, "should detect exactly one conflict");
    assert_eq!(conflicts[0].allocation, allocation);
    assert_eq!(conflicts[0].event.id, e1);
    assert_eq!(conflicts[0].resource.name, "Conference Room A");
}

#[test]
fn adjacent_booking_is_not_a_conflict() {
    // E1 ends at 12:00, candidate starts at 12:00 → adjacent, NOT overlapping
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let room = add_resource(&mut store, "Conference Room A");
    store.insert_allocation(e1, room).unwrap();

    let conflicts = find_conflicts(&store, room, &range(12, 14), None).unwrap();

    assert!(
        conflicts.is_empty(),
        "adjacent bookings (end == start) should not be conflicts"
    );
}

#[test]
fn containment_in_either_direction_is_a_conflict() {
    let mut store = MemoryStore::new();
    let long = add_event(&mut store, "All-day seminar", 9, 17);
    let short = add_event(&mut store, "Stand-up", 10, 11);
    let room_a = add_resource(&mut store, "Room A");
    let room_b = add_resource(&mut store, "Room B");
    store.insert_allocation(long, room_a).unwrap();
    store.insert_allocation(short, room_b).unwrap();

    // Candidate inside an existing booking.
    assert_eq!(find_conflicts(&store, room_a, &range(12, 13), None).unwrap().len(), 1);
    // Candidate containing an existing booking.
    assert_eq!(find_conflicts(&store, room_b, &range(8, 18), None).unwrap().len(), 1);
}

#[test]
fn bookings_on_other_resources_are_ignored() {
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let room_a = add_resource(&mut store, "Room A");
    let room_b = add_resource(&mut store, "Room B");
    store.insert_allocation(e1, room_a).unwrap();

    let conflicts = find_conflicts(&store, room_b, &range(10, 12), None).unwrap();

    assert!(conflicts.is_empty());
}

#[test]
fn excluded_event_does_not_conflict_with_itself() {
    // E1 holds R at 10:00-12:00 and is being moved to 09:00-11:00.
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let room = add_resource(&mut store, "Conference Room A");
    store.insert_allocation(e1, room).unwrap();

    let without_exclusion = find_conflicts(&store, room, &range(9, 11), None).unwrap();
    let with_exclusion = find_conflicts(&store, room, &range(9, 11), Some(e1)).unwrap();

    assert_eq!(without_exclusion.len(), 1);
    assert!(with_exclusion.is_empty(), "an event must not conflict with itself");
}

#[test]
fn exclusion_only_skips_the_named_event() {
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let e2 = add_event(&mut store, "Flask Training", 11, 13);
    let room = add_resource(&mut store, "Conference Room A");
    store.insert_allocation(e1, room).unwrap();
    store.insert_allocation(e2, room).unwrap();

    let conflicts = find_conflicts(&store, room, &range(9, 14), Some(e1)).unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].event.id, e2);
}

#[test]
fn unknown_resource_is_not_found() {
    let store = MemoryStore::new();

    let err = find_conflicts(&store, 42, &range(10, 12), None).unwrap_err();

    assert_eq!(
        err,
        BookingError::NotFound {
            kind: EntityKind::Resource,
            id: 42
        }
    );
}

#[test]
fn batch_concatenates_in_resource_order() {
    let mut store = MemoryStore::new();
    let e1 = add_event(&mut store, "Python Workshop", 10, 12);
    let e2 = add_event(&mut store, "Flask Training", 11, 13);
    let room_a = add_resource(&mut store, "Room A");
    let room_b = add_resource(&mut store, "Room B");
    let projector = add_resource(&mut store, "Projector");
    store.insert_allocation(e1, room_a).unwrap();
    store.insert_allocation(e2, room_b).unwrap();

    let conflicts =
        find_conflicts_for_resources(&store, &range(11, 12), &[room_b, projector, room_a], None)
            .unwrap();

    let resources: Vec<u64> = conflicts.iter().map(|c| c.resource.id).collect();
    assert_eq!(resources, vec![room_b, room_a]);
}

#[test]
fn batch_with_only_free_resources_is_empty() {
    let mut store = MemoryStore::new();
    let room_a = add_resource(&mut store, "Room A");
    let room_b = add_resource(&mut store, "Room B");

    let conflicts =
        find_conflicts_for_resources(&store, &range(10, 12), &[room_a, room_b], None).unwrap();

    assert!(conflicts.is_empty(), "no bookings should produce no conflicts");
}

#[test]
fn batch_fails_on_unknown_resource() {
    let mut store = MemoryStore::new();
    let room = add_resource(&mut store, "Room A");

    let result = find_conflicts_for_resources(&store, &range(10, 12), &[room, 99], None);

    assert!(matches!(
        result,
        Err(BookingError::NotFound {
            kind: EntityKind::Resource,
            id: 99
        })
    ));
}
