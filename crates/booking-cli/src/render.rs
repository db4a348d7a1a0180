//! Plain-text rendering of listings and reports.

use std::fmt::Write;

use booking_engine::{
    AllocationDetail, Conflict, Event, Overview, Resource, ResourceUtilization,
};
use chrono_tz::Tz;

use crate::time::format_datetime;

fn event_line(event: &Event, tz: Tz) -> String {
    format!(
        "#{:<4} {} -> {}  {}",
        event.id,
        format_datetime(event.start, tz),
        format_datetime(event.end, tz),
        event.title
    )
}

fn resource_label(resource: &Resource) -> String {
    format!("{} ({})", resource.name, resource.kind)
}

pub fn event(event: &Event, tz: Tz) -> String {
    let mut out = event_line(event, tz);
    if let Some(description) = &event.description {
        let _ = write!(out, "\n      {}", description);
    }
    out
}

pub fn events(events: &[Event], tz: Tz) -> String {
    if events.is_empty() {
        return "No events.".to_string();
    }
    events
        .iter()
        .map(|e| event(e, tz))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn resource(resource: &Resource) -> String {
    format!("#{:<4} {}", resource.id, resource_label(resource))
}

pub fn resources(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "No resources.".to_string();
    }
    resources
        .iter()
        .map(resource)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn allocations(allocations: &[AllocationDetail], tz: Tz) -> String {
    if allocations.is_empty() {
        return "No allocations.".to_string();
    }
    allocations
        .iter()
        .map(|a| {
            format!(
                "#{:<4} {} -> {}",
                a.allocation.id,
                resource_label(&a.resource),
                event_line(&a.event, tz)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn conflicts(conflicts: &[Conflict], tz: Tz) -> String {
    if conflicts.is_empty() {
        return "No conflicts.".to_string();
    }
    let mut out = format!("{} conflict(s):", conflicts.len());
    for c in conflicts {
        let _ = write!(
            out,
            "\n  {} is booked by {} [allocation #{}]",
            resource_label(&c.resource),
            event_line(&c.event, tz),
            c.allocation.id
        );
    }
    out
}

pub fn report(rows: &[ResourceUtilization], tz: Tz) -> String {
    if rows.is_empty() {
        return "No resources.".to_string();
    }
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{:<32} {:>8.2} h  {} allocation(s)",
            resource_label(&row.resource),
            row.total_hours,
            row.allocation_count
        );
        for upcoming in &row.upcoming_bookings {
            let _ = write!(out, "\n    upcoming {}", event_line(upcoming, tz));
        }
    }
    out
}

pub fn overview(overview: &Overview, tz: Tz) -> String {
    let mut out = format!(
        "Events:      {}\nResources:   {}\nAllocations: {}",
        overview.event_count, overview.resource_count, overview.allocation_count
    );
    if overview.upcoming_events.is_empty() {
        out.push_str("\nNo upcoming events.");
    } else {
        out.push_str("\nUpcoming:");
        for e in &overview.upcoming_events {
            let _ = write!(out, "\n  {}", event_line(e, tz));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_engine::{Allocation, ResourceType};

    fn sample_event() -> Event {
        Event {
            id: 1,
            title: "Python Workshop".to_string(),
            start: "2025-12-20T10:00:00Z".parse().unwrap(),
            end: "2025-12-20T12:00:00Z".parse().unwrap(),
            description: Some("Introduction to Python programming".to_string()),
        }
    }

    fn sample_resource() -> Resource {
        Resource {
            id: 3,
            name: "Dr. Smith".to_string(),
            kind: ResourceType::Instructor,
        }
    }

    #[test]
    fn event_includes_description_line() {
        let text = event(&sample_event(), Tz::UTC);
        assert_eq!(
            text,
            "#1    2025-12-20 10:00 -> 2025-12-20 12:00  Python Workshop\n      Introduction to Python programming"
        );
    }

    #[test]
    fn conflicts_name_resource_and_event() {
        let conflict = Conflict {
            allocation: Allocation {
                id: 2,
                event_id: 1,
                resource_id: 3,
            },
            event: sample_event(),
            resource: sample_resource(),
        };
        let text = conflicts(&[conflict], Tz::UTC);
        assert!(text.starts_with("1 conflict(s):"));
        assert!(text.contains("Dr. Smith (instructor) is booked by #1"));
        assert!(text.contains("[allocation #2]"));
    }

    #[test]
    fn report_prints_hours_with_two_decimals() {
        let row = ResourceUtilization {
            resource: sample_resource(),
            total_hours: 2.5,
            allocation_count: 1,
            upcoming_bookings: vec![],
        };
        assert!(report(&[row], Tz::UTC).contains("2.50 h  1 allocation(s)"));
    }
}
