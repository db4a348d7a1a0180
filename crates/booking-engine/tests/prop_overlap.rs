//! Property-based tests for the overlap predicate using proptest.
//!
//! These pin down the half-open semantics for *any* pair of ranges, and check
//! that the single-inequality predicate agrees with the three-way
//! containment / left-overlap / right-overlap formulation it replaces.

use booking_engine::TimeRange;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap()
}

/// A range starting within two days of the base, 1 minute to 8 hours long.
fn arb_range() -> impl Strategy<Value = TimeRange> {
    (0i64..2 * 24 * 60, 1i64..=8 * 60).prop_map(|(offset, length)| {
        let start = base() + Duration::minutes(offset);
        TimeRange::new(start, start + Duration::minutes(length)).unwrap()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    }
}

/// The three-clause condition: any overlap, candidate start inside, or
/// candidate end inside the existing booking.
fn three_clause(existing: &TimeRange, candidate: &TimeRange) -> bool {
    (existing.start() < candidate.end() && existing.end() > candidate.start())
        || (existing.start() >= candidate.start() && existing.start() < candidate.end())
        || (existing.end() > candidate.start() && existing.end() <= candidate.end())
}

// ---------------------------------------------------------------------------
// Property 1: overlap is symmetric
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_is_symmetric(a in arb_range(), b in arb_range()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }
}

// ---------------------------------------------------------------------------
// Property 2: a range ending at or before another's start never overlaps it
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn disjoint_ranges_do_not_overlap(a in arb_range(), gap in 0i64..600, length in 1i64..600) {
        let start = a.end() + Duration::minutes(gap);
        let b = TimeRange::new(start, start + Duration::minutes(length)).unwrap();
        prop_assert!(!a.overlaps(&b));
        prop_assert!(!b.overlaps(&a));
    }

    #[test]
    fn touching_ranges_do_not_overlap(a in arb_range(), length in 1i64..600) {
        let b = TimeRange::new(a.end(), a.end() + Duration::minutes(length)).unwrap();
        prop_assert!(!a.overlaps(&b));
    }
}

// ---------------------------------------------------------------------------
// Property 3: every range overlaps itself and anything containing it
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn range_overlaps_itself_and_its_hull(a in arb_range(), pad in 0i64..120) {
        prop_assert!(a.overlaps(&a));
        let hull = TimeRange::new(
            a.start() - Duration::minutes(pad),
            a.end() + Duration::minutes(pad),
        )
        .unwrap();
        prop_assert!(a.overlaps(&hull));
        prop_assert!(hull.overlaps(&a));
    }
}

// ---------------------------------------------------------------------------
// Property 4: single inequality == three-clause formulation
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn single_condition_matches_three_clauses(existing in arb_range(), candidate in arb_range()) {
        prop_assert_eq!(existing.overlaps(&candidate), three_clause(&existing, &candidate));
    }
}

// ---------------------------------------------------------------------------
// Property 5: clipped hours never exceed the range or the window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn clip_stays_within_range_and_window(a in arb_range(), window in arb_range()) {
        match a.clip(window.start(), window.end()) {
            Some(clipped) => {
                prop_assert!(a.overlaps(&window));
                prop_assert!(clipped.hours() <= a.hours());
                prop_assert!(clipped.hours() <= window.hours());
                prop_assert!(clipped.start() >= window.start() && clipped.end() <= window.end());
            }
            None => prop_assert!(!a.overlaps(&window)),
        }
    }
}
