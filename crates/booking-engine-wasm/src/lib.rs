//! WASM bindings for booking-engine.
//!
//! Exposes conflict detection and utilization reporting to JavaScript via
//! `wasm-bindgen`. The store is passed in as its JSON snapshot (the same format
//! the `scheduler` CLI writes to disk) and results come back as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::{
    build_utilization_report, find_conflicts_for_resources, MemoryStore, ResourceId, TimeRange,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use wasm_bindgen::prelude::*;

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (e.g. "2026-02-17T14:00:00+01:00") and naive datetimes
/// (e.g. "2026-02-17T14:00:00"), which are taken as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn load_store(snapshot_json: &str) -> Result<MemoryStore, String> {
    MemoryStore::from_json(snapshot_json).map_err(|e| e.to_string())
}

fn check_conflicts_json(
    snapshot_json: &str,
    start: &str,
    end: &str,
    resource_ids_json: &str,
    exclude_event_id: Option<u64>,
) -> Result<String, String> {
    let store = load_store(snapshot_json)?;
    let range = TimeRange::new(parse_datetime(start)?, parse_datetime(end)?)
        .map_err(|e| e.to_string())?;
    let resource_ids: Vec<ResourceId> = serde_json::from_str(resource_ids_json)
        .map_err(|e| format!("Invalid resource ids JSON: {}", e))?;

    let conflicts = find_conflicts_for_resources(&store, &range, &resource_ids, exclude_event_id)
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&conflicts).map_err(|e| e.to_string())
}

fn utilization_report_json(
    snapshot_json: &str,
    window_start: &str,
    window_end: &str,
    now: &str,
) -> Result<String, String> {
    let store = load_store(snapshot_json)?;
    let rows = build_utilization_report(
        &store,
        parse_datetime(window_start)?,
        parse_datetime(window_end)?,
        parse_datetime(now)?,
    )
    .map_err(|e| e.to_string())?;
    serde_json::to_string(&rows).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Find the bookings of the given resources that overlap `[start, end)`.
///
/// Returns a JSON array of `{allocation, event, resource}` objects, grouped by
/// resource in the order the ids were given.
///
/// # Arguments
/// - `snapshot_json` -- Store snapshot (`{events, resources, allocations}`)
/// - `start`, `end` -- Candidate range as ISO 8601 strings
/// - `resource_ids_json` -- JSON array of resource ids, e.g. `[1, 3]`
/// - `exclude_event_id` -- Event whose own bookings are ignored (when editing it)
#[wasm_bindgen(js_name = "checkConflicts")]
pub fn check_conflicts(
    snapshot_json: &str,
    start: &str,
    end: &str,
    resource_ids_json: &str,
    exclude_event_id: Option<u64>,
) -> Result<String, JsValue> {
    check_conflicts_json(snapshot_json, start, end, resource_ids_json, exclude_event_id)
        .map_err(|e| JsValue::from_str(&e))
}

/// Booked hours per resource within `[window_start, window_end]`.
///
/// Returns a JSON array with one row per resource:
/// `{resource, total_hours, allocation_count, upcoming_bookings}`.
#[wasm_bindgen(js_name = "utilizationReport")]
pub fn utilization_report(
    snapshot_json: &str,
    window_start: &str,
    window_end: &str,
    now: &str,
) -> Result<String, JsValue> {
    utilization_report_json(snapshot_json, window_start, window_end, now)
        .map_err(|e| JsValue::from_str(&e))
}
