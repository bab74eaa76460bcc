//! Lenient decoding of the character dataset.

use census_core::error::Result;
use census_core::models::Record;
use serde_json::Value;
use tracing::{debug, warn};

/// Decode a JSON array of character objects.
///
/// The body itself must be a JSON array. Individual elements that do not
/// look like a record (wrong types, non-objects) are skipped rather than
/// failing the whole load.
pub fn decode_records(body: &str) -> Result<Vec<Record>> {
    let raw: Vec<Value> = serde_json::from_str(body)?;
    let total = raw.len();

    let records: Vec<Record> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Record>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping malformed record");
                None
            }
        })
        .collect();

    let skipped = total - records.len();
    if skipped > 0 {
        warn!(skipped, total, "some dataset entries could not be decoded");
    }

    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
