//! Date parsing for dataset birth dates and user-entered range bounds.

use chrono::{Days, NaiveDate};

use crate::error::{CensusError, Result};

/// Largest magnitude accepted for a single date component before the
/// normalisation arithmetic is skipped. Far outside chrono's year range.
/// Such dates (and infinite components) are treated as unparseable.
const COMPONENT_LIMIT: f64 = 1.0e9;

/// Parse a dataset birth date in `DD-MM-YYYY` form.
///
/// Returns `None` for empty text, anything that does not split on `-` into
/// exactly three parts, and any part that is zero or not a number.
///
/// Out-of-range parts are *not* rejected. They roll over like a calendar
/// date built from `(year, month - 1, day)`:
///
/// * `32-01-2000` → 2000-02-01
/// * `01-13-1999` → 2000-01-01
/// * a year of `1..=99` is read as `1900 + year`
pub fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    let day = coerce_number(parts[0])?;
    let month = coerce_number(parts[1])?;
    let year = coerce_number(parts[2])?;
    if day == 0.0 || month == 0.0 || year == 0.0 {
        return None;
    }

    // The month is shifted to zero-based before truncation.
    normalize_date(year.trunc(), (month - 1.0).trunc(), day.trunc())
}

/// Parse a range bound typed by the user: empty means open, otherwise
/// `YYYY-MM-DD`.
pub fn parse_input_date(text: &str) -> Result<Option<NaiveDate>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CensusError::InvalidRange(trimmed.to_string()))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Numeric coercion of one date component.
///
/// Surrounding whitespace is ignored and a blank component is zero.
/// Unsigned `0x`, `0o` and `0b` literals are read in their radix.
/// `None` means "not a number"; infinities count as not a number too.
fn coerce_number(part: &str) -> Option<f64> {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `Some(parsed)` when `text` carries a radix prefix, `None` otherwise.
fn parse_radix_literal(text: &str) -> Option<Option<f64>> {
    let radix = match text.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(None);
    }
    Some(u64::from_str_radix(digits, radix).ok().map(|v| v as f64))
}

/// Build a date from integral `(year, zero-based month, day)` with calendar
/// rollover in both directions.
fn normalize_date(year: f64, month_index: f64, day: f64) -> Option<NaiveDate> {
    let year = if (0.0..=99.0).contains(&year) {
        year + 1900.0
    } else {
        year
    };

    if year.abs() > COMPONENT_LIMIT
        || month_index.abs() > COMPONENT_LIMIT
        || day.abs() > COMPONENT_LIMIT
    {
        return None;
    }

    let (year, month_index, day) = (year as i64, month_index as i64, day as i64);
    let year = year + month_index.div_euclid(12);
    let month = month_index.rem_euclid(12) as u32 + 1;

    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?;
    let offset = day - 1;
    if offset >= 0 {
        first.checked_add_days(Days::new(offset as u64))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
