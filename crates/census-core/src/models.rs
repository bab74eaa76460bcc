//! Domain models shared by every House Census crate.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::parse_input_date;
use crate::error::{CensusError, Result};

// ── Categories ────────────────────────────────────────────────────────────────

/// The four houses charted when no `--category` override is given, in bar order.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Gryffindor", "Slytherin", "Hufflepuff", "Ravenclaw"];

/// Owned copy of [`DEFAULT_CATEGORIES`].
pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One character entry from the dataset.
///
/// Field names follow the upstream JSON (`house`, `dateOfBirth`,
/// `hogwartsStudent`). Missing or `null` values decode as empty / `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Bucket label, e.g. `"Gryffindor"`. May be empty.
    #[serde(rename = "house", default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Birth date as `DD-MM-YYYY`; frequently empty.
    #[serde(rename = "dateOfBirth", default, deserialize_with = "null_as_default")]
    pub birth_date: String,
    /// Only eligible records take part in aggregation.
    #[serde(rename = "hogwartsStudent", default, deserialize_with = "null_as_default")]
    pub eligible: bool,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        birth_date: impl Into<String>,
        eligible: bool,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            birth_date: birth_date.into(),
            eligible,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── CategoryCount ─────────────────────────────────────────────────────────────

/// Number of matching records for one category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

impl CategoryCount {
    pub fn new(category: impl Into<String>, count: u64) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive birth-date bounds; `None` leaves that side open.
///
/// `start <= end` is not enforced. An inverted range matches nothing unless
/// both bounds are the same day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range with both sides open.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `true` when `date` lies within both bounds (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |d: Option<NaiveDate>| match d {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "*".to_string(),
        };
        write!(f, "{} .. {}", side(self.start), side(self.end))
    }
}

// ── RangeVariant / RangeInput ─────────────────────────────────────────────────

/// Shape of the date-range input widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeVariant {
    /// Two independent date fields.
    #[default]
    Separate,
    /// One `START..END` field.
    Combined,
}

impl RangeVariant {
    /// Parse a variant name; anything other than `"combined"` is `Separate`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "combined" => Self::Combined,
            _ => Self::Separate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Separate => "separate",
            Self::Combined => "combined",
        }
    }
}

/// Separator between the two halves of a combined range.
pub const RANGE_SEPARATOR: &str = "..";

/// Raw, unvalidated text typed into the range widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeInput {
    Separate { start: String, end: String },
    Combined(String),
}

impl RangeInput {
    /// Empty input for the given widget shape.
    pub fn empty(variant: RangeVariant) -> Self {
        match variant {
            RangeVariant::Separate => Self::Separate {
                start: String::new(),
                end: String::new(),
            },
            RangeVariant::Combined => Self::Combined(String::new()),
        }
    }

    pub fn variant(&self) -> RangeVariant {
        match self {
            Self::Separate { .. } => RangeVariant::Separate,
            Self::Combined(_) => RangeVariant::Combined,
        }
    }

    /// Re-express the same bounds in another widget shape.
    pub fn into_variant(self, variant: RangeVariant) -> Self {
        match (self, variant) {
            (Self::Separate { start, end }, RangeVariant::Combined) => {
                if start.is_empty() && end.is_empty() {
                    Self::Combined(String::new())
                } else {
                    Self::Combined(format!("{start}{RANGE_SEPARATOR}{end}"))
                }
            }
            (Self::Combined(text), RangeVariant::Separate) => {
                let (start, end) = split_combined(&text);
                Self::Separate {
                    start: start.to_string(),
                    end: end.to_string(),
                }
            }
            (same, _) => same,
        }
    }

    /// Validate the text and convert it into a [`DateRange`].
    ///
    /// Each side must be empty or `YYYY-MM-DD`. A non-empty combined field
    /// must contain the `..` separator.
    pub fn to_range(&self) -> Result<DateRange> {
        match self {
            Self::Separate { start, end } => Ok(DateRange::new(
                parse_input_date(start)?,
                parse_input_date(end)?,
            )),
            Self::Combined(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(DateRange::unbounded());
                }
                let (start, end) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(|| {
                    CensusError::InvalidRange(format!(
                        "{trimmed} (expected START{RANGE_SEPARATOR}END)"
                    ))
                })?;
                Ok(DateRange::new(
                    parse_input_date(start)?,
                    parse_input_date(end)?,
                ))
            }
        }
    }
}

/// Split `START..END` into its halves; text without a separator is all start.
pub fn split_combined(text: &str) -> (&str, &str) {
    match text.split_once(RANGE_SEPARATOR) {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (text.trim(), ""),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
