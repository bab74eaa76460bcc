//! Category aggregation over character records.
//!
//! Counts eligible, categorized records whose birth date falls inside an
//! optional inclusive [`DateRange`], bucketed by a fixed ordered label set.

use std::collections::HashMap;

use crate::dates::parse_birth_date;
use crate::models::{CategoryCount, DateRange, Record};

// ── AggregationSummary ────────────────────────────────────────────────────────

/// Counts per category plus bookkeeping on what was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// One entry per requested label, in request order.
    pub counts: Vec<CategoryCount>,
    /// Records that were eligible and had a non-empty category.
    pub considered: usize,
    /// Considered records whose birth date did not parse.
    pub unparseable_dates: usize,
    /// Considered records whose birth date fell outside the range.
    pub out_of_range: usize,
    /// Matching records whose category is not in the label set.
    pub unlisted_matches: usize,
}

impl AggregationSummary {
    /// Sum of all surfaced counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

// ── CategoryAggregator ────────────────────────────────────────────────────────

/// Stateless helper that buckets records by category label.
pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Count matching records per label in `categories`.
    ///
    /// Always returns exactly `categories.len()` entries in the given order.
    pub fn aggregate(
        records: &[Record],
        categories: &[String],
        range: &DateRange,
    ) -> Vec<CategoryCount> {
        Self::summarize(records, categories, range).counts
    }

    /// Same as [`Self::aggregate`] but also reports why records were skipped.
    pub fn summarize(
        records: &[Record],
        categories: &[String],
        range: &DateRange,
    ) -> AggregationSummary {
        let mut tally: HashMap<&str, u64> =
            categories.iter().map(|label| (label.as_str(), 0)).collect();
        let mut summary = AggregationSummary::default();

        for record in records
            .iter()
            .filter(|r| r.eligible && !r.category.is_empty())
        {
            summary.considered += 1;

            let Some(born) = parse_birth_date(&record.birth_date) else {
                tracing::trace!(name = %record.name, raw = %record.birth_date, "unparseable birth date");
                summary.unparseable_dates += 1;
                continue;
            };
            if !range.contains(born) {
                summary.out_of_range += 1;
                continue;
            }

            let slot = tally.entry(record.category.as_str()).or_insert(0);
            *slot += 1;
        }

        summary.unlisted_matches = tally
            .iter()
            .filter(|(label, _)| !categories.iter().any(|c| c == *label))
            .map(|(_, count)| *count as usize)
            .sum();

        summary.counts = categories
            .iter()
            .map(|label| {
                CategoryCount::new(label.clone(), tally.get(label.as_str()).copied().unwrap_or(0))
            })
            .collect();

        summary
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_categories;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new("Harry Potter", "Gryffindor", "31-07-1980", true),
            Record::new("Hermione Granger", "Gryffindor", "19-09-1979", true),
            Record::new("Draco Malfoy", "Slytherin", "05-06-1980", true),
            Record::new("Cedric Diggory", "Hufflepuff", "", true),
            Record::new("Luna Lovegood", "Ravenclaw", "13-02-1981", true),
            Record::new("Minerva McGonagall", "Gryffindor", "04-10-1925", false),
            Record::new("Vernon Dursley", "", "01-01-1950", true),
            Record::new("Unknown Student", "Durmstrang", "01-01-1980", true),
        ]
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_filters_by_start_bound() {
        let records = vec![
            Record::new("a", "A", "01-01-2000", true),
            Record::new("b", "A", "01-01-2010", true),
            Record::new("c", "B", "01-01-2000", false),
        ];
        let range = DateRange::new(Some(date(2005, 1, 1)), None);
        let result = CategoryAggregator::aggregate(&records, &labels(&["A", "B"]), &range);

        assert_eq!(
            result,
            vec![CategoryCount::new("A", 1), CategoryCount::new("B", 0)]
        );
    }

    #[test]
    fn test_unbounded_counts_every_eligible_parseable_record() {
        let result = CategoryAggregator::aggregate(
            &sample_records(),
            &default_categories(),
            &DateRange::unbounded(),
        );
        assert_eq!(
            result,
            vec![
                CategoryCount::new("Gryffindor", 2),
                CategoryCount::new("Slytherin", 1),
                CategoryCount::new("Hufflepuff", 0),
                CategoryCount::new("Ravenclaw", 1),
            ]
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(Some(date(1980, 6, 5)), Some(date(1980, 7, 31)));
        let result =
            CategoryAggregator::aggregate(&sample_records(), &default_categories(), &range);
        assert_eq!(result[0], CategoryCount::new("Gryffindor", 1));
        assert_eq!(result[1], CategoryCount::new("Slytherin", 1));
    }

    #[test]
    fn test_output_matches_category_order_even_without_records() {
        let cats = labels(&["Ravenclaw", "Gryffindor"]);
        let result = CategoryAggregator::aggregate(&[], &cats, &DateRange::unbounded());
        assert_eq!(
            result,
            vec![
                CategoryCount::new("Ravenclaw", 0),
                CategoryCount::new("Gryffindor", 0)
            ]
        );
    }

    #[test]
    fn test_empty_category_set_yields_empty_output() {
        let result = CategoryAggregator::aggregate(&sample_records(), &[], &DateRange::unbounded());
        assert!(result.is_empty());
    }

    #[test]
    fn test_rollover_date_is_counted_at_rolled_position() {
        // 32-01-2000 is read as 2000-02-01.
        let records = vec![Record::new("x", "A", "32-01-2000", true)];
        let range = DateRange::new(Some(date(2000, 2, 1)), Some(date(2000, 2, 1)));
        let result = CategoryAggregator::aggregate(&records, &labels(&["A"]), &range);
        assert_eq!(result[0].count, 1);
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = DateRange::new(Some(date(1990, 1, 1)), Some(date(1970, 1, 1)));
        let result =
            CategoryAggregator::aggregate(&sample_records(), &default_categories(), &range);
        assert!(result.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let records = sample_records();
        let cats = default_categories();
        let range = DateRange::new(Some(date(1979, 1, 1)), None);
        let first = CategoryAggregator::aggregate(&records, &cats, &range);
        let second = CategoryAggregator::aggregate(&records, &cats, &range);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_never_exceeds_considered_records() {
        let records = sample_records();
        let eligible_categorized = records
            .iter()
            .filter(|r| r.eligible && !r.category.is_empty())
            .count() as u64;
        let summary = CategoryAggregator::summarize(
            &records,
            &default_categories(),
            &DateRange::unbounded(),
        );
        assert!(summary.total() <= eligible_categorized);
    }

    #[test]
    fn test_duplicate_labels_report_the_same_count() {
        let records = vec![Record::new("a", "A", "01-01-2000", true)];
        let result = CategoryAggregator::aggregate(
            &records,
            &labels(&["A", "A"]),
            &DateRange::unbounded(),
        );
        assert_eq!(result, vec![CategoryCount::new("A", 1), CategoryCount::new("A", 1)]);
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summary_bookkeeping() {
        let range = DateRange::new(Some(date(1980, 1, 1)), None);
        let summary =
            CategoryAggregator::summarize(&sample_records(), &default_categories(), &range);

        // Six records are eligible with a category (McGonagall and Dursley are not).
        assert_eq!(summary.considered, 6);
        assert_eq!(summary.unparseable_dates, 1);
        // Hermione (1979).
        assert_eq!(summary.out_of_range, 1);
        assert_eq!(summary.unlisted_matches, 1);
        // Harry, Draco, Luna.
        assert_eq!(summary.total(), 3);
    }
}
