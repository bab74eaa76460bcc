//! Plain-text chart printed by `--view report`.

use std::fmt::Write;

use census_core::aggregator::AggregationSummary;
use census_core::models::DateRange;
use unicode_width::UnicodeWidthStr;

/// Width in columns of the longest bar.
const BAR_WIDTH: u64 = 40;

/// Render `summary` as a titled text bar chart, one line per category.
pub fn render_report(summary: &AggregationSummary, range: &DateRange) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hogwarts students by house");
    let _ = writeln!(out, "Born: {range}");
    let _ = writeln!(out);

    let label_width = summary
        .counts
        .iter()
        .map(|c| c.category.width())
        .max()
        .unwrap_or(0);
    let max = summary.counts.iter().map(|c| c.count).max().unwrap_or(0);

    for c in &summary.counts {
        let pad = " ".repeat(label_width - c.category.width());
        let bar = "█".repeat(bar_len(c.count, max));
        let _ = writeln!(out, "{}{pad}  {bar} {}", c.category, c.count);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Counted {} of {} students ({} without a usable birth date, {} outside the range)",
        summary.total(),
        summary.considered,
        summary.unparseable_dates,
        summary.out_of_range,
    );
    out
}

/// Bar length scaled against `max`; any non-zero count gets at least one block.
fn bar_len(count: u64, max: u64) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    ((count * BAR_WIDTH) / max).max(1) as usize
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use census_core::models::CategoryCount;
    use chrono::NaiveDate;

    fn summary(counts: &[(&str, u64)]) -> AggregationSummary {
        AggregationSummary {
            counts: counts
                .iter()
                .map(|(name, n)| CategoryCount::new(*name, *n))
                .collect(),
            considered: 30,
            unparseable_dates: 2,
            out_of_range: 1,
            unlisted_matches: 0,
        }
    }

    #[test]
    fn test_bar_len_scaling() {
        assert_eq!(bar_len(0, 10), 0);
        assert_eq!(bar_len(10, 10), 40);
        assert_eq!(bar_len(5, 10), 20);
        assert_eq!(bar_len(1, 1000), 1);
        assert_eq!(bar_len(3, 0), 0);
    }

    #[test]
    fn test_report_lines_are_aligned() {
        let report = render_report(
            &summary(&[("Gryffindor", 12), ("Slytherin", 6), ("Hufflepuff", 0)]),
            &DateRange::unbounded(),
        );
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Hogwarts students by house");
        assert_eq!(lines[1], "Born: * .. *");
        assert_eq!(lines[3], format!("Gryffindor  {} 12", "█".repeat(40)));
        assert_eq!(lines[4], format!("Slytherin   {} 6", "█".repeat(20)));
        assert_eq!(lines[5], "Hufflepuff   0");
    }

    #[test]
    fn test_report_footer_and_range() {
        let range = DateRange::new(NaiveDate::from_ymd_opt(1980, 1, 1), None);
        let report = render_report(&summary(&[("Ravenclaw", 3)]), &range);

        assert!(report.contains("Born: 1980-01-01 .. *"));
        assert!(report.contains(
            "Counted 3 of 30 students (2 without a usable birth date, 1 outside the range)"
        ));
    }

    #[test]
    fn test_report_with_no_categories() {
        let report = render_report(&summary(&[]), &DateRange::unbounded());
        assert!(report.contains("Counted 0 of 30"));
    }
}
