//! Chart state: the current record list, the category set and the latest
//! aggregation result.
//!
//! [`ChartStore::apply`] reruns the aggregation in full and publishes a
//! [`ChartSnapshot`] on a `watch` channel. Every snapshot carries a
//! `revision` that grows with each apply, so observers can tell that they are
//! looking at the result of the most recent input.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use census_core::aggregator::{AggregationSummary, CategoryAggregator};
use census_core::models::{CategoryCount, DateRange, Record};

// ── ChartSnapshot ─────────────────────────────────────────────────────────────

/// One aggregation result, as handed to the chart view.
#[derive(Debug, Clone)]
pub struct ChartSnapshot {
    /// Sequence number of the apply that produced this snapshot (starts at 1).
    pub revision: u64,
    /// The range the counts were computed for.
    pub range: DateRange,
    /// Counts per category plus skip bookkeeping.
    pub summary: AggregationSummary,
    /// Size of the record list the counts were computed from.
    pub record_count: usize,
    /// Wall-clock time of the computation.
    pub computed_at: DateTime<Local>,
}

impl ChartSnapshot {
    pub fn counts(&self) -> &[CategoryCount] {
        &self.summary.counts
    }
}

// ── ChartStore ────────────────────────────────────────────────────────────────

pub struct ChartStore {
    records: Arc<[Record]>,
    categories: Vec<String>,
    revision: u64,
    tx: watch::Sender<Option<ChartSnapshot>>,
}

impl ChartStore {
    /// Empty store charting `categories` in the given order.
    pub fn new(categories: Vec<String>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            records: Arc::from(Vec::new()),
            categories,
            revision: 0,
            tx,
        }
    }

    /// Observe published snapshots. `None` until the first apply.
    pub fn subscribe(&self) -> watch::Receiver<Option<ChartSnapshot>> {
        self.tx.subscribe()
    }

    /// Swap in a freshly fetched record list.
    ///
    /// The current snapshot is left untouched; counts only change on the
    /// next [`Self::apply`].
    pub fn replace_records(&mut self, records: Arc<[Record]>) {
        tracing::debug!(count = records.len(), "record list replaced");
        self.records = records;
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Recompute the counts for `range` and publish the result.
    pub fn apply(&mut self, range: DateRange) -> ChartSnapshot {
        let summary = CategoryAggregator::summarize(&self.records, &self.categories, &range);
        self.revision += 1;

        tracing::debug!(
            revision = self.revision,
            %range,
            considered = summary.considered,
            unparseable = summary.unparseable_dates,
            out_of_range = summary.out_of_range,
            total = summary.total(),
            "aggregation applied"
        );

        let snapshot = ChartSnapshot {
            revision: self.revision,
            range,
            summary,
            record_count: self.records.len(),
            computed_at: Local::now(),
        };
        self.tx.send_replace(Some(snapshot.clone()));
        snapshot
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<ChartSnapshot> {
        self.tx.borrow().clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use census_core::models::default_categories;
    use chrono::NaiveDate;

    fn records() -> Arc<[Record]> {
        vec![
            Record::new("Harry Potter", "Gryffindor", "31-07-1980", true),
            Record::new("Hermione Granger", "Gryffindor", "19-09-1979", true),
            Record::new("Draco Malfoy", "Slytherin", "05-06-1980", true),
        ]
        .into()
    }

    fn since(y: i32, m: u32, d: u32) -> DateRange {
        DateRange::new(NaiveDate::from_ymd_opt(y, m, d), None)
    }

    #[test]
    fn test_new_store_has_no_snapshot() {
        let store = ChartStore::new(default_categories());
        assert!(store.latest().is_none());
        assert!(store.subscribe().borrow().is_none());
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_apply_on_empty_records_yields_zeros() {
        let mut store = ChartStore::new(default_categories());
        let snapshot = store.apply(DateRange::unbounded());
        assert_eq!(snapshot.counts().len(), 4);
        assert!(snapshot.counts().iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_apply_publishes_counts() {
        let mut store = ChartStore::new(default_categories());
        store.replace_records(records());
        let rx = store.subscribe();

        let snapshot = store.apply(DateRange::unbounded());
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.record_count, 3);
        assert_eq!(snapshot.counts()[0].count, 2);
        assert_eq!(snapshot.counts()[1].count, 1);

        let observed = rx.borrow().clone().expect("snapshot published");
        assert_eq!(observed.revision, 1);
        assert_eq!(observed.counts(), snapshot.counts());
    }

    #[test]
    fn test_latest_apply_wins() {
        let mut store = ChartStore::new(default_categories());
        store.replace_records(records());
        let mut rx = store.subscribe();

        store.apply(DateRange::unbounded());
        store.apply(since(1980, 1, 1));

        assert!(rx.has_changed().unwrap());
        let observed = rx.borrow_and_update().clone().unwrap();
        assert_eq!(observed.revision, 2);
        assert_eq!(observed.range, since(1980, 1, 1));
        assert_eq!(observed.counts()[0].count, 1);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_replace_records_does_not_recompute() {
        let mut store = ChartStore::new(default_categories());
        store.apply(DateRange::unbounded());
        store.replace_records(records());

        let latest = store.latest().unwrap();
        assert_eq!(latest.record_count, 0);
        assert_eq!(store.record_count(), 3);

        let fresh = store.apply(DateRange::unbounded());
        assert_eq!(fresh.record_count, 3);
        assert_eq!(fresh.revision, 2);
    }

    #[test]
    fn test_categories_preserved() {
        let cats = vec!["Ravenclaw".to_string()];
        let store = ChartStore::new(cats.clone());
        assert_eq!(store.categories(), cats.as_slice());
    }
}
