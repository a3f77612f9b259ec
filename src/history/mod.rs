//! In-memory session history: an append-only, prepend-ordered list of
//! records, plus the Data-tab statistics derived from it.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConfigSnapshot, RecordKind, SessionRecord, TreatmentMode};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeFilter {
    #[serde(rename = "this-month")]
    ThisMonth,
    #[serde(rename = "last-month")]
    LastMonth,
    #[serde(rename = "last-3-months")]
    LastThreeMonths,
    #[serde(rename = "all")]
    All,
}

impl TimeFilter {
    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::ThisMonth => "This Month",
            TimeFilter::LastMonth => "Last Month",
            TimeFilter::LastThreeMonths => "Last 3 Months",
            TimeFilter::All => "All Time",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_sessions: usize,
    pub total_minutes: u32,
    pub cold_minutes: u32,
    pub heat_minutes: u32,
    pub pressure_minutes: u32,
}

#[derive(Default)]
struct HistoryInner {
    records: Vec<SessionRecord>,
    last_completed: Option<SessionRecord>,
}

/// Shared history sink. The session controller appends; everything else
/// only reads. Existing entries are never reordered or mutated.
#[derive(Clone, Default)]
pub struct HistoryStore {
    inner: Arc<RwLock<HistoryInner>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records, given newest first.
    pub fn seeded(records: Vec<SessionRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                records,
                last_completed: None,
            })),
        }
    }

    /// Prepend a freshly produced record and surface it as "just completed"
    /// until acknowledged.
    pub fn append(&self, record: SessionRecord) {
        let mut inner = self.inner.write().unwrap();
        inner.records.insert(0, record.clone());
        inner.last_completed = Some(record);
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.inner.read().unwrap().records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_completed(&self) -> Option<SessionRecord> {
        self.inner.read().unwrap().last_completed.clone()
    }

    /// Dismiss the "session complete" summary.
    pub fn acknowledge_completed(&self) {
        self.inner.write().unwrap().last_completed = None;
    }

    pub fn filtered(&self, filter: TimeFilter, now: DateTime<Utc>) -> Vec<SessionRecord> {
        self.inner
            .read()
            .unwrap()
            .records
            .iter()
            .filter(|record| matches_filter(record.ended_at, filter, now))
            .cloned()
            .collect()
    }

    pub fn stats(&self, filter: TimeFilter, now: DateTime<Utc>) -> HistoryStats {
        let mut stats = HistoryStats::default();
        for record in self.filtered(filter, now) {
            stats.total_sessions += 1;
            stats.total_minutes += record.duration_min;
            match record.config.treatment_mode {
                Some(TreatmentMode::Cold) => stats.cold_minutes += record.duration_min,
                Some(TreatmentMode::Hot) => stats.heat_minutes += record.duration_min,
                Some(TreatmentMode::CompressionOnly) => {
                    stats.pressure_minutes += record.duration_min
                }
                // program sessions mix modalities and are not attributed
                None => {}
            }
        }
        stats
    }
}

fn matches_filter(ended_at: DateTime<Utc>, filter: TimeFilter, now: DateTime<Utc>) -> bool {
    match filter {
        TimeFilter::All => true,
        TimeFilter::ThisMonth => {
            ended_at.month() == now.month() && ended_at.year() == now.year()
        }
        TimeFilter::LastMonth => {
            let last_month = now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now);
            ended_at.month() == last_month.month() && ended_at.year() == last_month.year()
        }
        TimeFilter::LastThreeMonths => {
            let cutoff = now.checked_sub_months(Months::new(3)).unwrap_or(now);
            ended_at >= cutoff
        }
    }
}

/// The seven demo-mode records shown before a device has ever been paired.
pub fn sample_history(now: DateTime<Utc>) -> Vec<SessionRecord> {
    let entries = [
        ("sample-1", 1, "Contrast Recovery", 25, 100, RecordKind::Program),
        ("sample-2", 2, "Deep Cold Therapy", 15, 95, RecordKind::Program),
        ("sample-3", 3, "Manual Session", 20, 88, RecordKind::Manual),
        ("sample-4", 4, "Warm Recovery", 20, 92, RecordKind::Program),
        ("sample-5", 5, "Contrast Recovery", 25, 100, RecordKind::Program),
        ("sample-6", 6, "Manual Session", 18, 85, RecordKind::Manual),
        ("sample-7", 7, "Deep Cold Therapy", 15, 98, RecordKind::Program),
    ];

    entries
        .into_iter()
        .map(|(id, days_ago, name, duration_min, score, kind)| SessionRecord {
            id: id.to_string(),
            ended_at: now - Duration::days(days_ago),
            name: name.to_string(),
            duration_min,
            score,
            kind,
            config: ConfigSnapshot::default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, ended_at: DateTime<Utc>, mode: Option<TreatmentMode>) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            ended_at,
            name: "Manual Session".to_string(),
            duration_min: 10,
            score: 80,
            kind: RecordKind::Manual,
            config: ConfigSnapshot {
                treatment_mode: mode,
                ..ConfigSnapshot::default()
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn append_prepends_and_surfaces_last_completed() {
        let store = HistoryStore::new();
        store.append(record("a", now(), None));
        store.append(record("b", now(), None));

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "b");
        assert_eq!(records[1].id, "a");
        assert_eq!(store.last_completed().unwrap().id, "b");

        store.acknowledge_completed();
        assert!(store.last_completed().is_none());
        // acknowledging does not touch the records themselves
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn seeded_history_has_no_pending_summary() {
        let store = HistoryStore::seeded(sample_history(now()));
        assert_eq!(store.len(), 7);
        assert!(store.last_completed().is_none());
        assert_eq!(store.records()[0].id, "sample-1");
    }

    #[test]
    fn stats_attribute_minutes_per_treatment_mode() {
        let store = HistoryStore::new();
        store.append(record("cold", now(), Some(TreatmentMode::Cold)));
        store.append(record("hot", now(), Some(TreatmentMode::Hot)));
        store.append(record("press", now(), Some(TreatmentMode::CompressionOnly)));
        store.append(record("program", now(), None));

        let stats = store.stats(TimeFilter::All, now());
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.total_minutes, 40);
        assert_eq!(stats.cold_minutes, 10);
        assert_eq!(stats.heat_minutes, 10);
        assert_eq!(stats.pressure_minutes, 10);
    }

    #[test]
    fn filters_select_by_month_window() {
        let store = HistoryStore::new();
        store.append(record("june", Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(), None));
        store.append(record("may", Utc.with_ymd_and_hms(2025, 5, 20, 0, 0, 0).unwrap(), None));
        store.append(record("feb", Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(), None));

        let this_month = store.filtered(TimeFilter::ThisMonth, now());
        assert_eq!(this_month.len(), 1);
        assert_eq!(this_month[0].id, "june");

        let last_month = store.filtered(TimeFilter::LastMonth, now());
        assert_eq!(last_month.len(), 1);
        assert_eq!(last_month[0].id, "may");

        // 90-day window covers May and June but not February
        assert_eq!(store.filtered(TimeFilter::LastThreeMonths, now()).len(), 2);
        assert_eq!(store.filtered(TimeFilter::All, now()).len(), 3);
    }

    #[test]
    fn last_month_handles_january() {
        let january = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let december = Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap();
        let store = HistoryStore::new();
        store.append(record("dec", december, None));

        let filtered = store.filtered(TimeFilter::LastMonth, january);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "dec");
    }
}
