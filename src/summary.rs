//! Summary aggregator: folds journal rows into top-N frequency percentages.
//!
//! Derived and ephemeral — recomputed per request, never persisted. Both
//! daily and all-time semantics exist behind `SummaryFilter`; the `/resumen`
//! command uses today's date, the HTTP summary endpoint defaults to all-time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::journal::LogRow;

/// Which journal rows enter the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFilter {
    AllTime,
    OnDate(NaiveDate),
}

/// One aggregated category line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub category: String,
    pub count: usize,
    /// Rounded integer percentage of the filtered total.
    pub percentage: u32,
}

/// Aggregation result. Zero matching rows is an explicit variant, not a
/// division error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    Empty,
    Top {
        total: usize,
        entries: Vec<SummaryEntry>,
    },
}

/// Fold `rows` into the top-`top_n` categories by count.
///
/// Ties on count break alphabetically. Percentages are shares of the
/// filtered total, rounded.
pub fn summarize(rows: &[LogRow], filter: SummaryFilter, top_n: usize) -> Summary {
    let filtered: Vec<&LogRow> = rows
        .iter()
        .filter(|row| match filter {
            SummaryFilter::AllTime => true,
            SummaryFilter::OnDate(date) => row.date == date,
        })
        .collect();

    let total = filtered.len();
    if total == 0 {
        return Summary::Empty;
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &filtered {
        *counts.entry(row.emotion.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_n);

    let entries = ranked
        .into_iter()
        .map(|(category, count)| SummaryEntry {
            category: category.to_string(),
            count,
            percentage: (count as f64 / total as f64 * 100.0).round() as u32,
        })
        .collect();

    Summary::Top { total, entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(date: &str, emotion: &str) -> LogRow {
        LogRow {
            date: d(date),
            emotion: emotion.to_string(),
            category: None,
        }
    }

    #[test]
    fn counts_and_percentages_for_top_three() {
        let rows = vec![
            row("2026-08-01", "A"),
            row("2026-08-01", "A"),
            row("2026-08-01", "B"),
        ];
        let s = summarize(&rows, SummaryFilter::AllTime, 3);
        match s {
            Summary::Top { total, entries } => {
                assert_eq!(total, 3);
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0], SummaryEntry { category: "A".into(), count: 2, percentage: 67 });
                assert_eq!(entries[1], SummaryEntry { category: "B".into(), count: 1, percentage: 33 });
            }
            Summary::Empty => panic!("expected data"),
        }
    }

    #[test]
    fn zero_rows_is_explicit_empty() {
        assert_eq!(summarize(&[], SummaryFilter::AllTime, 3), Summary::Empty);
    }

    #[test]
    fn date_filter_drops_other_days() {
        let rows = vec![
            row("2026-08-01", "A"),
            row("2026-08-02", "B"),
            row("2026-08-02", "B"),
        ];
        let s = summarize(&rows, SummaryFilter::OnDate(d("2026-08-02")), 3);
        match s {
            Summary::Top { total, entries } => {
                assert_eq!(total, 2);
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].category, "B");
                assert_eq!(entries[0].percentage, 100);
            }
            Summary::Empty => panic!("expected data"),
        }
    }

    #[test]
    fn date_filter_with_no_matches_is_empty() {
        let rows = vec![row("2026-08-01", "A")];
        assert_eq!(
            summarize(&rows, SummaryFilter::OnDate(d("2026-08-03")), 3),
            Summary::Empty
        );
    }

    #[test]
    fn count_ties_break_alphabetically_and_top_n_truncates() {
        let rows = vec![
            row("2026-08-01", "Zeta"),
            row("2026-08-01", "Alfa"),
            row("2026-08-01", "Beta"),
            row("2026-08-01", "Beta"),
        ];
        let s = summarize(&rows, SummaryFilter::AllTime, 2);
        match s {
            Summary::Top { entries, .. } => {
                assert_eq!(entries[0].category, "Beta");
                assert_eq!(entries[1].category, "Alfa", "tie Alfa/Zeta → alphabetical");
                assert_eq!(entries.len(), 2);
            }
            Summary::Empty => panic!("expected data"),
        }
    }
}
