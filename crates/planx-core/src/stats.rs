//! # Statistics Handles
//!
//! Two layers of statistics feed enumeration:
//!
//! - `StatsInfo` is the derived row-count estimate every logical operator
//!   carries. Physical candidates inherit it scaled to the parent's row
//!   budget (`scale_by_expect_cnt`).
//! - `StatisticTable` is the per-table summary gathered by ANALYZE: total
//!   row count plus per-column and per-index histograms keyed by stable id.
//!   Index-join inner scans use the average-rows-per-value estimate to size
//!   one lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derived row-count estimate for one plan node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsInfo {
    pub row_count: f64,
    /// True when the estimate comes from pseudo statistics rather than a
    /// real histogram.
    pub use_pseudo: bool,
}

impl StatsInfo {
    pub fn new(row_count: f64) -> Self {
        Self {
            row_count,
            use_pseudo: false,
        }
    }

    pub fn count(&self) -> f64 {
        self.row_count
    }

    /// Clamp the estimate to the parent's row budget. A parent that stops
    /// after `expected_cnt` rows never observes more than that many.
    pub fn scale_by_expect_cnt(&self, expected_cnt: f64) -> StatsInfo {
        if expected_cnt < self.row_count {
            return StatsInfo {
                row_count: expected_cnt,
                use_pseudo: self.use_pseudo,
            };
        }
        self.clone()
    }
}

/// Rows-per-distinct-value assumed when no histogram exists.
pub const PSEUDO_EQUAL_RATE: f64 = 1000.0;

/// Histogram summary for one column or index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Number of distinct values.
    pub ndv: f64,
}

impl Histogram {
    pub fn new(ndv: f64) -> Self {
        Self { ndv }
    }

    /// Average rows per distinct value, floored at one row.
    pub fn avg_count_per_value(&self, table_count: f64) -> f64 {
        (table_count / self.ndv.max(1.0)).max(1.0)
    }
}

/// ANALYZE output for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticTable {
    pub count: f64,
    /// True when no ANALYZE has run and the histograms are absent.
    pub pseudo: bool,
    /// Column histograms keyed by column `unique_id`.
    pub columns: HashMap<i64, Histogram>,
    /// Index histograms keyed by index id.
    pub indices: HashMap<i64, Histogram>,
}

impl StatisticTable {
    pub fn pseudo_avg_count_per_value(&self) -> f64 {
        (self.count / PSEUDO_EQUAL_RATE).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_by_expect_cnt() {
        let stats = StatsInfo::new(1000.0);
        assert_eq!(stats.scale_by_expect_cnt(10.0).row_count, 10.0);
        assert_eq!(stats.scale_by_expect_cnt(5000.0).row_count, 1000.0);
        assert_eq!(stats.scale_by_expect_cnt(f64::INFINITY).row_count, 1000.0);
    }

    #[test]
    fn test_avg_count_per_value() {
        let hist = Histogram::new(50.0);
        assert_eq!(hist.avg_count_per_value(1000.0), 20.0);
        // Floored at one row per value.
        assert_eq!(hist.avg_count_per_value(10.0), 1.0);
    }

    #[test]
    fn test_pseudo_avg_count_per_value() {
        let table = StatisticTable {
            count: 5000.0,
            pseudo: true,
            ..Default::default()
        };
        assert_eq!(table.pseudo_avg_count_per_value(), 5.0);
    }
}
