//! Dashboard aggregate shapes and their zero-filled fallbacks.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, Status};

/// Number of days in the fallback `bugs_over_time` series.
pub const FALLBACK_CHART_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: u64,
}

/// Headline counters for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bugs: u64,
    pub my_bugs: u64,
    pub recent_bugs: u64,
    pub status_counts: Vec<StatusCount>,
    pub priority_counts: Vec<PriorityCount>,
}

impl DashboardStats {
    /// All counters zero, every status and priority present.
    pub fn zeroed() -> Self {
        Self {
            total_bugs: 0,
            my_bugs: 0,
            recent_bugs: 0,
            status_counts: zero_fill_statuses(&[]),
            priority_counts: zero_fill_priorities(&[]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTime {
    pub priority: Priority,
    pub avg_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub bugs_over_time: Vec<DayCount>,
    pub resolution_times: Vec<ResolutionTime>,
}

impl ChartData {
    /// The fallback: a week of zero counts ending `today` and zero averages.
    pub fn zeroed(today: NaiveDate) -> Self {
        Self {
            bugs_over_time: zero_fill_days(today, FALLBACK_CHART_DAYS, &[]),
            resolution_times: zero_fill_resolution(&[]),
        }
    }
}

/// Expands sparse `(status, count)` pairs into all four statuses in order.
pub fn zero_fill_statuses(sparse: &[(Status, u64)]) -> Vec<StatusCount> {
    Status::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: lookup(sparse, &status).unwrap_or(0),
        })
        .collect()
}

/// Expands sparse `(priority, count)` pairs into all four priorities in order.
pub fn zero_fill_priorities(sparse: &[(Priority, u64)]) -> Vec<PriorityCount> {
    Priority::ALL
        .iter()
        .map(|&priority| PriorityCount {
            priority,
            count: lookup(sparse, &priority).unwrap_or(0),
        })
        .collect()
}

/// Expands sparse per-priority averages, rounding each to one decimal place.
pub fn zero_fill_resolution(sparse: &[(Priority, f64)]) -> Vec<ResolutionTime> {
    Priority::ALL
        .iter()
        .map(|&priority| ResolutionTime {
            priority,
            avg_days: round1(lookup(sparse, &priority).unwrap_or(0.0)),
        })
        .collect()
}

/// One entry per day for the `days` days ending at `today`, ascending.
pub fn zero_fill_days(today: NaiveDate, days: u32, sparse: &[(String, u64)]) -> Vec<DayCount> {
    (0..i64::from(days))
        .rev()
        .map(|back| {
            let date = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
            let count = lookup(sparse, &date).unwrap_or(0);
            DayCount { date, count }
        })
        .collect()
}

fn lookup<K: PartialEq, V: Copy>(pairs: &[(K, V)], key: &K) -> Option<V> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
