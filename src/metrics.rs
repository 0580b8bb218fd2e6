//! Funnel metrics: a stateless aggregation snapshot over the store.

use crate::db::{self, Pool};
use crate::error::Result;
use crate::model::{FunnelStatus, Priority};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

const ACTIVITY_WINDOW_WEEKS: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelMetrics {
    pub total: i64,
    /// Count per status, zero-filled across all six values.
    pub by_status: BTreeMap<String, i64>,
    /// Count per priority, zero-filled across all three values.
    pub by_priority: BTreeMap<String, i64>,
    /// Count per stored category value (case-sensitive); empty categories
    /// are bucketed under "Uncategorized".
    pub by_category: BTreeMap<String, i64>,
    /// Events per `%Y-W%W` bucket over the trailing window; weeks without
    /// events are absent.
    pub weekly_activity: BTreeMap<String, i64>,
    pub total_events: i64,
    pub active_outreach: i64,
    pub response_rate: i64,
    pub meetings_set: i64,
}

/// Compute the full snapshot from current store state.
#[instrument(skip_all)]
pub async fn compute_metrics(pool: &Pool) -> Result<FunnelMetrics> {
    let total = db::count_businesses(pool).await?;

    let mut by_status: BTreeMap<String, i64> = FunnelStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for (status, count) in db::status_counts(pool).await? {
        *by_status.entry(status).or_insert(0) = count;
    }

    let mut by_priority: BTreeMap<String, i64> = Priority::ALL
        .iter()
        .map(|p| (p.as_str().to_string(), 0))
        .collect();
    for (priority, count) in db::priority_counts(pool).await? {
        *by_priority.entry(priority).or_insert(0) = count;
    }

    let mut by_category = BTreeMap::new();
    for (category, count) in db::category_counts(pool).await? {
        let label = if category.is_empty() {
            "Uncategorized".to_string()
        } else {
            category
        };
        *by_category.entry(label).or_insert(0) += count;
    }

    let since = Utc::now() - Duration::weeks(ACTIVITY_WINDOW_WEEKS);
    let weekly_activity = week_histogram(&db::event_times_since(pool, since).await?);

    let total_events = db::count_events(pool).await?;

    let status_count = |s: FunnelStatus| by_status.get(s.as_str()).copied().unwrap_or(0);
    let responded = status_count(FunnelStatus::Responded);
    let meeting = status_count(FunnelStatus::Meeting);
    let closed = status_count(FunnelStatus::Closed);
    let active_outreach = status_count(FunnelStatus::Contacted) + responded + meeting;

    Ok(FunnelMetrics {
        total,
        by_status,
        by_priority,
        by_category,
        weekly_activity,
        total_events,
        active_outreach,
        response_rate: response_rate(responded, meeting, closed, active_outreach),
        meetings_set: meeting,
    })
}

/// Bucket event times by year + week-of-year (`2026-W07` style).
fn week_histogram(times: &[DateTime<Utc>]) -> BTreeMap<String, i64> {
    let mut buckets = BTreeMap::new();
    for t in times {
        let week = t.format("%Y-W%W").to_string();
        *buckets.entry(week).or_insert(0) += 1;
    }
    buckets
}

/// Percentage of active-or-closed outreach that advanced past "contacted".
/// The denominator floors at 1, so an empty funnel reports 0.
fn response_rate(responded: i64, meeting: i64, closed: i64, active_outreach: i64) -> i64 {
    let advanced = (responded + meeting + closed) as f64;
    let denominator = (active_outreach + closed).max(1) as f64;
    (advanced / denominator * 100.0).round() as i64
}
