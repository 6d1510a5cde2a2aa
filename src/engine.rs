//! Query layer over an immutable reading collection.
//!
//! `BatteryAnalytics` is an ordinary value: construct one per call site or
//! share it behind a clone (the readings sit in an `Arc`). It holds no
//! mutable state, and every query recomputes from the source readings, so
//! concurrent callers need no coordination.

use std::sync::Arc;

use tracing::debug;

use crate::analysis::aggregate::{analyze_device_health, summarize_groups};
use crate::analysis::classify::HealthThreshold;
use crate::analysis::groupings::group_by_device;
use crate::analysis::usage::sort_chronologically;
use crate::logging::Component;
use crate::model::{AnalyticsError, DeviceHealth, GroupSummary, HealthStatus, Reading};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BatteryAnalytics {
    readings: Arc<[Reading]>,
    threshold: HealthThreshold,
}

impl BatteryAnalytics {
    /// Builds an engine with the default threshold.
    ///
    /// Fails on the first invalid reading (blank device id, level not
    /// finite or outside 0–100) or if any device reports readings under
    /// more than one group.
    pub fn new(readings: impl Into<Arc<[Reading]>>) -> Result<Self, AnalyticsError> {
        let readings = readings.into();
        readings.iter().try_for_each(Reading::validate)?;
        ensure_single_group_per_device(&readings)?;
        Ok(Self {
            readings,
            threshold: HealthThreshold::default(),
        })
    }

    pub fn with_threshold(mut self, threshold: HealthThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn threshold(&self) -> HealthThreshold {
        self.threshold
    }

    /// Health of every device, in first-seen order.
    pub fn device_health(&self) -> Vec<DeviceHealth> {
        analyze_device_health(&self.readings, self.threshold)
    }

    /// All group summaries, worst groups first.
    pub fn list_group_summaries(&self) -> Vec<GroupSummary> {
        summarize_groups(self.device_health())
    }

    /// The summary for `group_id`, or `None` if no device belongs to it.
    pub fn get_group_detail(&self, group_id: i64) -> Option<GroupSummary> {
        let found = self
            .list_group_summaries()
            .into_iter()
            .find(|s| s.group_id == group_id);
        if found.is_none() {
            debug!(component = %Component::Query, group_id, "group not found");
        }
        found
    }

    /// Summaries whose group id contains `query` as a decimal substring.
    /// A blank query matches every group.
    pub fn search_groups(&self, query: &str) -> Vec<GroupSummary> {
        self.filter_groups(&SummaryFilter::default().group_query(query))
    }

    /// Summaries passing `filter`, keeping the severity order.
    pub fn filter_groups(&self, filter: &SummaryFilter) -> Vec<GroupSummary> {
        self.list_group_summaries()
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Narrows a summary list by group id text and/or device status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryFilter {
    query: Option<String>,
    status: Option<HealthStatus>,
}

impl SummaryFilter {
    pub fn group_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    /// Keep only groups with at least one device in `status`.
    pub fn with_status(mut self, status: HealthStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, summary: &GroupSummary) -> bool {
        let id_ok = self
            .query
            .as_deref()
            .is_none_or(|q| summary.group_id.to_string().contains(q));
        let status_ok = self.status.is_none_or(|s| summary.count_of(s) > 0);
        id_ok && status_ok
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Rejects devices whose readings name more than one group.
///
/// `first` in the error is the group of the chronologically earliest reading.
pub fn ensure_single_group_per_device(readings: &[Reading]) -> Result<(), AnalyticsError> {
    for (device_id, device_readings) in group_by_device(readings) {
        let sorted = sort_chronologically(&device_readings);
        let Some(first) = sorted.first() else { continue };
        if let Some(other) = sorted.iter().find(|r| r.group_id != first.group_id) {
            return Err(AnalyticsError::MixedGroup {
                device_id: device_id.to_string(),
                first: first.group_id,
                other: other.group_id,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
