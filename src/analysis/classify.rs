//! Usage-rate classification.
//!
//! A device is unhealthy when it discharges strictly faster than the
//! threshold. A rate exactly at the threshold is still healthy.

use crate::analysis::usage::UsageEstimate;
use crate::model::{AnalyticsError, HealthStatus};

/// Default unhealthy threshold, in percentage points per day.
pub const DEFAULT_UNHEALTHY_THRESHOLD: f64 = 30.0;

/// Daily usage rate above which a battery needs replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThreshold(f64);

impl HealthThreshold {
    /// Builds a threshold, rejecting NaN, infinities and negative values.
    pub fn new(points_per_day: f64) -> Result<Self, AnalyticsError> {
        if !points_per_day.is_finite() || points_per_day < 0.0 {
            return Err(AnalyticsError::Config(format!(
                "unhealthy threshold must be a finite, non-negative rate, got {}",
                points_per_day
            )));
        }
        Ok(Self(points_per_day))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for HealthThreshold {
    fn default() -> Self {
        Self(DEFAULT_UNHEALTHY_THRESHOLD)
    }
}

/// Maps a usage estimate to a health status.
///
/// Indeterminate → `Unknown`; rate > threshold → `Unhealthy`;
/// otherwise `Healthy`.
pub fn classify(estimate: &UsageEstimate, threshold: HealthThreshold) -> HealthStatus {
    match estimate {
        UsageEstimate::Indeterminate(_) => HealthStatus::Unknown,
        UsageEstimate::Rate(rate) if *rate > threshold.value() => HealthStatus::Unhealthy,
        UsageEstimate::Rate(_) => HealthStatus::Healthy,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
