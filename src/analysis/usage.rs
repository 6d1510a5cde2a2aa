//! Daily discharge rate estimation.
//!
//! A device's readings are sorted chronologically and scanned as consecutive
//! pairs. Only pairs where the level went down (discharge intervals) count:
//! charging and flat intervals are skipped entirely, so a device that spent
//! the night on a charger is not credited with negative usage.
//!
//! The rate is normalised by the time spent in discharge intervals, not by
//! the wall-clock span between the first and last reading. Irregular
//! sampling therefore still produces comparable numbers.

use crate::model::Reading;

/// Milliseconds in a 24 hour day.
pub const MILLIS_PER_DAY: f64 = 24.0 * 3600.0 * 1000.0;

/// Why no usage rate could be computed for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indeterminate {
    /// Fewer than two readings.
    InsufficientReadings,
    /// No consecutive pair showed a drop in level.
    NoDischargeInterval,
    /// Discharge was seen but the contributing intervals span zero time.
    ZeroElapsed,
}

/// Outcome of estimating one device's usage: a rate, or an explicit
/// "no rate available" with the reason. Distinct from a rate of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageEstimate {
    /// Percentage points discharged per 24 hours.
    Rate(f64),
    Indeterminate(Indeterminate),
}

impl UsageEstimate {
    /// The rate, if one was computed.
    pub fn rate(&self) -> Option<f64> {
        match self {
            UsageEstimate::Rate(rate) => Some(*rate),
            UsageEstimate::Indeterminate(_) => None,
        }
    }
}

/// Returns the readings sorted ascending by timestamp.
///
/// The sort is stable: readings sharing a timestamp keep their original
/// relative order.
pub fn sort_chronologically<'a>(readings: &[&'a Reading]) -> Vec<&'a Reading> {
    let mut sorted = readings.to_vec();
    sorted.sort_by_key(|r| r.timestamp);
    sorted
}

/// Estimates the daily usage rate from one device's readings, in any order.
pub fn estimate_daily_usage(readings: &[&Reading]) -> UsageEstimate {
    estimate_from_sorted(&sort_chronologically(readings))
}

/// Estimates the daily usage rate from readings already in chronological
/// order. Callers that sort for other reasons can skip a second sort.
pub fn estimate_from_sorted(sorted: &[&Reading]) -> UsageEstimate {
    if sorted.len() < 2 {
        return UsageEstimate::Indeterminate(Indeterminate::InsufficientReadings);
    }

    let (total_drop, total_elapsed_ms, intervals) = sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            let drop = prev.level - curr.level;
            (drop > 0.0).then(|| (drop, (curr.timestamp - prev.timestamp).num_milliseconds()))
        })
        .fold((0.0_f64, 0_i64, 0_usize), |(drop_sum, elapsed_sum, n), (drop, elapsed)| {
            (drop_sum + drop, elapsed_sum + elapsed, n + 1)
        });

    if intervals == 0 {
        return UsageEstimate::Indeterminate(Indeterminate::NoDischargeInterval);
    }
    if total_elapsed_ms <= 0 {
        return UsageEstimate::Indeterminate(Indeterminate::ZeroElapsed);
    }

    let elapsed_days = total_elapsed_ms as f64 / MILLIS_PER_DAY;
    UsageEstimate::Rate(total_drop / elapsed_days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
