//! Device-level assessment and group-level rollup.
//!
//! `analyze_device_health` turns raw readings into one `DeviceHealth` per
//! device (first-seen order). `summarize_groups` rolls those into one
//! `GroupSummary` per group and ranks groups worst-first by unhealthy count.

use tracing::debug;

use crate::analysis::classify::{HealthThreshold, classify};
use crate::analysis::groupings::{group_by_device, group_by_key};
use crate::analysis::usage::{UsageEstimate, estimate_from_sorted, sort_chronologically};
use crate::logging::{self, Component};
use crate::model::{DeviceHealth, GroupSummary, Reading};

// ---------------------------------------------------------------------------
// Per-device health
// ---------------------------------------------------------------------------

/// Assesses a single device from its readings (any order, at least one).
///
/// The chronologically first reading determines the device's group.
/// Returns `None` only for an empty reading list, which the grouper never
/// produces.
pub fn assess_device(
    device_id: &str,
    readings: &[&Reading],
    threshold: HealthThreshold,
) -> Option<DeviceHealth> {
    let sorted = sort_chronologically(readings);
    let first = sorted.first()?;

    let estimate = estimate_from_sorted(&sorted);
    if let UsageEstimate::Indeterminate(reason) = estimate {
        logging::log_indeterminate(device_id, reason);
    }

    Some(DeviceHealth {
        device_id: device_id.to_string(),
        group_id: first.group_id,
        status: classify(&estimate, threshold),
        daily_usage_rate: estimate.rate(),
        reading_count: sorted.len(),
    })
}

/// Computes health for every device, in first-seen device order.
pub fn analyze_device_health(readings: &[Reading], threshold: HealthThreshold) -> Vec<DeviceHealth> {
    let devices: Vec<DeviceHealth> = group_by_device(readings)
        .into_iter()
        .filter_map(|(device_id, device_readings)| {
            assess_device(device_id, &device_readings, threshold)
        })
        .collect();

    debug!(
        component = %Component::Estimator,
        readings = readings.len(),
        devices = devices.len(),
        "device health computed"
    );
    devices
}

// ---------------------------------------------------------------------------
// Per-group summaries
// ---------------------------------------------------------------------------

/// Rolls device results into group summaries, sorted by descending
/// unhealthy count. Groups with equal counts keep first-appearance order.
pub fn summarize_groups(devices: Vec<DeviceHealth>) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = group_by_key(devices, |d| d.group_id)
        .into_iter()
        .map(|(group_id, members)| {
            members.into_iter().fold(GroupSummary::empty(group_id), |mut summary, device| {
                summary.tally(device);
                summary
            })
        })
        .collect();

    // sort_by is stable; ties stay in first-appearance order.
    summaries.sort_by(|a, b| b.unhealthy_count.cmp(&a.unhealthy_count));

    debug!(
        component = %Component::Aggregator,
        groups = summaries.len(),
        "group summaries ranked"
    );
    summaries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HealthStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn at(device: &str, group: i64, hours: i64, level: f64) -> Reading {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        Reading::new(device, group, "EMP-1", level, start + Duration::hours(hours)).unwrap()
    }

    fn health(device: &str, group: i64, status: HealthStatus) -> DeviceHealth {
        DeviceHealth {
            device_id: device.to_string(),
            group_id: group,
            status,
            daily_usage_rate: None,
            reading_count: 2,
        }
    }

    #[test]
    fn test_assess_device_uses_earliest_reading_for_group() {
        let readings = [at("SN-1", 202, 24, 50.0), at("SN-1", 202, 0, 80.0)];
        let refs: Vec<&Reading> = readings.iter().collect();
        let device = assess_device("SN-1", &refs, HealthThreshold::default()).unwrap();
        assert_eq!(device.group_id, 202);
        assert_eq!(device.status, HealthStatus::Healthy);
        assert_eq!(device.daily_usage_rate, Some(30.0));
        assert_eq!(device.reading_count, 2);
    }

    #[test]
    fn test_assess_device_without_readings_is_none() {
        assert!(assess_device("SN-1", &[], HealthThreshold::default()).is_none());
    }

    #[test]
    fn test_single_reading_device_is_unknown_without_rate() {
        let devices = analyze_device_health(&[at("SN-1", 1, 0, 55.0)], HealthThreshold::default());
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].status, HealthStatus::Unknown);
        assert_eq!(devices[0].daily_usage_rate, None);
        assert_eq!(devices[0].reading_count, 1);
    }

    #[test]
    fn test_devices_listed_in_first_seen_order() {
        let readings = [
            at("SN-B", 1, 0, 90.0),
            at("SN-A", 1, 0, 90.0),
            at("SN-B", 1, 12, 70.0),
        ];
        let devices = analyze_device_health(&readings, HealthThreshold::default());
        let ids: Vec<_> = devices.iter().map(|d| d.device_id.as_str()).collect();
        assert_eq!(ids, ["SN-B", "SN-A"]);
    }

    #[test]
    fn test_summaries_sorted_worst_first() {
        let devices = vec![
            health("A", 1, HealthStatus::Healthy),
            health("B", 2, HealthStatus::Unhealthy),
            health("C", 3, HealthStatus::Unhealthy),
            health("D", 3, HealthStatus::Unhealthy),
            health("E", 1, HealthStatus::Unknown),
        ];
        let summaries = summarize_groups(devices);
        let order: Vec<_> = summaries.iter().map(|s| s.group_id).collect();
        assert_eq!(order, [3, 2, 1]);
        assert_eq!(summaries[2].total_devices, 2);
        assert_eq!(summaries[2].unknown_count, 1);
    }

    #[test]
    fn test_equal_unhealthy_counts_keep_first_appearance_order() {
        let devices = vec![
            health("A", 30, HealthStatus::Healthy),
            health("B", 10, HealthStatus::Unknown),
            health("C", 20, HealthStatus::Unhealthy),
            health("D", 40, HealthStatus::Healthy),
        ];
        let order: Vec<_> = summarize_groups(devices).iter().map(|s| s.group_id).collect();
        assert_eq!(order, [20, 30, 10, 40], "ties must preserve first-appearance order");
    }

    #[test]
    fn test_no_devices_no_summaries() {
        assert!(summarize_groups(Vec::new()).is_empty());
    }
}
