/// Plain-text rendering of summaries for the `battery-report` binary.

use std::fmt::Write;

use crate::model::{GroupSummary, HealthStatus};

/// Operator-facing label for a status.
pub fn status_label(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "Healthy",
        HealthStatus::Unhealthy => "Needs Replacement",
        HealthStatus::Unknown => "Unknown",
    }
}

/// `15.2%/day`, or `N/A` when no rate could be computed.
pub fn format_usage(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%/day", rate),
        None => "N/A".to_string(),
    }
}

/// One line per group, e.g.
/// `Group 101: 20 devices, 10 healthy, 5 unhealthy, 5 unknown`.
pub fn summary_line(summary: &GroupSummary) -> String {
    format!(
        "Group {}: {} devices, {} healthy, {} unhealthy, {} unknown",
        summary.group_id,
        summary.total_devices,
        summary.healthy_count,
        summary.unhealthy_count,
        summary.unknown_count
    )
}

/// Header plus one row per device, in the group's device order.
pub fn group_detail(summary: &GroupSummary) -> String {
    let mut out = format!(
        "Group {} - Device Details ({} devices)\n",
        summary.group_id, summary.total_devices
    );
    let width = summary
        .devices
        .iter()
        .map(|d| d.device_id.len())
        .max()
        .unwrap_or(0);
    for device in &summary.devices {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "  {:<width$}  {:<17}  {:>10}  {}",
            device.device_id,
            status_label(device.status),
            format_usage(device.daily_usage_rate),
            device.reading_count,
            width = width
        );
    }
    out
}
