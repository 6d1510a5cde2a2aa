/// Core data types for the battery health service.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw `Reading`, the derived `DeviceHealth` and `GroupSummary` value
/// objects, and the error type used at the input boundary.
/// It contains no analysis logic and no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Level bounds
// ---------------------------------------------------------------------------

/// Lowest valid battery level, in percentage points.
pub const MIN_LEVEL: f64 = 0.0;

/// Highest valid battery level, in percentage points.
pub const MAX_LEVEL: f64 = 100.0;

// ---------------------------------------------------------------------------
// Reading type
// ---------------------------------------------------------------------------

/// A single battery-level report from one device.
///
/// Readings are externally supplied and immutable. For a given `device_id`
/// they may arrive in any order and may share timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub device_id: String,
    pub group_id: i64,
    pub employee_id: String, // informational only
    pub level: f64,          // percentage points, 0–100
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Builds a validated reading.
    ///
    /// Rejects blank device identifiers and levels that are not finite or
    /// fall outside `MIN_LEVEL..=MAX_LEVEL`, so a bad record can never turn
    /// into a misleading health verdict later on.
    pub fn new(
        device_id: impl Into<String>,
        group_id: i64,
        employee_id: impl Into<String>,
        level: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, AnalyticsError> {
        let reading = Self {
            device_id: device_id.into(),
            group_id,
            employee_id: employee_id.into(),
            level,
            timestamp,
        };
        reading.validate()?;
        Ok(reading)
    }

    /// Checks the invariants `new` enforces. Readings built as struct
    /// literals bypass `new`, so the engine re-runs this on every reading.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.device_id.trim().is_empty() {
            return Err(AnalyticsError::MissingDeviceId);
        }
        if !self.level.is_finite() || !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(AnalyticsError::InvalidLevel {
                device_id: self.device_id.clone(),
                level: self.level,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// Health verdict for a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Per-device result, recomputed on every query.
///
/// `daily_usage_rate` is `None` exactly when the usage estimate was
/// indeterminate; it serializes as `null` in that case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHealth {
    pub device_id: String,
    pub group_id: i64,
    pub status: HealthStatus,
    pub daily_usage_rate: Option<f64>,
    pub reading_count: usize,
}

/// Per-group rollup of device verdicts.
///
/// `total_devices` always equals the sum of the three status counts and the
/// length of `devices`. Devices keep the order in which they were first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_id: i64,
    pub total_devices: usize,
    pub healthy_count: usize,
    pub unhealthy_count: usize,
    pub unknown_count: usize,
    pub devices: Vec<DeviceHealth>,
}

impl GroupSummary {
    /// An empty summary for `group_id`, ready to have devices tallied in.
    pub fn empty(group_id: i64) -> Self {
        Self {
            group_id,
            total_devices: 0,
            healthy_count: 0,
            unhealthy_count: 0,
            unknown_count: 0,
            devices: Vec::new(),
        }
    }

    /// Adds one device to the summary and bumps the matching counter.
    pub fn tally(&mut self, device: DeviceHealth) {
        match device.status {
            HealthStatus::Healthy => self.healthy_count += 1,
            HealthStatus::Unhealthy => self.unhealthy_count += 1,
            HealthStatus::Unknown => self.unknown_count += 1,
        }
        self.total_devices += 1;
        self.devices.push(device);
    }

    /// Number of devices in this group with the given status.
    pub fn count_of(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Healthy => self.healthy_count,
            HealthStatus::Unhealthy => self.unhealthy_count,
            HealthStatus::Unknown => self.unknown_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised at the input boundary: loading, validating, configuring.
///
/// Analysis itself never fails; an engine built from validated readings
/// answers every query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    /// The timestamp string could not be parsed as an RFC 3339 instant.
    #[error("invalid timestamp for device {device_id}: {value:?}")]
    InvalidTimestamp { device_id: String, value: String },
    /// The level is NaN, infinite, or outside 0–100.
    #[error("invalid battery level for device {device_id}: {level}")]
    InvalidLevel { device_id: String, level: f64 },
    /// A reading carried an empty device identifier.
    #[error("reading has an empty device identifier")]
    MissingDeviceId,
    /// One device reported readings under two different groups.
    #[error("device {device_id} reports group {first} and group {other}")]
    MixedGroup {
        device_id: String,
        first: i64,
        other: i64,
    },
    /// The dataset file could not be read or decoded.
    #[error("failed to load dataset {path}: {message}")]
    DataFile { path: String, message: String },
    /// The configuration file or an override was invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
