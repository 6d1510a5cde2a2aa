/// Bundled reading dataset loader.
///
/// The dataset is a JSON array of reading records. Field names follow the
/// service's own model (`deviceId`, `groupId`, `employeeId`, `level`,
/// `timestamp`); the older export keys (`serialNumber`, `academyId`,
/// `batteryLevel`) are accepted as aliases so existing files load unchanged.
///
/// Every record is validated here. A malformed timestamp or level fails the
/// whole load with an error naming the device rather than being coerced.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::logging::Component;
use crate::model::{AnalyticsError, Reading};

// ============================================================================
// Level scale
// ============================================================================

/// How battery levels are expressed in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelScale {
    /// 0–100, used as-is.
    #[default]
    Percent,
    /// 0–1, multiplied by 100 on load.
    Fraction,
}

impl LevelScale {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "percent" => Some(LevelScale::Percent),
            "fraction" => Some(LevelScale::Fraction),
            _ => None,
        }
    }

    /// Converts a raw level to percentage points.
    pub fn to_percent(self, raw: f64) -> f64 {
        match self {
            LevelScale::Percent => raw,
            LevelScale::Fraction => raw * 100.0,
        }
    }
}

// ============================================================================
// Raw record
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReading {
    #[serde(alias = "serialNumber")]
    device_id: String,
    #[serde(alias = "academyId")]
    group_id: i64,
    #[serde(default)]
    employee_id: String,
    #[serde(alias = "batteryLevel")]
    level: f64,
    timestamp: String,
}

impl RawReading {
    fn into_reading(self, scale: LevelScale) -> Result<Reading, AnalyticsError> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            AnalyticsError::InvalidTimestamp {
                device_id: self.device_id.clone(),
                value: self.timestamp.clone(),
            }
        })?;
        Reading::new(
            self.device_id,
            self.group_id,
            self.employee_id,
            scale.to_percent(self.level),
            timestamp,
        )
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses an RFC 3339 timestamp (any offset) into UTC.
///
/// Timestamps without an offset (`2024-05-01T12:00:00`, optional fractional
/// seconds) are taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses a JSON array of readings held in memory.
pub fn parse_readings(json: &str, scale: LevelScale) -> Result<Vec<Reading>, AnalyticsError> {
    parse_with_source(json, scale, "<memory>")
}

/// Reads and parses the dataset file at `path`.
pub fn load_readings<P: AsRef<Path>>(
    path: P,
    scale: LevelScale,
) -> Result<Vec<Reading>, AnalyticsError> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|e| AnalyticsError::DataFile {
        path: source.clone(),
        message: e.to_string(),
    })?;
    parse_with_source(&json, scale, &source)
}

fn parse_with_source(
    json: &str,
    scale: LevelScale,
    source: &str,
) -> Result<Vec<Reading>, AnalyticsError> {
    let raw: Vec<RawReading> =
        serde_json::from_str(json).map_err(|e| AnalyticsError::DataFile {
            path: source.to_string(),
            message: e.to_string(),
        })?;

    let readings = raw
        .into_iter()
        .map(|r| r.into_reading(scale))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        component = %Component::Dataset,
        source,
        readings = readings.len(),
        "dataset loaded"
    );
    Ok(readings)
}

// ============================================================================
// Tests
// ============================================================================
