//! Battery health analytics.
//!
//! Turns time-ordered battery-level readings into per-device health verdicts
//! and per-group summaries ranked worst-first. The core is pure and
//! synchronous; `engine::BatteryAnalytics` is the entry point.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;

pub use engine::{BatteryAnalytics, SummaryFilter};
pub use model::{AnalyticsError, DeviceHealth, GroupSummary, HealthStatus, Reading};
