/// Battery analytics for the device health service.
///
/// The pipeline is strictly linear and pure:
/// readings → grouped by device → per-device usage estimate → status
/// → grouped by organization → summaries sorted by severity.
///
/// Submodules:
/// - `groupings`: ordered, insertion-preserving grouping by key.
/// - `usage`:     daily discharge rate estimation per device.
/// - `classify`:  maps a usage estimate to a health status.
/// - `aggregate`: per-device health and per-group summaries.

pub mod aggregate;
pub mod classify;
pub mod groupings;
pub mod usage;
