//! `battery-report`: prints group summaries for the configured dataset.

use std::error::Error;
use std::process::ExitCode;

use battery_health_service::config::{Config, DEFAULT_CONFIG_PATH};
use battery_health_service::ingest::dataset::load_readings;
use battery_health_service::logging::{self, Component};
use battery_health_service::{BatteryAnalytics, GroupSummary, HealthStatus, SummaryFilter, report};
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "battery-report", about = "Battery health summaries per group")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Show device details for one group
    #[arg(short, long, allow_negative_numbers = true, conflicts_with_all = ["search", "status"])]
    group: Option<i64>,
    /// Keep groups whose id contains this text
    #[arg(short, long)]
    search: Option<String>,
    /// Keep groups with at least one device in this status
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusArg {
    Healthy,
    Unhealthy,
    Unknown,
}

impl From<StatusArg> for HealthStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Healthy => HealthStatus::Healthy,
            StatusArg::Unhealthy => HealthStatus::Unhealthy,
            StatusArg::Unknown => HealthStatus::Unknown,
        }
    }
}

impl Cli {
    fn filter(&self) -> SummaryFilter {
        let filter = SummaryFilter::default().group_query(self.search.as_deref().unwrap_or(""));
        match self.status {
            Some(status) => filter.with_status(status.into()),
            None => filter,
        }
    }
}

/// What a report run produced, before anything is printed.
#[derive(Debug, PartialEq)]
enum Rendered {
    /// Text for stdout.
    Output(String),
    GroupNotFound(i64),
}

impl Rendered {
    fn exit_status(&self) -> u8 {
        match self {
            Rendered::Output(_) => 0,
            Rendered::GroupNotFound(_) => 1,
        }
    }

    fn stderr_message(&self) -> Option<String> {
        match self {
            Rendered::Output(_) => None,
            Rendered::GroupNotFound(id) => Some(format!("Group {} not found", id)),
        }
    }
}

fn render(engine: &BatteryAnalytics, cli: &Cli) -> Result<Rendered, serde_json::Error> {
    if let Some(group_id) = cli.group {
        let Some(detail) = engine.get_group_detail(group_id) else {
            return Ok(Rendered::GroupNotFound(group_id));
        };
        let text = if cli.json {
            serde_json::to_string_pretty(&detail)? + "\n"
        } else {
            report::group_detail(&detail)
        };
        return Ok(Rendered::Output(text));
    }

    let all = engine.list_group_summaries();
    log_fleet(&all);

    let filter = cli.filter();
    let summaries: Vec<GroupSummary> = all.into_iter().filter(|s| filter.matches(s)).collect();
    info!(component = %Component::System, groups = summaries.len(), "report ready");

    let text = if cli.json {
        serde_json::to_string_pretty(&summaries)? + "\n"
    } else if summaries.is_empty() {
        "No groups match filters\n".to_string()
    } else {
        summaries
            .iter()
            .map(|s| report::summary_line(s) + "\n")
            .collect()
    };
    Ok(Rendered::Output(text))
}

/// Healthy, unhealthy and unknown device totals across `summaries`.
fn fleet_counts(summaries: &[GroupSummary]) -> (usize, usize, usize) {
    summaries.iter().fold((0, 0, 0), |(h, u, k), s| {
        (h + s.healthy_count, u + s.unhealthy_count, k + s.unknown_count)
    })
}

/// Fleet-wide counts, taken from the unfiltered summaries.
fn log_fleet(summaries: &[GroupSummary]) {
    let (healthy, unhealthy, unknown) = fleet_counts(summaries);
    logging::log_analysis_summary(healthy + unhealthy + unknown, healthy, unhealthy, unknown);
}

fn run(cli: &Cli) -> Result<Rendered, Box<dyn Error>> {
    let config = Config::from_env(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))?;
    logging::init_logger(
        config.log_level()?,
        config.log_file.as_deref(),
        config.log_timestamps,
    )?;

    let readings = load_readings(&config.data_path, config.level_scale)?;
    let engine = BatteryAnalytics::new(readings)?.with_threshold(config.threshold()?);
    Ok(render(&engine, cli)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(rendered) => {
            if let Rendered::Output(text) = &rendered {
                print!("{}", text);
            }
            if let Some(message) = rendered.stderr_message() {
                eprintln!("{}", message);
            }
            ExitCode::from(rendered.exit_status())
        }
        Err(e) => {
            eprintln!("battery-report: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battery_health_service::Reading;
    use chrono::{Duration, TimeZone, Utc};
    use clap::CommandFactory;

    fn at(device: &str, group: i64, hours: i64, level: f64) -> Reading {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        Reading::new(device, group, "EMP-1", level, start + Duration::hours(hours)).unwrap()
    }

    /// Group 101 healthy, 202 unhealthy, 303 unknown.
    fn engine() -> BatteryAnalytics {
        BatteryAnalytics::new(vec![
            at("SN-1", 101, 0, 80.0),
            at("SN-1", 101, 24, 50.0),
            at("SN-2", 202, 0, 90.0),
            at("SN-2", 202, 12, 70.0),
            at("SN-3", 303, 0, 40.0),
        ])
        .unwrap()
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("battery-report").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn output(rendered: Rendered) -> String {
        match rendered {
            Rendered::Output(text) => text,
            other => panic!("expected output, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_parse_into_typed_fields() {
        let parsed = cli(&["--config", "alt.toml", "--search", "10", "--status", "unhealthy", "--json"]);
        assert_eq!(parsed.config.as_deref(), Some("alt.toml"));
        assert_eq!(parsed.search.as_deref(), Some("10"));
        assert_eq!(parsed.status, Some(StatusArg::Unhealthy));
        assert!(parsed.json);
        assert_eq!(cli(&["--group", "202"]).group, Some(202));
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        let parse = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("battery-report").chain(args.iter().copied()))
        };
        assert!(parse(&["--status", "broken"]).is_err());
        assert!(parse(&["--group", "abc"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["--group", "1", "--search", "1"]).is_err());
    }

    #[test]
    fn test_unknown_group_reports_not_found_and_exits_1() {
        let rendered = render(&engine(), &cli(&["--group", "999"])).unwrap();
        assert_eq!(rendered, Rendered::GroupNotFound(999));
        assert_eq!(rendered.exit_status(), 1);
        assert_eq!(rendered.stderr_message().as_deref(), Some("Group 999 not found"));
    }

    #[test]
    fn test_group_detail_text_lists_devices() {
        let rendered = render(&engine(), &cli(&["--group", "202"])).unwrap();
        assert_eq!(rendered.exit_status(), 0);
        assert!(rendered.stderr_message().is_none());
        let text = output(rendered);
        assert!(text.starts_with("Group 202 - Device Details (1 devices)"));
        assert!(text.contains("SN-2"));
        assert!(text.contains("Needs Replacement"));
    }

    #[test]
    fn test_group_detail_json_shape() {
        let text = output(render(&engine(), &cli(&["--group", "101", "--json"])).unwrap());
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["groupId"], 101);
        assert_eq!(json["totalDevices"], 1);
        assert_eq!(json["healthyCount"], 1);
        assert_eq!(json["devices"][0]["deviceId"], "SN-1");
        assert_eq!(json["devices"][0]["dailyUsageRate"], 30.0);
    }

    #[test]
    fn test_default_summary_lines_in_severity_order() {
        let text = output(render(&engine(), &cli(&[])).unwrap());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Group 202: 1 devices, 0 healthy, 1 unhealthy, 0 unknown",
                "Group 101: 1 devices, 1 healthy, 0 unhealthy, 0 unknown",
                "Group 303: 1 devices, 0 healthy, 0 unhealthy, 1 unknown",
            ]
        );
    }

    #[test]
    fn test_summaries_json_is_an_array() {
        let text = output(render(&engine(), &cli(&["--json"])).unwrap());
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let ids: Vec<_> = json
            .as_array()
            .expect("summaries serialize as an array")
            .iter()
            .map(|g| g["groupId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [202, 101, 303]);
        assert_eq!(json[0]["unhealthyCount"], 1);
        assert!(json[2]["devices"][0]["dailyUsageRate"].is_null());
    }

    #[test]
    fn test_fleet_counts_match_device_health() {
        let engine = engine();
        let devices = engine.device_health();
        let count = |s: HealthStatus| devices.iter().filter(|d| d.status == s).count();
        assert_eq!(
            fleet_counts(&engine.list_group_summaries()),
            (
                count(HealthStatus::Healthy),
                count(HealthStatus::Unhealthy),
                count(HealthStatus::Unknown)
            )
        );
        assert_eq!(fleet_counts(&[]), (0, 0, 0));
    }

    #[test]
    fn test_status_filter() {
        let text = output(render(&engine(), &cli(&["--status", "unknown"])).unwrap());
        assert_eq!(text, "Group 303: 1 devices, 0 healthy, 0 unhealthy, 1 unknown\n");
    }

    #[test]
    fn test_search_filter() {
        let text = output(render(&engine(), &cli(&["--search", "10"])).unwrap());
        assert_eq!(text, "Group 101: 1 devices, 1 healthy, 0 unhealthy, 0 unknown\n");
    }

    #[test]
    fn test_filters_with_no_match() {
        let text = output(render(&engine(), &cli(&["--search", "9", "--status", "healthy"])).unwrap());
        assert_eq!(text, "No groups match filters\n");
    }
}
