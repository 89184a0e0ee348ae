//! Configuration from the command line and environment

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use crate::carve::TimeWindow;
use crate::dhav::date::parse_compact;

/// Command line; every option can also come from a `CARVER_*` variable
#[derive(Parser, Debug)]
#[command(name = "dhav-carver", version, about = "Carver for DHAV video frames")]
#[command(after_help = "Example: dhav-carver --csv --start 20240802154200 --stop 20240802164200 freespace.dd")]
pub struct Cli {
    /// The file to search for DHAV frames
    #[arg(env = "CARVER_INPUT")]
    pub input: PathBuf,

    /// Byte offset in the file to start searching from
    #[arg(short, long, env = "CARVER_SKIP", default_value_t = 0)]
    pub skip: u64,

    /// Directory to write output to
    #[arg(short, long, env = "CARVER_OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// Only extract frames created at or after this timestamp (YYYYMMDDHHMMSS)
    #[arg(long, env = "CARVER_START", value_parser = parse_timestamp)]
    pub start: Option<NaiveDateTime>,

    /// Only extract frames created at or before this timestamp (YYYYMMDDHHMMSS)
    #[arg(long, env = "CARVER_STOP", value_parser = parse_timestamp)]
    pub stop: Option<NaiveDateTime>,

    /// Write found_all.csv (and found_selection.csv with --start/--stop)
    #[arg(long, env = "CARVER_CSV")]
    pub csv: bool,

    /// Only search, do not extract any frames
    #[arg(long, alias = "dryrun", env = "CARVER_DRY_RUN")]
    pub dry_run: bool,

    /// Seconds between progress lines
    #[arg(long, env = "CARVER_PROGRESS_INTERVAL", default_value_t = 5)]
    pub progress_interval: u64,

    /// Level of logging, -vv enables debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    parse_compact(s).map_err(|e| format!("expected YYYYMMDDHHMMSS: {e}"))
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Image to carve
    pub input: PathBuf,

    /// Where `video/` and the CSV tables go
    pub output_dir: PathBuf,

    /// Requested start offset (rounded down when mapped)
    pub skip_offset: u64,

    /// Inclusive time window
    pub window: TimeWindow,

    /// Write the CSV frame tables
    pub emit_csv: bool,

    /// Scan and report, write no container files
    pub dry_run: bool,

    pub progress_interval: Duration,

    pub log_level: Level,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if let (Some(start), Some(stop)) = (cli.start, cli.stop) {
            if start > stop {
                bail!("--start {} is later than --stop {}", start, stop);
            }
        }

        Ok(Self {
            input: cli.input,
            output_dir: cli.output,
            skip_offset: cli.skip,
            window: TimeWindow::new(cli.start, cli.stop),
            emit_csv: cli.csv,
            dry_run: cli.dry_run,
            progress_interval: Duration::from_secs(cli.progress_interval),
            log_level: level_for(cli.verbose),
        })
    }
}

/// 0 = warn, 1 = info, 2 = debug, 3+ = trace
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let cli = Cli::try_parse_from(std::iter::once("dhav-carver").chain(args.iter().copied()))?;
        Config::from_cli(cli)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["image.dd"]).unwrap();
        assert_eq!(config.input, PathBuf::from("image.dd"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.skip_offset, 0);
        assert!(!config.window.is_configured());
        assert!(!config.emit_csv);
        assert!(!config.dry_run);
        assert_eq!(config.progress_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn test_full_command_line() {
        let config = parse(&[
            "--csv",
            "--start",
            "20240802154200",
            "--stop",
            "20240802164200",
            "-s",
            "1048576",
            "-o",
            "/tmp/out",
            "--dryrun",
            "-vv",
            "freespace.dd",
        ])
        .unwrap();
        assert!(config.emit_csv);
        assert!(config.dry_run);
        assert_eq!(config.skip_offset, 1_048_576);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.window.start, parse_compact("20240802154200").ok());
        assert_eq!(config.window.stop, parse_compact("20240802164200").ok());
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        assert!(parse(&["--start", "2024-08-02", "image.dd"]).is_err());
        assert!(parse(&["--stop", "20241302000000", "image.dd"]).is_err());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let err = parse(&["--start", "20240802164200", "--stop", "20240802154200", "image.dd"]).unwrap_err();
        assert!(err.to_string().contains("later than"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(7), Level::TRACE);
    }
}
