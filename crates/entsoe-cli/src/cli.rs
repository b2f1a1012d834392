//! CLI argument definitions for entsoe-ingest.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | search path | TOML configuration file |
//! | `--debug` | `false` | Dry run: print points, never write to the store |
//! | `--json` | `false` | With `--debug`, print points as JSON |
//! | `--verbose` | `false` | Log at debug level |
//! | `--date` | today (UTC) | Day to request |
//! | `--start`/`--end` | | Explicit window bounds (`YYYYMMDDhhmm`) |
//! | `--from-file` | | Interpret a saved response instead of fetching |
//! | `--max-attempts` | config | Override fetch attempts |
//! | `--timeout-secs` | config | Override the per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! # Store today's prices
//! entsoe-ingest
//!
//! # Inspect a specific day without touching Redis
//! entsoe-ingest --debug --date 2024-03-31
//!
//! # Re-run normalization on a captured response
//! entsoe-ingest --debug --json --from-file response.xml
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Fetch ENTSO-E day-ahead prices and store them in a Redis time series.
#[derive(Debug, Parser)]
#[command(
    name = "entsoe-ingest",
    author,
    version,
    about = "ENTSO-E day-ahead price ingest"
)]
pub struct Cli {
    /// Configuration file; defaults to the first one found on the search path.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print parsed data for the requested window without writing to Redis.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Print debug output as JSON instead of text.
    #[arg(long, default_value_t = false, requires = "debug")]
    pub json: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Day to request, as YYYY-MM-DD (UTC).
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub date: Option<String>,

    /// Window start, as YYYYMMDDhhmm (UTC).
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Window end, as YYYYMMDDhhmm (UTC).
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Interpret a previously saved API response instead of fetching.
    #[arg(long)]
    pub from_file: Option<PathBuf>,

    /// Total fetch attempts, first one included.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn date_and_explicit_window_are_exclusive() {
        let result = Cli::try_parse_from([
            "entsoe-ingest",
            "--date",
            "2024-01-01",
            "--start",
            "202401010000",
            "--end",
            "202401020000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn start_without_end_is_rejected() {
        let result = Cli::try_parse_from(["entsoe-ingest", "--start", "202401010000"]);
        assert!(result.is_err());
    }

    #[test]
    fn json_requires_debug() {
        assert!(Cli::try_parse_from(["entsoe-ingest", "--json"]).is_err());

        let cli = Cli::try_parse_from(["entsoe-ingest", "--debug", "--json", "--max-attempts", "5"])
            .expect("valid arguments");
        assert!(cli.debug && cli.json);
        assert_eq!(cli.max_attempts, Some(5));
    }
}
