mod cli;
mod config;
mod error;
mod output;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use entsoe_core::{interpret, Pipeline, RawDocument, RequestWindow};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::CliError;
use crate::store::{PriceStore, RedisTimeSeriesStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(exit_code = err.exit_code(), "{err}");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

enum Source {
    Api(Pipeline),
    File(PathBuf),
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.max_attempts, cli.timeout_secs);
    let window = request_window(&cli)?;

    let source = match &cli.from_file {
        Some(path) => Source::File(path.clone()),
        None => Source::Api(Pipeline::with_reqwest(
            config.endpoint()?,
            config.retry_config(),
        )),
    };

    if cli.debug {
        info!("dry run, nothing will be stored");
        ingest(source, &window, None::<&mut RedisTimeSeriesStore>, cli.json).await
    } else {
        let mut store = RedisTimeSeriesStore::connect(&config.redis).await?;
        ingest(source, &window, Some(&mut store), cli.json).await
    }
}

/// Prepare the store, obtain the points, then write them or render a dry run.
async fn ingest<S: PriceStore>(
    source: Source,
    window: &RequestWindow,
    store: Option<&mut S>,
    json: bool,
) -> Result<(), CliError> {
    // Before fetching, so an unusable store fails without an API call.
    let store = match store {
        Some(store) => {
            store.ensure_series().await?;
            Some(store)
        }
        None => None,
    };

    let normalized = match source {
        Source::Api(pipeline) => {
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            info!(start = window.start(), end = window.end(), "fetching day-ahead prices");
            pipeline.run(window, &cancel).await?
        }
        Source::File(path) => {
            info!(path = %path.display(), "interpreting saved response");
            let bytes = tokio::fs::read(&path).await?;
            interpret(&RawDocument::new(bytes))?
        }
    };

    match store {
        Some(store) => {
            store.write(&normalized.points).await?;
            Ok(())
        }
        None => output::render(window, &normalized, json),
    }
}

fn request_window(cli: &Cli) -> Result<RequestWindow, CliError> {
    match (&cli.date, &cli.start, &cli.end) {
        (Some(date), _, _) => Ok(RequestWindow::for_day(parse_date(date)?)),
        (None, Some(start), Some(end)) => Ok(RequestWindow::new(start.as_str(), end.as_str())?),
        _ => Ok(RequestWindow::for_day(OffsetDateTime::now_utc().date())),
    }
}

fn parse_date(value: &str) -> Result<Date, CliError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        CliError::InvalidArgument(format!("--date '{value}' is not a YYYY-MM-DD date"))
    })
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling fetch");
            cancel.cancel();
        }
    });
}
