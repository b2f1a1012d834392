//! RedisTimeSeries sink for normalized price points.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use entsoe_core::PricePoint;
use redis::aio::MultiplexedConnection;
use redis::{Cmd, RedisError};
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::error::CliError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CliError>> + Send + 'a>>;

/// Destination for normalized points.
pub trait PriceStore: Send {
    /// Prepare the series; called once before anything is fetched.
    fn ensure_series(&mut self) -> StoreFuture<'_, ()>;

    /// Persist `points` in order and return how many were written.
    fn write<'a>(&'a mut self, points: &'a [PricePoint]) -> StoreFuture<'a, usize>;
}

pub struct RedisTimeSeriesStore {
    connection: MultiplexedConnection,
    key: String,
    labels: BTreeMap<String, String>,
}

impl RedisTimeSeriesStore {
    /// Connect and verify the server answers before anything is fetched.
    pub async fn connect(config: &RedisConfig) -> Result<Self, RedisError> {
        let client = redis::Client::open(config.connection_url())?;
        let mut connection = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut connection).await?;
        debug!(address = %config.address, db = config.db, "redis connection ready");

        Ok(Self {
            connection,
            key: config.key.clone(),
            labels: config.labels.clone(),
        })
    }

    /// Create the series if needed; an existing key is left as is.
    async fn create_series(&mut self) -> Result<(), RedisError> {
        let result: Result<(), RedisError> = create_command(&self.key, &self.labels)
            .query_async(&mut self.connection)
            .await;
        match result {
            Ok(()) => {
                info!(key = %self.key, "created time series");
                Ok(())
            }
            Err(error) if is_key_exists(&error) => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Write all points in one pipeline and return how many were sent.
    async fn add_points(&mut self, points: &[PricePoint]) -> Result<usize, RedisError> {
        if points.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();
        for command in add_commands(&self.key, points) {
            pipe.add_command(command).ignore();
        }
        let _: () = pipe.query_async(&mut self.connection).await?;

        info!(key = %self.key, count = points.len(), "stored price points");
        Ok(points.len())
    }
}

impl PriceStore for RedisTimeSeriesStore {
    fn ensure_series(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async move { Ok(self.create_series().await?) })
    }

    fn write<'a>(&'a mut self, points: &'a [PricePoint]) -> StoreFuture<'a, usize> {
        Box::pin(async move { Ok(self.add_points(points).await?) })
    }
}

/// `TS.CREATE` with last-write-wins duplicates, so re-runs overwrite.
fn create_command(key: &str, labels: &BTreeMap<String, String>) -> Cmd {
    let mut cmd = redis::cmd("TS.CREATE");
    cmd.arg(key).arg("DUPLICATE_POLICY").arg("LAST");
    if !labels.is_empty() {
        cmd.arg("LABELS");
        for (name, value) in labels {
            cmd.arg(name).arg(value);
        }
    }
    cmd
}

fn add_commands(key: &str, points: &[PricePoint]) -> Vec<Cmd> {
    points
        .iter()
        .map(|point| {
            let mut cmd = redis::cmd("TS.ADD");
            cmd.arg(key).arg(point.store_timestamp).arg(point.price);
            cmd
        })
        .collect()
}

fn is_key_exists(error: &RedisError) -> bool {
    error.to_string().contains("key already exists")
}
