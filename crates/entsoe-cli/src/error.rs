use std::path::PathBuf;

use entsoe_core::{ErrorKind, IngestError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Validation(#[from] entsoe_core::ValidationError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("redis store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::InvalidArgument(_)
            | Self::Validation(_) => 2,
            Self::Ingest(error) => match error.kind() {
                ErrorKind::FetchFailed => 3,
                ErrorKind::UpstreamReported => 4,
                ErrorKind::UnrecognizedResponse => 5,
                ErrorKind::InvalidPeriodStart | ErrorKind::PointOutOfRange => 6,
            },
            Self::Store(_) => 7,
            Self::Serialization(_) => 8,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_failures_map_to_distinct_exit_codes() {
        let upstream = CliError::from(IngestError::UpstreamReported {
            code: String::from("999"),
            text: String::from("No matching data found"),
        });
        let unrecognized = CliError::from(IngestError::UnrecognizedResponse {
            preview: String::from("<html>"),
        });

        assert_eq!(upstream.exit_code(), 4);
        assert_eq!(unrecognized.exit_code(), 5);
        assert_eq!(
            upstream.to_string(),
            "ENTSO-E API error 999: No matching data found"
        );
    }

    #[test]
    fn config_errors_exit_with_usage_code() {
        assert_eq!(CliError::Config(String::from("missing")).exit_code(), 2);
    }
}
