use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

/// Validation errors for codes, timestamps and request windows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid resolution '{value}': {reason}")]
    InvalidResolution { value: String, reason: &'static str },

    #[error("window bound must be YYYYMMDDhhmm: '{value}'")]
    InvalidWindowBound { value: String },
    #[error("window start '{start}' must be before end '{end}'")]
    EmptyWindow { start: String, end: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("period timestamp must be YYYY-MM-DDThh:mmZ: '{value}'")]
    InvalidPeriodTimestamp { value: String },
}

/// Why a fetch gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// Connection, read or per-attempt timeout failure.
    Transport(String),
    /// 5xx status on the final attempt.
    ServerStatus(u16),
    /// Non-success status that is never retried.
    Status(u16),
    /// The overall deadline elapsed.
    DeadlineExceeded(Duration),
    Cancelled,
}

impl FetchCause {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerStatus(status) | Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl Display for FetchCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::ServerStatus(status) => write!(f, "server returned {status}"),
            Self::Status(status) => write!(f, "request failed with status {status}"),
            Self::DeadlineExceeded(limit) => {
                write!(f, "deadline of {:.1}s exceeded", limit.as_secs_f64())
            }
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Coarse failure class of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FetchFailed,
    UnrecognizedResponse,
    UpstreamReported,
    InvalidPeriodStart,
    PointOutOfRange,
}

/// Fatal failures of one ingest invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("fetch failed after {attempts} attempt(s): {cause}")]
    FetchFailed { attempts: u32, cause: FetchCause },

    #[error("ENTSO-E API returned unexpected response: {preview}")]
    UnrecognizedResponse { preview: String },

    #[error("ENTSO-E API error {code}: {text}")]
    UpstreamReported { code: String, text: String },

    #[error("failed to parse period start '{value}'")]
    InvalidPeriodStart { value: String },

    #[error("point position {position} is out of range for period starting '{start}'")]
    PointOutOfRange { position: i64, start: String },
}

impl IngestError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::UnrecognizedResponse { .. } => ErrorKind::UnrecognizedResponse,
            Self::UpstreamReported { .. } => ErrorKind::UpstreamReported,
            Self::InvalidPeriodStart { .. } => ErrorKind::InvalidPeriodStart,
            Self::PointOutOfRange { .. } => ErrorKind::PointOutOfRange,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } => "ingest.fetch_failed",
            Self::UnrecognizedResponse { .. } => "ingest.unrecognized_response",
            Self::UpstreamReported { .. } => "ingest.upstream_reported",
            Self::InvalidPeriodStart { .. } => "ingest.invalid_period_start",
            Self::PointOutOfRange { .. } => "ingest.point_out_of_range",
        }
    }
}
