// Shared imports for the behaviour suites
pub use entsoe_core::{
    ContentKind, ErrorKind, FetchCause, Fetcher, HttpError, IngestError, Pipeline, RequestWindow,
    RetryConfig, ScriptedHttpClient,
};
pub use std::sync::Arc;
