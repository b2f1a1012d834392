//! # entsoe-core
//!
//! Retrieval, interpretation and normalization of ENTSO-E day-ahead price
//! documents.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Raw bodies, classification into data/error documents |
//! | [`domain`] | Decoded documents, price points, resolutions, timestamps |
//! | [`endpoint`] | Request URL and window construction |
//! | [`error`] | Core error types |
//! | [`fetch`] | Retrying, cancellable fetcher |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Positional points to absolute price points |
//! | [`pipeline`] | Fetch, classify and normalize in one call |
//! | [`retry`] | Backoff and retry bounds |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use entsoe_core::{ApiEndpoint, Pipeline, RequestWindow, RetryConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoint = ApiEndpoint::new("token", "10YFI-1--------U", "10YFI-1--------U");
//!     let pipeline = Pipeline::with_reqwest(endpoint, RetryConfig::default());
//!
//!     let window = RequestWindow::new("202301010000", "202301020000")?;
//!     let normalized = pipeline.run(&window, &CancellationToken::new()).await?;
//!
//!     for point in &normalized.points {
//!         println!("{} -> {:.2}", point.time, point.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Pipeline        │────▶│ Fetcher          │──▶ HttpClient (reqwest)
//! └────────┬────────┘     └──────────────────┘
//!          │ RawDocument
//!          ▼
//! ┌─────────────────┐
//! │ classify        │──▶ Decoded::Error ──▶ IngestError::UpstreamReported
//! └────────┬────────┘
//!          │ Decoded::Data
//!          ▼
//! ┌─────────────────┐
//! │ normalize       │──▶ Normalized { points, fallbacks }
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every fatal failure is an [`IngestError`]; callers branch on its kind:
//!
//! ```rust
//! use entsoe_core::{ErrorKind, IngestError};
//!
//! fn should_page(error: &IngestError) -> bool {
//!     match error.kind() {
//!         ErrorKind::UpstreamReported => false,
//!         ErrorKind::FetchFailed
//!         | ErrorKind::UnrecognizedResponse
//!         | ErrorKind::InvalidPeriodStart
//!         | ErrorKind::PointOutOfRange => true,
//!     }
//! }
//! ```

pub mod document;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod normalize;
pub mod pipeline;
pub mod retry;

// Document classification
pub use document::{classify, ContentKind, Decoded, RawDocument, PREVIEW_CHARS};

// Domain models
pub use domain::{
    parse_resolution, DataDocument, DomainId, ErrorDocument, MarketParticipant, Period, PricePoint,
    RawPoint, Reason, Resolution, Series, TimeInterval, UtcDateTime,
};

// Request construction
pub use endpoint::{ApiEndpoint, RequestWindow};

// Error types
pub use error::{ErrorKind, FetchCause, IngestError, ValidationError};

// Fetching
pub use fetch::Fetcher;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient,
};

// Normalization
pub use normalize::{normalize, Normalized, ResolutionFallback};

// Orchestration
pub use pipeline::{interpret, Pipeline};

// Retry logic
pub use retry::{Backoff, RetryConfig};
