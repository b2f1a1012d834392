//! Fetch → classify → normalize, as one call.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::document::{classify, Decoded, RawDocument};
use crate::endpoint::{ApiEndpoint, RequestWindow};
use crate::fetch::Fetcher;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::normalize::{normalize, Normalized};
use crate::retry::RetryConfig;
use crate::IngestError;

/// Produces normalized price points for a request window. Holds no store.
#[derive(Clone)]
pub struct Pipeline {
    endpoint: ApiEndpoint,
    fetcher: Fetcher,
}

impl Pipeline {
    pub fn new(endpoint: ApiEndpoint, fetcher: Fetcher) -> Self {
        Self { endpoint, fetcher }
    }

    /// Pipeline over the given transport with `config` retry bounds.
    pub fn with_client(
        endpoint: ApiEndpoint,
        client: Arc<dyn HttpClient>,
        config: RetryConfig,
    ) -> Self {
        Self::new(endpoint, Fetcher::new(client, config))
    }

    /// Pipeline over a real reqwest transport.
    pub fn with_reqwest(endpoint: ApiEndpoint, config: RetryConfig) -> Self {
        Self::with_client(endpoint, Arc::new(ReqwestHttpClient::new()), config)
    }

    pub async fn run(
        &self,
        window: &RequestWindow,
        cancel: &CancellationToken,
    ) -> Result<Normalized, IngestError> {
        debug!(
            url = %self.endpoint.redacted_url_for(window),
            "requesting day-ahead prices"
        );
        let raw = self
            .fetcher
            .fetch(&self.endpoint.url_for(window), cancel)
            .await?;
        interpret(&raw)
    }
}

/// Classify `raw` and normalize it when it is a data document.
///
/// Acknowledgement documents become [`IngestError::UpstreamReported`] without
/// being normalized.
pub fn interpret(raw: &RawDocument) -> Result<Normalized, IngestError> {
    let document = match classify(raw)? {
        Decoded::Data(document) => document,
        Decoded::Error(document) => {
            info!(
                code = %document.reason.code,
                text = %document.reason.text,
                "upstream rejected the request"
            );
            return Err(document.into_error());
        }
    };

    let normalized = normalize(&document)?;
    info!(
        points = normalized.len(),
        series = document.series.len(),
        fallbacks = normalized.fallbacks.len(),
        "normalized price document"
    );
    Ok(normalized)
}
