//! Bounded, cancellable retrieval of a response body.
//!
//! Each attempt ends in one of three states (see [`classify_attempt`]):
//!
//! | Attempt result | Not final | Final |
//! |----------------|-----------|-------|
//! | transport error | retry | fail |
//! | 5xx | retry | fail |
//! | other non-2xx | fail | fail |
//! | 2xx | success | success |
//!
//! Retries are paced by [`RetryConfig::backoff`]; the whole loop is bounded by
//! [`RetryConfig::deadline`] and aborts as soon as the cancellation token fires.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::document::RawDocument;
use crate::error::FetchCause;
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::retry::RetryConfig;
use crate::IngestError;

/// Terminal state of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(Vec<u8>),
    Retryable(FetchCause),
    Fatal(FetchCause),
}

/// Classify the result of attempt number `attempt` (1-based).
pub fn classify_attempt(
    result: Result<HttpResponse, HttpError>,
    attempt: u32,
    config: &RetryConfig,
) -> AttemptOutcome {
    let is_final = attempt >= config.attempts();
    let retry_or_fail = |cause| {
        if is_final {
            AttemptOutcome::Fatal(cause)
        } else {
            AttemptOutcome::Retryable(cause)
        }
    };

    match result {
        Ok(response) if response.is_success() => AttemptOutcome::Success(response.body),
        Ok(response) if config.should_retry_status(response.status) => {
            retry_or_fail(FetchCause::ServerStatus(response.status))
        }
        Ok(response) => AttemptOutcome::Fatal(FetchCause::Status(response.status)),
        Err(error) if !error.retryable() => {
            AttemptOutcome::Fatal(FetchCause::Transport(error.message().to_owned()))
        }
        Err(error) => retry_or_fail(FetchCause::Transport(error.message().to_owned())),
    }
}

/// Retrieves documents over an [`HttpClient`] with retries.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    config: RetryConfig,
}

impl Fetcher {
    pub fn new(client: Arc<dyn HttpClient>, config: RetryConfig) -> Self {
        Self { client, config }
    }

    /// Fetch `url`, returning the complete body of the first successful attempt.
    pub async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, IngestError> {
        let mut attempts = 0;
        let result = match self.config.deadline {
            Some(limit) => {
                tokio::time::timeout(limit, self.attempt_loop(url, cancel, &mut attempts))
                    .await
                    .unwrap_or(Err(FetchCause::DeadlineExceeded(limit)))
            }
            None => self.attempt_loop(url, cancel, &mut attempts).await,
        };

        match result {
            Ok(body) => Ok(RawDocument::new(body)),
            Err(cause) => {
                warn!(attempts, %cause, "fetch failed");
                Err(IngestError::FetchFailed { attempts, cause })
            }
        }
    }

    async fn attempt_loop(
        &self,
        url: &str,
        cancel: &CancellationToken,
        attempts: &mut u32,
    ) -> Result<Vec<u8>, FetchCause> {
        let request_timeout = self.config.request_timeout;

        loop {
            *attempts += 1;
            let attempt = *attempts;
            let request = HttpRequest::get(url)
                .with_header("accept", "application/xml")
                .with_timeout(request_timeout);

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchCause::Cancelled),
                result = tokio::time::timeout(request_timeout, self.client.execute(request)) => {
                    result.unwrap_or_else(|_| {
                        Err(HttpError::new(format!(
                            "request timed out after {:.1}s",
                            request_timeout.as_secs_f64()
                        )))
                    })
                }
            };

            match classify_attempt(result, attempt, &self.config) {
                AttemptOutcome::Success(body) => {
                    debug!(attempt, bytes = body.len(), "fetch succeeded");
                    return Ok(body);
                }
                AttemptOutcome::Fatal(cause) => return Err(cause),
                AttemptOutcome::Retryable(cause) => {
                    let delay = self.config.delay_for_attempt(attempt);
                    debug!(
                        attempt,
                        %cause,
                        delay_ms = delay.as_millis() as u64,
                        "fetch attempt failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(FetchCause::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
