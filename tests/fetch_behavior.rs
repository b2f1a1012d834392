//! Behavior-driven tests for the retrying fetcher.
//!
//! These tests run on a paused tokio clock, so backoff sleeps complete
//! instantly while still being measurable through `Instant::elapsed`.

use std::sync::Arc;
use std::time::Duration;

use entsoe_core::{
    ContentKind, FetchCause, Fetcher, HttpError, IngestError, RetryConfig, ScriptedHttpClient,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const URL: &str = "https://example.test/api?documentType=A44";

fn fetcher(client: &Arc<ScriptedHttpClient>, config: RetryConfig) -> Fetcher {
    Fetcher::new(client.clone(), config)
}

fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// =============================================================================
// Fetcher: Retry Behavior
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_first_two_attempts_fail_third_attempt_body_is_returned() {
    // Given: A transport that drops the connection twice before answering
    let client = Arc::new(
        ScriptedHttpClient::new()
            .fail(HttpError::new("connection refused"))
            .fail(HttpError::new("connection reset"))
            .respond(200, "<Publication_MarketDocument/>"),
    );
    let fetcher = fetcher(&client, RetryConfig::default());
    let started = Instant::now();

    // When: The document is fetched with the default three attempts
    let raw = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect("third attempt succeeds");

    // Then: The third body comes back after exactly two linear backoff sleeps (2s + 4s)
    assert_eq!(raw.as_bytes(), b"<Publication_MarketDocument/>");
    assert_eq!(raw.kind(), ContentKind::XmlLike);
    assert_eq!(client.request_count(), 3);
    assert_elapsed(started, Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn when_client_error_status_is_returned_system_fails_without_retrying() {
    // Given: A transport answering 401 Unauthorized
    let client = Arc::new(ScriptedHttpClient::new().respond(401, "unauthorized"));
    let fetcher = fetcher(&client, RetryConfig::default());
    let started = Instant::now();

    // When: The document is fetched
    let err = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect_err("must fail");

    // Then: It fails on the first attempt carrying the status, no sleep taken
    assert_eq!(
        err,
        IngestError::FetchFailed {
            attempts: 1,
            cause: FetchCause::Status(401),
        }
    );
    assert_eq!(client.request_count(), 1);
    assert_elapsed(started, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn when_server_keeps_failing_system_gives_up_after_max_attempts() {
    // Given: A transport answering 503 on every attempt
    let client = Arc::new(
        ScriptedHttpClient::new()
            .respond(503, "")
            .respond(502, "")
            .respond(503, "")
            .respond(200, "<never/>"),
    );
    let fetcher = fetcher(&client, RetryConfig::default());

    // When: The document is fetched
    let err = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect_err("must fail");

    // Then: The last server status is reported with the attempt count
    assert_eq!(
        err,
        IngestError::FetchFailed {
            attempts: 3,
            cause: FetchCause::ServerStatus(503),
        }
    );
    assert_eq!(client.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn when_single_attempt_is_configured_no_backoff_happens() {
    // Given: Retries disabled
    let client = Arc::new(ScriptedHttpClient::new().respond(500, "").respond(200, "<a/>"));
    let fetcher = fetcher(&client, RetryConfig::no_retry());
    let started = Instant::now();

    // When: The first attempt hits a server error
    let err = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect_err("must fail");

    // Then: That attempt is final
    assert!(matches!(
        err,
        IngestError::FetchFailed {
            attempts: 1,
            cause: FetchCause::ServerStatus(500)
        }
    ));
    assert_elapsed(started, Duration::ZERO);
}

// =============================================================================
// Fetcher: Timeouts and Cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_an_attempt_hangs_it_times_out_and_is_retried() {
    // Given: A transport that never answers the first request
    let client = Arc::new(ScriptedHttpClient::new().hang().respond(200, "<a/>"));
    let config = RetryConfig::default().with_request_timeout(Duration::from_secs(5));
    let fetcher = fetcher(&client, config);
    let started = Instant::now();

    // When: The document is fetched
    let raw = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect("second attempt succeeds");

    // Then: The timeout counts as a transport failure and the retry succeeds
    assert_eq!(raw.as_bytes(), b"<a/>");
    assert_eq!(client.request_count(), 2);
    assert_elapsed(started, Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn when_overall_deadline_passes_fetch_fails_immediately() {
    // Given: A hanging transport and a deadline shorter than one attempt
    let client = Arc::new(ScriptedHttpClient::new().hang());
    let config = RetryConfig::default().with_deadline(Some(Duration::from_secs(10)));
    let fetcher = fetcher(&client, config);

    // When: The document is fetched
    let err = fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect_err("must fail");

    // Then: The deadline is reported as the cause
    assert_eq!(
        err,
        IngestError::FetchFailed {
            attempts: 1,
            cause: FetchCause::DeadlineExceeded(Duration::from_secs(10)),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn when_cancelled_during_backoff_no_further_attempt_is_made() {
    // Given: A transport failing once, and a cancellation one second in
    let client = Arc::new(
        ScriptedHttpClient::new()
            .fail(HttpError::new("connection reset"))
            .respond(200, "<a/>"),
    );
    let fetcher = fetcher(&client, RetryConfig::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    // When: The document is fetched
    let err = fetcher.fetch(URL, &cancel).await.expect_err("must fail");

    // Then: The backoff sleep is abandoned and the second attempt never happens
    assert_eq!(
        err,
        IngestError::FetchFailed {
            attempts: 1,
            cause: FetchCause::Cancelled,
        }
    );
    assert_eq!(client.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn when_cancelled_mid_request_the_attempt_is_aborted() {
    // Given: A transport that never answers
    let client = Arc::new(ScriptedHttpClient::new().hang());
    let fetcher = fetcher(&client, RetryConfig::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        trigger.cancel();
    });
    let started = Instant::now();

    // When: The document is fetched
    let err = fetcher.fetch(URL, &cancel).await.expect_err("must fail");

    // Then: The fetch ends when the token fires, not when the request would time out
    assert!(matches!(
        err,
        IngestError::FetchFailed {
            cause: FetchCause::Cancelled,
            ..
        }
    ));
    assert_elapsed(started, Duration::from_secs(3));
}

#[tokio::test]
async fn requests_ask_for_xml_within_the_configured_timeout() {
    // Given: A transport answering immediately
    let client = Arc::new(ScriptedHttpClient::new().respond(200, "<a/>"));
    let config = RetryConfig::default().with_request_timeout(Duration::from_secs(12));
    let fetcher = fetcher(&client, config);

    // When: The document is fetched
    fetcher
        .fetch(URL, &CancellationToken::new())
        .await
        .expect("must succeed");

    // Then: The request carries the URL, accept header and timeout
    let request = &client.requests()[0];
    assert_eq!(request.url, URL);
    assert_eq!(
        request.headers.get("accept").map(String::as_str),
        Some("application/xml")
    );
    assert_eq!(request.timeout, Duration::from_secs(12));
}
