//! Request construction for the day-ahead price query (document type A44).

use std::fmt::{Debug, Formatter};

use time::{Date, Duration};

use crate::{UtcDateTime, ValidationError};

pub const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Day-ahead prices document type.
pub const DAY_AHEAD_PRICES: &str = "A44";

/// Half-open query window, both bounds in the API's `YYYYMMDDhhmm` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestWindow {
    start: String,
    end: String,
}

impl RequestWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ValidationError> {
        let start = start.into();
        let end = end.into();
        let start_at = UtcDateTime::parse_window_bound(&start)?;
        let end_at = UtcDateTime::parse_window_bound(&end)?;
        if start_at >= end_at {
            return Err(ValidationError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Midnight of `date` to midnight of the following day, UTC.
    pub fn for_day(date: Date) -> Self {
        let start = UtcDateTime::start_of_day(date);
        let end = start
            .checked_add(Duration::DAY)
            .unwrap_or(start);
        Self {
            start: start.format_window_bound(),
            end: end.format_window_bound(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Endpoint, credentials and bidding zones for price queries.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base_url: String,
    security_token: String,
    in_domain: String,
    out_domain: String,
}

impl ApiEndpoint {
    pub fn new(
        security_token: impl Into<String>,
        in_domain: impl Into<String>,
        out_domain: impl Into<String>,
    ) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            security_token: security_token.into(),
            in_domain: in_domain.into(),
            out_domain: out_domain.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url_for(&self, window: &RequestWindow) -> String {
        self.build_url(&self.security_token, window)
    }

    /// Same as [`url_for`](Self::url_for) with the token masked, for logs.
    pub fn redacted_url_for(&self, window: &RequestWindow) -> String {
        self.build_url("***", window)
    }

    fn build_url(&self, token: &str, window: &RequestWindow) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}securityToken={}&documentType={DAY_AHEAD_PRICES}&in_Domain={}&out_Domain={}&periodStart={}&periodEnd={}",
            self.base_url,
            urlencoding::encode(token),
            urlencoding::encode(&self.in_domain),
            urlencoding::encode(&self.out_domain),
            window.start(),
            window.end(),
        )
    }
}

impl Debug for ApiEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpoint")
            .field("base_url", &self.base_url)
            .field("security_token", &"***")
            .field("in_domain", &self.in_domain)
            .field("out_domain", &self.out_domain)
            .finish()
    }
}
