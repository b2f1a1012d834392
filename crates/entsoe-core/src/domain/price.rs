use serde::Serialize;

use crate::UtcDateTime;

/// Divisor between the published amount and the stored price.
pub const PRICE_SCALE: f64 = 10.0;

/// Normalized price observation, ready for the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: UtcDateTime,
    /// `timestamp` in the `YYYY-MM-DDThh:mmZ` layout.
    pub time: String,
    pub price: f64,
    /// Milliseconds since the epoch, truncated to whole seconds.
    pub store_timestamp: i64,
}

impl PricePoint {
    pub fn new(timestamp: UtcDateTime, amount: f64) -> Self {
        Self {
            timestamp,
            time: timestamp.format_period(),
            price: amount / PRICE_SCALE,
            store_timestamp: timestamp.unix_millis(),
        }
    }
}
