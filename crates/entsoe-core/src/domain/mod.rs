//! # Domain Models
//!
//! Types shared by the decoder, the normalizer and downstream stores.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DataDocument`] | Decoded publication document with its [`Series`] |
//! | [`ErrorDocument`] | Decoded acknowledgement carrying a rejection [`Reason`] |
//! | [`PricePoint`] | Normalized, store-ready price observation |
//! | [`Resolution`] | Point spacing parsed from codes like `PT15M` |
//! | [`UtcDateTime`] | UTC timestamp with the API's compact layouts |
//!
//! Raw documents keep the published strings (period bounds, resolution codes)
//! untouched; interpretation happens in [`crate::normalize`].

mod document;
mod price;
mod resolution;
mod timestamp;

pub use document::{
    DataDocument, DomainId, ErrorDocument, MarketParticipant, Period, RawPoint, Reason, Series,
    TimeInterval,
};
pub use price::{PricePoint, PRICE_SCALE};
pub use resolution::{parse_resolution, Resolution};
pub use timestamp::UtcDateTime;
