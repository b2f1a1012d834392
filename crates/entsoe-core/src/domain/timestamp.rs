use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ValidationError;

/// Minute-precision layout used by period intervals, e.g. `2023-01-01T00:00Z`.
const PERIOD_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]Z");

/// Layout of API window bounds, e.g. `202301010000`.
const WINDOW_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day][hour][minute]");

/// Timestamp guaranteed to be UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    /// Parse an RFC3339 timestamp such as a document's `createdDateTime`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = OffsetDateTime::parse(input.trim(), &Rfc3339).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        Self::from_offset_datetime(parsed).map_err(|_| ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        })
    }

    /// Parse a period boundary in the fixed `YYYY-MM-DDThh:mmZ` layout.
    pub fn parse_period(input: &str) -> Result<Self, ValidationError> {
        PrimitiveDateTime::parse(input.trim(), PERIOD_FORMAT)
            .map(|value| Self(value.assume_utc()))
            .map_err(|_| ValidationError::InvalidPeriodTimestamp {
                value: input.to_owned(),
            })
    }

    /// Parse an API window bound in the `YYYYMMDDhhmm` layout.
    pub fn parse_window_bound(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidWindowBound {
            value: input.to_owned(),
        };
        if input.len() != 12 || !input.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        PrimitiveDateTime::parse(input, WINDOW_FORMAT)
            .map(|value| Self(value.assume_utc()))
            .map_err(|_| invalid())
    }

    /// Midnight UTC at the start of `date`.
    pub fn start_of_day(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Result<Self, ValidationError> {
        if value.offset() != UtcOffset::UTC {
            return Err(ValidationError::TimestampNotUtc {
                value: value
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| String::from("<unformattable>")),
            });
        }

        Ok(Self(value))
    }

    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration).map(Self)
    }

    /// Whole seconds since the epoch, scaled to milliseconds.
    pub fn unix_millis(self) -> i64 {
        self.0.unix_timestamp() * 1000
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn format_period(self) -> String {
        self.0
            .format(PERIOD_FORMAT)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn format_window_bound(self) -> String {
        self.0
            .format(WINDOW_FORMAT)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}
