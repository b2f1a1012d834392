use std::str::FromStr;

use time::Duration;

use crate::ValidationError;

/// Spacing between consecutive points of a period, e.g. `PT60M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution(Duration);

impl Resolution {
    /// Fallback used when a period carries an unusable code.
    pub const DEFAULT_DURATION: Duration = Duration::HOUR;

    pub const fn duration(self) -> Duration {
        self.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(Self::DEFAULT_DURATION)
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_resolution(value).map(Self)
    }
}

/// Parse a single-unit ISO-8601 time duration (`PT<digits><H|M|S>`).
///
/// Composite codes such as `PT1H30M` are rejected.
pub fn parse_resolution(code: &str) -> Result<Duration, ValidationError> {
    let invalid = |reason: &'static str| ValidationError::InvalidResolution {
        value: code.to_owned(),
        reason,
    };

    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty resolution"));
    }

    let rest = trimmed
        .strip_prefix("PT")
        .ok_or_else(|| invalid("expected PT prefix"))?;

    let unit = rest
        .chars()
        .last()
        .ok_or_else(|| invalid("missing magnitude and unit"))?;
    let seconds_per_unit: i64 = match unit {
        'H' => 3_600,
        'M' => 60,
        'S' => 1,
        _ => return Err(invalid("unsupported unit, expected H, M or S")),
    };

    let magnitude = &rest[..rest.len() - unit.len_utf8()];
    if magnitude.is_empty() || !magnitude.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid("magnitude must be a non-negative integer"));
    }

    let seconds = magnitude
        .parse::<i64>()
        .ok()
        .and_then(|value| value.checked_mul(seconds_per_unit))
        .ok_or_else(|| invalid("magnitude out of range"))?;

    Ok(Duration::seconds(seconds))
}
