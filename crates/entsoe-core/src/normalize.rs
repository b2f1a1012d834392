//! Expansion of positional points into absolute, unit-converted prices.

use serde::Serialize;
use time::Duration;
use tracing::warn;

use crate::domain::{DataDocument, PricePoint, Resolution};
use crate::{IngestError, UtcDateTime, ValidationError};

/// A period whose resolution code could not be used and fell back to one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFallback {
    pub series_index: usize,
    pub period_index: usize,
    pub code: String,
    pub reason: String,
}

/// Points of one document plus the non-fatal diagnostics raised on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub points: Vec<PricePoint>,
    pub fallbacks: Vec<ResolutionFallback>,
}

impl Normalized {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Turn every raw point of `document` into a [`PricePoint`].
///
/// Output follows document order (series, period, point) with duplicates kept.
/// An unparsable period start fails the whole document; an unusable resolution
/// only degrades its own period to [`Resolution::DEFAULT_DURATION`].
pub fn normalize(document: &DataDocument) -> Result<Normalized, IngestError> {
    let mut normalized = Normalized {
        points: Vec::with_capacity(document.point_count()),
        fallbacks: Vec::new(),
    };

    for (series_index, series) in document.series.iter().enumerate() {
        for (period_index, period) in series.periods.iter().enumerate() {
            let start = UtcDateTime::parse_period(&period.interval.start).map_err(|_| {
                IngestError::InvalidPeriodStart {
                    value: period.interval.start.clone(),
                }
            })?;

            let resolution = match period.resolution.parse::<Resolution>() {
                Ok(resolution) => resolution,
                Err(error) => {
                    warn!(
                        series = series_index,
                        period = period_index,
                        code = %period.resolution,
                        %error,
                        "unknown resolution, defaulting to 1h"
                    );
                    normalized.fallbacks.push(ResolutionFallback {
                        series_index,
                        period_index,
                        code: period.resolution.clone(),
                        reason: fallback_reason(&error),
                    });
                    Resolution::default()
                }
            };

            for point in &period.points {
                let timestamp = point_time(start, resolution.duration(), point.position)
                    .ok_or_else(|| IngestError::PointOutOfRange {
                        position: point.position,
                        start: period.interval.start.clone(),
                    })?;
                normalized.points.push(PricePoint::new(timestamp, point.amount));
            }
        }
    }

    Ok(normalized)
}

/// `start + (position - 1) * resolution`, or `None` when out of range.
pub fn point_time(start: UtcDateTime, resolution: Duration, position: i64) -> Option<UtcDateTime> {
    let steps = position.checked_sub(1)?;
    let offset = resolution.whole_seconds().checked_mul(steps)?;
    start.checked_add(Duration::seconds(offset))
}

fn fallback_reason(error: &ValidationError) -> String {
    match error {
        ValidationError::InvalidResolution { reason, .. } => (*reason).to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, RawPoint, Series, TimeInterval};
    use crate::ErrorKind;

    fn period(start: &str, resolution: &str, points: &[(i64, f64)]) -> Period {
        Period {
            interval: TimeInterval {
                start: start.to_owned(),
                end: String::new(),
            },
            resolution: resolution.to_owned(),
            points: points
                .iter()
                .map(|&(position, amount)| RawPoint { position, amount })
                .collect(),
        }
    }

    fn document(periods: Vec<Vec<Period>>) -> DataDocument {
        DataDocument {
            series: periods
                .into_iter()
                .map(|periods| Series {
                    periods,
                    ..Series::default()
                })
                .collect(),
            ..DataDocument::default()
        }
    }

    #[test]
    fn positions_offset_from_period_start() {
        let doc = document(vec![vec![period(
            "2023-01-01T00:00Z",
            "PT60M",
            &[(1, 500.0), (2, 420.0)],
        )]]);

        let normalized = normalize(&doc).expect("must normalize");

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.points[0].time, "2023-01-01T00:00Z");
        assert_eq!(normalized.points[0].price, 50.0);
        assert_eq!(normalized.points[0].store_timestamp, 1_672_531_200_000);
        assert_eq!(normalized.points[1].time, "2023-01-01T01:00Z");
        assert_eq!(normalized.points[1].price, 42.0);
        assert!(normalized.fallbacks.is_empty());
    }

    #[test]
    fn each_period_uses_its_own_resolution() {
        let doc = document(vec![
            vec![period("2023-01-01T00:00Z", "PT15M", &[(1, 10.0), (3, 30.0)])],
            vec![period("2023-01-01T00:00Z", "PT60M", &[(3, 30.0)])],
        ]);

        let times: Vec<String> = normalize(&doc)
            .expect("must normalize")
            .points
            .into_iter()
            .map(|point| point.time)
            .collect();

        assert_eq!(
            times,
            vec!["2023-01-01T00:00Z", "2023-01-01T00:30Z", "2023-01-01T02:00Z"]
        );
    }

    #[test]
    fn invalid_resolution_falls_back_to_one_hour() {
        let doc = document(vec![vec![period(
            "2023-01-01T00:00Z",
            "P1D",
            &[(1, 1.0), (2, 2.0)],
        )]]);

        let normalized = normalize(&doc).expect("must normalize");

        assert_eq!(normalized.points[1].time, "2023-01-01T01:00Z");
        assert_eq!(normalized.fallbacks.len(), 1);
        assert_eq!(normalized.fallbacks[0].code, "P1D");
        assert_eq!(normalized.fallbacks[0].series_index, 0);
        assert_eq!(normalized.fallbacks[0].reason, "expected PT prefix");
    }

    #[test]
    fn invalid_start_fails_without_partial_output() {
        let doc = document(vec![
            vec![period("2023-01-01T00:00Z", "PT60M", &[(1, 1.0)])],
            vec![period("2023-01-01 00:00", "PT60M", &[(1, 1.0)])],
        ]);

        let err = normalize(&doc).expect_err("must fail");
        assert_eq!(
            err,
            IngestError::InvalidPeriodStart {
                value: String::from("2023-01-01 00:00"),
            }
        );
    }

    #[test]
    fn duplicate_positions_pass_through_in_order() {
        let doc = document(vec![vec![period(
            "2023-01-01T00:00Z",
            "PT60M",
            &[(2, 20.0), (1, 10.0), (2, 25.0)],
        )]]);

        let points = normalize(&doc).expect("must normalize").points;
        let prices: Vec<f64> = points.iter().map(|point| point.price).collect();

        assert_eq!(prices, vec![2.0, 1.0, 2.5]);
        assert_eq!(points[0].store_timestamp, points[2].store_timestamp);
    }

    #[test]
    fn count_matches_raw_points() {
        let doc = document(vec![
            vec![period("2023-01-01T00:00Z", "PT60M", &[(1, 1.0), (2, 1.0)])],
            vec![
                period("2023-01-01T00:00Z", "PT15M", &[(1, 1.0)]),
                period("2023-01-02T00:00Z", "PT15M", &[(1, 1.0), (2, 1.0)]),
            ],
        ]);

        assert_eq!(normalize(&doc).expect("must normalize").len(), doc.point_count());
    }

    #[test]
    fn empty_document_yields_nothing() {
        let normalized = normalize(&DataDocument::default()).expect("must normalize");
        assert!(normalized.is_empty());
    }

    #[test]
    fn position_zero_steps_back_one_interval() {
        let start = UtcDateTime::parse_period("2023-01-01T01:00Z").expect("timestamp");
        let time = point_time(start, Duration::HOUR, 0).expect("in range");
        assert_eq!(time.format_period(), "2023-01-01T00:00Z");
    }

    #[test]
    fn signed_positions_offset_from_start() {
        let doc = document(vec![vec![period(
            "2023-01-01T02:00Z",
            "PT60M",
            &[(-1, 10.0), (3, 30.0)],
        )]]);

        let times: Vec<String> = normalize(&doc)
            .expect("must normalize")
            .points
            .into_iter()
            .map(|point| point.time)
            .collect();

        assert_eq!(times, vec!["2023-01-01T00:00Z", "2023-01-01T04:00Z"]);
    }

    #[test]
    fn unreachable_position_is_not_blamed_on_the_start() {
        for position in [i64::from(u32::MAX), i64::MAX, i64::MIN] {
            let doc = document(vec![vec![period(
                "2023-01-01T00:00Z",
                "PT60M",
                &[(1, 1.0), (position, 2.0)],
            )]]);

            let err = normalize(&doc).expect_err("must fail");
            assert_eq!(
                err,
                IngestError::PointOutOfRange {
                    position,
                    start: String::from("2023-01-01T00:00Z"),
                }
            );
            assert_eq!(err.kind(), ErrorKind::PointOutOfRange);
        }
    }
}
