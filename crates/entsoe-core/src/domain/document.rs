use serde::Serialize;

use crate::{IngestError, UtcDateTime};

/// Identifier qualified by its coding scheme, e.g. `codingScheme="A01"` + `10YFI-1--------U`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainId {
    pub coding_scheme: String,
    pub value: String,
}

/// Sender or receiver of a market document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketParticipant {
    pub id: DomainId,
    pub role: String,
}

/// Raw `start`/`end` pair as published by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

/// One positional observation before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawPoint {
    /// 1-based index within the period, passed through as published.
    pub position: i64,
    /// Price in the source unit, ten times the normalized value.
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Period {
    pub interval: TimeInterval,
    pub resolution: String,
    pub points: Vec<RawPoint>,
}

/// One price curve for a domain pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub id: String,
    pub business_type: String,
    pub in_domain: DomainId,
    pub out_domain: DomainId,
    pub currency_unit: String,
    pub price_measure_unit: String,
    pub curve_type: String,
    pub periods: Vec<Period>,
}

impl Series {
    pub fn point_count(&self) -> usize {
        self.periods.iter().map(|period| period.points.len()).sum()
    }
}

/// Successful publication document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataDocument {
    pub id: String,
    pub revision: u32,
    pub document_type: String,
    pub sender: MarketParticipant,
    pub receiver: MarketParticipant,
    pub created_at: Option<UtcDateTime>,
    pub interval: TimeInterval,
    pub series: Vec<Series>,
}

impl DataDocument {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(Series::point_count).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reason {
    pub code: String,
    pub text: String,
}

/// Acknowledgement document returned when a request is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
    pub id: String,
    pub created_at: Option<UtcDateTime>,
    pub sender: MarketParticipant,
    pub receiver: MarketParticipant,
    pub received_created_at: Option<UtcDateTime>,
    pub reason: Reason,
}

impl ErrorDocument {
    pub fn into_error(self) -> IngestError {
        IngestError::UpstreamReported {
            code: self.reason.code,
            text: self.reason.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(points: usize) -> Period {
        Period {
            points: (1..=points as i64)
                .map(|position| RawPoint {
                    position,
                    amount: 10.0,
                })
                .collect(),
            ..Period::default()
        }
    }

    #[test]
    fn point_count_sums_every_period_of_every_series() {
        let document = DataDocument {
            series: vec![
                Series {
                    periods: vec![period(24)],
                    ..Series::default()
                },
                Series {
                    periods: vec![period(2), period(3)],
                    ..Series::default()
                },
            ],
            ..DataDocument::default()
        };

        assert_eq!(document.point_count(), 29);
    }

    #[test]
    fn error_document_becomes_upstream_error() {
        let document = ErrorDocument {
            reason: Reason {
                code: String::from("999"),
                text: String::from("No matching data found"),
            },
            ..ErrorDocument::default()
        };

        assert_eq!(
            document.into_error(),
            IngestError::UpstreamReported {
                code: String::from("999"),
                text: String::from("No matching data found"),
            }
        );
    }
}
