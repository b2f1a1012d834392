//! Response classification and decoding.
//!
//! The API answers a price query with one of two disjoint XML shapes: a
//! `Publication_MarketDocument` carrying the data, or an
//! `Acknowledgement_MarketDocument` explaining why there is none. Nothing in
//! the HTTP response says which, so [`classify`] tries the data shape first and
//! falls back to the acknowledgement shape.

use std::fmt::{Display, Formatter};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    DataDocument, DomainId, ErrorDocument, MarketParticipant, Period, RawPoint, Reason, Series,
    TimeInterval,
};
use crate::{IngestError, UtcDateTime, ValidationError};

/// Maximum number of characters of a body quoted in diagnostics.
pub const PREVIEW_CHARS: usize = 200;

const PUBLICATION_ROOT: &str = "Publication_MarketDocument";
const ACKNOWLEDGEMENT_ROOT: &str = "Acknowledgement_MarketDocument";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    XmlLike,
    NotXmlLike,
}

/// Complete response body as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Vec<u8>,
    kind: ContentKind,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let kind = if content_of(&bytes).starts_with(b"<") {
            ContentKind::XmlLike
        } else {
            ContentKind::NotXmlLike
        };
        Self { bytes, kind }
    }

    pub const fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// First [`PREVIEW_CHARS`] characters of the trimmed body.
    pub fn preview(&self) -> String {
        String::from_utf8_lossy(content_of(&self.bytes))
            .chars()
            .take(PREVIEW_CHARS)
            .collect()
    }

    fn unrecognized(&self) -> IngestError {
        IngestError::UnrecognizedResponse {
            preview: self.preview(),
        }
    }
}

fn content_of(bytes: &[u8]) -> &[u8] {
    let trimmed = bytes.trim_ascii();
    trimmed.strip_prefix(UTF8_BOM).unwrap_or(trimmed).trim_ascii()
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Data(DataDocument),
    Error(ErrorDocument),
}

/// Decide which document shape `raw` holds and decode it.
///
/// Bodies that do not even look like XML (HTML error pages, empty bodies) are
/// rejected without attempting a structural decode.
pub fn classify(raw: &RawDocument) -> Result<Decoded, IngestError> {
    if raw.kind() == ContentKind::NotXmlLike {
        debug!(bytes = raw.len(), "response is not XML-like");
        return Err(raw.unrecognized());
    }

    let text = std::str::from_utf8(content_of(raw.as_bytes())).map_err(|_| raw.unrecognized())?;

    let data_failure = match decode_data(text) {
        Ok(document) => return Ok(Decoded::Data(document)),
        Err(failure) => failure,
    };

    match decode_error(text) {
        Ok(document) => Ok(Decoded::Error(document)),
        Err(error_failure) => {
            debug!(
                data = %data_failure,
                acknowledgement = %error_failure,
                "response matched neither document shape"
            );
            Err(raw.unrecognized())
        }
    }
}

/// Decode a publication document; the root element must match.
pub fn decode_data(text: &str) -> Result<DataDocument, DecodeFailure> {
    expect_root(text, PUBLICATION_ROOT)?;
    let wire: WirePublication =
        quick_xml::de::from_str(text).map_err(|error| DecodeFailure::Malformed(error.to_string()))?;
    wire.into_domain().map_err(DecodeFailure::from)
}

/// Decode an acknowledgement document; the root element must match.
pub fn decode_error(text: &str) -> Result<ErrorDocument, DecodeFailure> {
    expect_root(text, ACKNOWLEDGEMENT_ROOT)?;
    let wire: WireAcknowledgement =
        quick_xml::de::from_str(text).map_err(|error| DecodeFailure::Malformed(error.to_string()))?;
    wire.into_domain()
}

/// Why one decode attempt did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    RootMismatch {
        expected: &'static str,
        found: Option<String>,
    },
    Malformed(String),
}

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootMismatch {
                expected,
                found: Some(found),
            } => write!(f, "expected root <{expected}>, found <{found}>"),
            Self::RootMismatch {
                expected,
                found: None,
            } => write!(f, "expected root <{expected}>, found no element"),
            Self::Malformed(message) => write!(f, "malformed document: {message}"),
        }
    }
}

impl std::error::Error for DecodeFailure {}

impl From<ValidationError> for DecodeFailure {
    fn from(error: ValidationError) -> Self {
        Self::Malformed(error.to_string())
    }
}

fn expect_root(text: &str, expected: &'static str) -> Result<(), DecodeFailure> {
    let found = root_element(text);
    if found.as_deref() == Some(expected) {
        Ok(())
    } else {
        Err(DecodeFailure::RootMismatch { expected, found })
    }
}

/// Local name of the first element, ignoring any namespace prefix.
fn root_element(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                return Some(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

fn parse_created(value: Option<String>) -> Result<Option<UtcDateTime>, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(UtcDateTime::parse)
        .transpose()
}

// Wire shapes. Everything except point fields and the acknowledgement reason
// is optional, mirroring how tolerant the upstream documents need us to be.
// Repeated elements may be interleaved with others (quick-xml `overlapped-lists`).

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireDomainId {
    #[serde(rename = "@codingScheme")]
    coding_scheme: String,
    #[serde(rename = "$text")]
    value: String,
}

impl From<WireDomainId> for DomainId {
    fn from(wire: WireDomainId) -> Self {
        Self {
            coding_scheme: wire.coding_scheme.trim().to_owned(),
            value: wire.value.trim().to_owned(),
        }
    }
}

fn participant(id: WireDomainId, role: String) -> MarketParticipant {
    MarketParticipant {
        id: id.into(),
        role: role.trim().to_owned(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireInterval {
    start: String,
    end: String,
}

impl From<WireInterval> for TimeInterval {
    fn from(wire: WireInterval) -> Self {
        Self {
            start: wire.start.trim().to_owned(),
            end: wire.end.trim().to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    position: i64,
    #[serde(rename = "price.amount")]
    amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePeriod {
    #[serde(rename = "timeInterval")]
    interval: WireInterval,
    resolution: String,
    #[serde(rename = "Point")]
    points: Vec<WirePoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireTimeSeries {
    #[serde(rename = "mRID")]
    mrid: String,
    #[serde(rename = "businessType")]
    business_type: String,
    #[serde(rename = "in_Domain.mRID")]
    in_domain: WireDomainId,
    #[serde(rename = "out_Domain.mRID")]
    out_domain: WireDomainId,
    #[serde(rename = "currency_Unit.name")]
    currency_unit: String,
    #[serde(rename = "price_Measure_Unit.name")]
    price_measure_unit: String,
    #[serde(rename = "curveType")]
    curve_type: String,
    #[serde(rename = "Period")]
    periods: Vec<WirePeriod>,
}

impl From<WireTimeSeries> for Series {
    fn from(wire: WireTimeSeries) -> Self {
        Self {
            id: wire.mrid.trim().to_owned(),
            business_type: wire.business_type.trim().to_owned(),
            in_domain: wire.in_domain.into(),
            out_domain: wire.out_domain.into(),
            currency_unit: wire.currency_unit.trim().to_owned(),
            price_measure_unit: wire.price_measure_unit.trim().to_owned(),
            curve_type: wire.curve_type.trim().to_owned(),
            periods: wire
                .periods
                .into_iter()
                .map(|period| Period {
                    interval: period.interval.into(),
                    resolution: period.resolution.trim().to_owned(),
                    points: period
                        .points
                        .into_iter()
                        .map(|point| RawPoint {
                            position: point.position,
                            amount: point.amount,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePublication {
    #[serde(rename = "mRID")]
    mrid: String,
    #[serde(rename = "revisionNumber")]
    revision_number: u32,
    #[serde(rename = "type")]
    document_type: String,
    #[serde(rename = "sender_MarketParticipant.mRID")]
    sender_id: WireDomainId,
    #[serde(rename = "sender_MarketParticipant.marketRole.type")]
    sender_role: String,
    #[serde(rename = "receiver_MarketParticipant.mRID")]
    receiver_id: WireDomainId,
    #[serde(rename = "receiver_MarketParticipant.marketRole.type")]
    receiver_role: String,
    #[serde(rename = "createdDateTime")]
    created: Option<String>,
    #[serde(rename = "period.timeInterval")]
    interval: WireInterval,
    #[serde(rename = "TimeSeries")]
    time_series: Vec<WireTimeSeries>,
}

impl WirePublication {
    fn into_domain(self) -> Result<DataDocument, ValidationError> {
        Ok(DataDocument {
            id: self.mrid.trim().to_owned(),
            revision: self.revision_number,
            document_type: self.document_type.trim().to_owned(),
            sender: participant(self.sender_id, self.sender_role),
            receiver: participant(self.receiver_id, self.receiver_role),
            created_at: parse_created(self.created)?,
            interval: self.interval.into(),
            series: self.time_series.into_iter().map(Series::from).collect(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireReason {
    code: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireAcknowledgement {
    #[serde(rename = "mRID", default)]
    mrid: String,
    #[serde(rename = "createdDateTime", default)]
    created: Option<String>,
    #[serde(rename = "sender_MarketParticipant.mRID", default)]
    sender_id: WireDomainId,
    #[serde(rename = "sender_MarketParticipant.marketRole.type", default)]
    sender_role: String,
    #[serde(rename = "receiver_MarketParticipant.mRID", default)]
    receiver_id: WireDomainId,
    #[serde(rename = "receiver_MarketParticipant.marketRole.type", default)]
    receiver_role: String,
    #[serde(rename = "received_MarketDocument.createdDateTime", default)]
    received_created: Option<String>,
    #[serde(rename = "Reason", default)]
    reasons: Vec<WireReason>,
}

impl WireAcknowledgement {
    /// The first reason is the one reported; at least one is required.
    fn into_domain(self) -> Result<ErrorDocument, DecodeFailure> {
        let reason = self
            .reasons
            .into_iter()
            .next()
            .ok_or_else(|| DecodeFailure::Malformed(String::from("missing field `Reason`")))?;

        Ok(ErrorDocument {
            id: self.mrid.trim().to_owned(),
            created_at: parse_created(self.created)?,
            sender: participant(self.sender_id, self.sender_role),
            receiver: participant(self.receiver_id, self.receiver_role),
            received_created_at: parse_created(self.received_created)?,
            reason: Reason {
                code: reason.code.trim().to_owned(),
                text: reason.text.trim().to_owned(),
            },
        })
    }
}
