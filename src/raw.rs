//! Serde models for the Sky Scrapper API payloads
//!
//! The upstream itinerary schema is unstable: the same field shows up as a
//! number in one response and a string in the next, and optional blocks
//! come and go. Everything here is deliberately loose so that a single odd
//! itinerary cannot take down a whole search response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A loosely typed scalar. Never fails to deserialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Scalar {
    /// Text form of the scalar, `None` when empty or not a string/number.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Number(n) if n.is_finite() => {
                if n.fract() == 0.0 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Scalar::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Finite numeric value of the scalar. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Integer value, truncating any fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Text(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| self.as_f64().map(|v| v.trunc() as i64)),
            _ => self.as_f64().map(|v| v.trunc() as i64),
        }
    }
}

/// One itinerary from `data.itineraries`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItinerary {
    pub id: Option<Scalar>,
    /// Kept raw: only the first leg is ever read.
    pub legs: Option<Vec<Value>>,
    pub price: Option<RawPrice>,
}

impl RawItinerary {
    /// The first leg, `None` when there is none or it is not an object.
    pub fn first_leg(&self) -> Option<RawLeg> {
        self.legs
            .as_ref()
            .and_then(|legs| legs.first())
            .and_then(|leg| RawLeg::deserialize(leg).ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLeg {
    pub id: Option<Scalar>,
    pub departure: Option<Scalar>,
    pub departure_time: Option<Scalar>,
    pub departure_date_time: Option<Scalar>,
    pub arrival: Option<Scalar>,
    pub arrival_time: Option<Scalar>,
    pub arrival_date_time: Option<Scalar>,
    pub duration_in_minutes: Option<Scalar>,
    pub flight_number: Option<Scalar>,
    #[serde(deserialize_with = "lenient")]
    pub carriers: Option<RawCarriers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCarriers {
    #[serde(deserialize_with = "lenient_list")]
    pub marketing: Option<Vec<RawCarrier>>,
    #[serde(deserialize_with = "lenient_list")]
    pub operating: Option<Vec<RawCarrier>>,
}

impl RawCarriers {
    /// Marketing carrier first, operating carrier as fallback.
    pub fn primary(&self) -> Option<&RawCarrier> {
        self.marketing
            .as_ref()
            .and_then(|c| c.first())
            .or_else(|| self.operating.as_ref().and_then(|c| c.first()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCarrier {
    pub id: Option<Scalar>,
    pub name: Option<Scalar>,
    pub alternate_id: Option<Scalar>,
    pub code: Option<Scalar>,
    pub flight_number: Option<Scalar>,
}

/// `T` when the value has its shape, `None` otherwise.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Array entries that have the shape of `T`; the rest are skipped.
/// `None` when the value is not an array.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(None),
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
    ))
}

/// Price as the upstream sends it: a bare number, a bare string, or an
/// object carrying the amount under one of several keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Amount(f64),
    Text(String),
    Structured(PriceFields),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PriceFields {
    pub raw: Option<Scalar>,
    pub amount: Option<Scalar>,
    pub value: Option<Scalar>,
    pub formatted: Option<Scalar>,
    pub currency: Option<Scalar>,
}

/// `message` of an error envelope: plain text or a list of items
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    List(Vec<Value>),
    Other(Value),
}

impl ErrorMessage {
    /// Flatten into one human readable line.
    ///
    /// Object items render as `key: value` using their first key, string
    /// items as-is. Items are joined with `". "`.
    pub fn flatten(&self) -> String {
        match self {
            ErrorMessage::Text(text) => text.clone(),
            ErrorMessage::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map.iter().next().map(|(key, value)| {
                        let value = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        format!("{}: {}", key, value)
                    }),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(". "),
            ErrorMessage::Other(Value::Null) => String::new(),
            ErrorMessage::Other(other) => other.to_string(),
        }
    }
}

/// Envelope of `searchFlights`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightSearchEnvelope {
    pub status: Option<bool>,
    pub message: Option<ErrorMessage>,
    pub data: Option<FlightSearchData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightSearchData {
    /// Kept as raw JSON so each itinerary deserializes on its own.
    pub itineraries: Option<Vec<Value>>,
}

/// Body of a non-2xx response, when the upstream bothers to send one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub message: Option<ErrorMessage>,
}
