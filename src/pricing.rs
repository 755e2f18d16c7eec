//! Passenger-aware price computation
//!
//! Children pay 75% of the adult fare and lap infants 10%. The policy is
//! fixed and not configurable.

use crate::raw::{PriceFields, RawPrice, Scalar};
use crate::{FlightError, PassengerCounts};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const CHILD_FARE_RATIO: f64 = 0.75;
pub const INFANT_FARE_RATIO: f64 = 0.10;

/// Per-adult fare extracted from an upstream price
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFare {
    pub amount: f64,
    pub currency: String,
}

/// Total price for the whole party, rounded to cents
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub currency: String,
    pub total: f64,
}

type AmountExtractor = (&'static str, fn(&PriceFields) -> Option<f64>);

// Priority order for structured prices. The first extractor yielding a
// usable amount wins.
const STRUCTURED_EXTRACTORS: &[AmountExtractor] = &[
    ("raw", from_raw),
    ("amount", from_amount),
    ("value", from_value),
    ("formatted", from_formatted),
];

fn from_raw(fields: &PriceFields) -> Option<f64> {
    fields.raw.as_ref().and_then(amount_from_scalar)
}

fn from_amount(fields: &PriceFields) -> Option<f64> {
    fields.amount.as_ref().and_then(amount_from_scalar)
}

fn from_value(fields: &PriceFields) -> Option<f64> {
    fields.value.as_ref().and_then(amount_from_scalar)
}

fn from_formatted(fields: &PriceFields) -> Option<f64> {
    fields
        .formatted
        .as_ref()
        .and_then(Scalar::as_text)
        .and_then(|text| scrape_amount(&text))
}

fn non_numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^0-9.]").expect("non-numeric pattern is valid"))
}

/// Strip every character that is not a digit or a dot, then parse.
///
/// `"$1,234.50"` yields `1234.5`; `"1.2.3"` and `"free"` yield `None`.
pub fn scrape_amount(text: &str) -> Option<f64> {
    let cleaned = non_numeric_pattern().replace_all(text, "");
    cleaned.parse::<f64>().ok().filter(|v| valid_amount(*v))
}

fn amount_from_scalar(scalar: &Scalar) -> Option<f64> {
    scalar.as_f64().filter(|v| valid_amount(*v))
}

fn valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Resolve the per-adult fare, or `None` when no usable amount exists.
pub fn base_fare(raw: Option<&RawPrice>) -> Option<BaseFare> {
    let fare = match raw? {
        RawPrice::Amount(amount) => BaseFare {
            amount: Some(*amount).filter(|v| valid_amount(*v))?,
            currency: DEFAULT_CURRENCY.to_string(),
        },
        RawPrice::Text(text) => BaseFare {
            amount: text.trim().parse::<f64>().ok().filter(|v| valid_amount(*v))?,
            currency: DEFAULT_CURRENCY.to_string(),
        },
        RawPrice::Structured(fields) => {
            let (source, amount) = STRUCTURED_EXTRACTORS
                .iter()
                .find_map(|(name, extract)| extract(fields).map(|amount| (*name, amount)))?;
            debug!(source, amount, "Resolved base fare");
            BaseFare {
                amount,
                currency: fields
                    .currency
                    .as_ref()
                    .and_then(Scalar::as_text)
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            }
        }
        RawPrice::Other(_) => return None,
    };
    Some(fare)
}

/// Total for adults at full fare, children at 75% and infants at 10%.
pub fn total_for(base: f64, passengers: &PassengerCounts) -> f64 {
    let total = base * f64::from(passengers.adults)
        + base * CHILD_FARE_RATIO * f64::from(passengers.children)
        + base * INFANT_FARE_RATIO * f64::from(passengers.infants);
    round_cents(total)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price the whole party. `None` renders as `"N/A"`.
pub fn compute_price(raw: Option<&RawPrice>, passengers: &PassengerCounts) -> Option<PriceQuote> {
    let fare = base_fare(raw)?;
    let total = total_for(fare.amount, passengers);
    Some(PriceQuote {
        currency: fare.currency,
        total,
    })
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.total)
    }
}

impl FromStr for PriceQuote {
    type Err = FlightError;

    /// Parse the `"<CUR> <amount>"` display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (currency, amount) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| FlightError::ParseError(format!("Invalid price: {}", s)))?;
        let total = scrape_amount(amount)
            .ok_or_else(|| FlightError::ParseError(format!("Invalid price amount: {}", s)))?;
        Ok(PriceQuote {
            currency: currency.to_string(),
            total,
        })
    }
}

impl Serialize for PriceQuote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PriceQuote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
