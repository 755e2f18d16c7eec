//! Itinerary normalization
//!
//! Turns one loosely shaped upstream itinerary into a [`FlightOffer`].
//! Only an itinerary without any leg is rejected; every other gap degrades
//! to an absent value that renders as `"N/A"`.

use crate::airport::Airport;
use crate::pricing::{compute_price, PriceQuote};
use crate::raw::{RawCarrier, RawItinerary, RawLeg, Scalar};
use crate::time_format::{FlightDuration, FlightTime};
use crate::PassengerCounts;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Canonical, display-ready flight offer.
///
/// Values that could not be resolved are `None` internally and serialize
/// as `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(with = "or_not_available")]
    pub airline: Option<String>,
    #[serde(with = "or_not_available")]
    pub flight_number: Option<String>,
    pub departure_time: FlightTime,
    pub arrival_time: FlightTime,
    #[serde(with = "or_not_available")]
    pub duration: Option<FlightDuration>,
    pub passengers: PassengerCounts,
    #[serde(with = "or_not_available")]
    pub price: Option<PriceQuote>,
    /// `"<airport title> (<code>)"`
    pub departure: String,
    pub arrival: String,
}

impl FlightOffer {
    pub fn airline_display(&self) -> &str {
        self.airline.as_deref().unwrap_or(crate::NOT_AVAILABLE)
    }

    pub fn flight_number_display(&self) -> &str {
        self.flight_number.as_deref().unwrap_or(crate::NOT_AVAILABLE)
    }

    pub fn duration_display(&self) -> String {
        display_or_not_available(self.duration.as_ref())
    }

    pub fn price_display(&self) -> String {
        display_or_not_available(self.price.as_ref())
    }
}

fn display_or_not_available<T: std::fmt::Display>(value: Option<&T>) -> String {
    value
        .map(ToString::to_string)
        .unwrap_or_else(|| crate::NOT_AVAILABLE.to_string())
}

/// `Option<T>` <-> display string, with `"N/A"` standing for `None`
mod or_not_available {
    use crate::NOT_AVAILABLE;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        if text.trim() == NOT_AVAILABLE {
            return Ok(None);
        }
        text.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Result of normalizing a whole batch
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Valid offers, in upstream order
    pub offers: Vec<FlightOffer>,
    /// Itineraries dropped for having no leg
    pub dropped: usize,
    /// Itineraries whose structure could not be read at all
    pub malformed: usize,
}

/// Normalize one itinerary. `None` when it has no leg.
pub fn normalize(
    itinerary: &RawItinerary,
    from: &Airport,
    to: &Airport,
    passengers: &PassengerCounts,
) -> Option<FlightOffer> {
    let leg = itinerary.first_leg()?;

    let carrier = leg.carriers.as_ref().and_then(|c| c.primary());
    if carrier.is_none() {
        debug!(itinerary_id = ?itinerary.id, "No carrier found for itinerary");
    }

    let price = compute_price(itinerary.price.as_ref(), passengers);
    if price.is_none() {
        debug!(itinerary_id = ?itinerary.id, "Price could not be resolved");
    }

    Some(FlightOffer {
        airline: carrier.and_then(|c| c.name.as_ref()).and_then(Scalar::as_text),
        flight_number: flight_number(&leg, carrier),
        departure_time: FlightTime::parse(
            first_text(&[&leg.departure, &leg.departure_time, &leg.departure_date_time]).as_deref(),
        ),
        arrival_time: FlightTime::parse(
            first_text(&[&leg.arrival, &leg.arrival_time, &leg.arrival_date_time]).as_deref(),
        ),
        duration: leg
            .duration_in_minutes
            .as_ref()
            .and_then(Scalar::as_i64)
            .and_then(FlightDuration::from_minutes),
        passengers: *passengers,
        price,
        departure: from.label(),
        arrival: to.label(),
    })
}

/// Normalize a batch of raw JSON itineraries, keeping upstream order.
///
/// Leg-less itineraries are dropped and counted; entries that do not even
/// deserialize are skipped and counted separately.
pub fn normalize_all(
    itineraries: &[Value],
    from: &Airport,
    to: &Airport,
    passengers: &PassengerCounts,
) -> Normalized {
    let mut result = Normalized::default();

    for (index, value) in itineraries.iter().enumerate() {
        let itinerary = match RawItinerary::deserialize(value) {
            Ok(itinerary) => itinerary,
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed itinerary");
                result.malformed += 1;
                continue;
            }
        };

        match normalize(&itinerary, from, to, passengers) {
            Some(offer) => result.offers.push(offer),
            None => {
                debug!(index, "No leg found for itinerary");
                result.dropped += 1;
            }
        }
    }

    debug!(
        offers = result.offers.len(),
        dropped = result.dropped,
        malformed = result.malformed,
        "Normalized itineraries"
    );
    result
}

fn first_text(candidates: &[&Option<Scalar>]) -> Option<String> {
    candidates
        .iter()
        .copied()
        .find_map(|candidate| candidate.as_ref().and_then(Scalar::as_text))
}

/// `"<airline code> <number>"`, or `None` when either part is missing.
fn flight_number(leg: &RawLeg, carrier: Option<&RawCarrier>) -> Option<String> {
    let code = carrier.and_then(|c| first_text(&[&c.alternate_id, &c.code]))?;

    let number = leg
        .id
        .as_ref()
        .and_then(Scalar::as_text)
        .and_then(|id| number_from_leg_id(&id, &code))
        .or_else(|| leg.flight_number.as_ref().and_then(Scalar::as_text))
        .or_else(|| carrier.and_then(|c| c.flight_number.as_ref()).and_then(Scalar::as_text))?;

    Some(format!("{} {}", code, number).trim().to_string())
}

/// Leg ids look like `"<origin>-<departure>--<carrier>-<rest>"`. The
/// segment right after `"--"` is taken, skipping it when it merely repeats
/// the airline code.
fn number_from_leg_id(id: &str, code: &str) -> Option<String> {
    let (_, tail) = id.split_once("--")?;
    let mut segments = tail.split('-').map(str::trim);

    let first = segments.next().filter(|s| !s.is_empty())?;
    if first.eq_ignore_ascii_case(code) {
        return segments
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
    Some(first.to_string())
}
