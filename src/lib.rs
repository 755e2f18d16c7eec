//! # Sky Flights Library
//!
//! Flight search on top of the Sky Scrapper API. Upstream itineraries come
//! back in a loose, shifting shape; this library normalizes them into
//! uniform [`FlightOffer`] records, prices them for the whole party and
//! sorts them for display.

pub mod airport;
pub mod booking;
pub mod client;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod pricing;
pub mod raw;
pub mod sort;
pub mod time_format;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use airport::{select_airport, Airport};
pub use booking::{BookingConfirmation, PassengerDetails};
pub use client::{FlightClient, FlightSearch};
pub use config::ClientConfig;
pub use normalize::{normalize, normalize_all, FlightOffer, Normalized};
pub use pricing::{compute_price, PriceQuote};
pub use sort::{sort_offers, SortCriterion, SortOrder};
pub use time_format::{format_for_display, format_time_of_day, FlightDuration, FlightTime};

/// Display sentinel for any value that could not be resolved
pub const NOT_AVAILABLE: &str = "N/A";

/// Error types for the flights library
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("Please fill in all fields (missing {0})")]
    MissingInput(&'static str),

    #[error("Please select a future date")]
    DateInPast,

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid passenger counts: {0}")]
    InvalidPassengers(String),

    #[error("Could not find one or both airports. Please check the airport codes. ({0})")]
    AirportNotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Invalid airport codes. Please check and try again.")]
    InvalidAirportCodes,

    #[error("Failed to fetch flights. Please check your internet connection and try again. (HTTP {0})")]
    HttpStatus(u16),

    #[error("Failed to fetch flights. Please check your internet connection and try again.")]
    HttpError(#[from] reqwest::Error),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parsing failed: {0}")]
    ParseError(String),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),
}

/// Passenger composition of a search. At least one adult is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PassengerCountsInput")]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

#[derive(Deserialize)]
struct PassengerCountsInput {
    adults: u32,
    #[serde(default)]
    children: u32,
    #[serde(default)]
    infants: u32,
}

impl TryFrom<PassengerCountsInput> for PassengerCounts {
    type Error = FlightError;

    fn try_from(input: PassengerCountsInput) -> Result<Self, Self::Error> {
        PassengerCounts::new(input.adults, input.children, input.infants)
    }
}

impl PassengerCounts {
    pub fn new(adults: u32, children: u32, infants: u32) -> Result<Self, FlightError> {
        if adults == 0 {
            return Err(FlightError::InvalidPassengers(
                "at least one adult is required".to_string(),
            ));
        }
        if adults
            .checked_add(children)
            .and_then(|n| n.checked_add(infants))
            .is_none()
        {
            return Err(FlightError::InvalidPassengers(
                "too many passengers".to_string(),
            ));
        }
        Ok(Self {
            adults,
            children,
            infants,
        })
    }

    pub fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }
}

impl Default for PassengerCounts {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

// The total travels with the counts so the passenger-details step can size
// its forms without recomputing.
impl Serialize for PassengerCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PassengerCounts", 4)?;
        state.serialize_field("adults", &self.adults)?;
        state.serialize_field("children", &self.children)?;
        state.serialize_field("infants", &self.infants)?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

/// Cabin class enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Value of the upstream `cabinClass` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for CabinClass {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "economy" => Ok(CabinClass::Economy),
            "premium-economy" | "premium_economy" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            _ => Err(FlightError::ParseError(format!("Invalid cabin class: {}", s))),
        }
    }
}

/// Everything a user enters before pressing search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub from: String,
    pub to: String,
    /// Departure date in YYYY-MM-DD format
    pub date: String,
    pub cabin_class: CabinClass,
    pub passengers: PassengerCounts,
}

impl SearchRequest {
    /// Check user input before any network call is made.
    ///
    /// Returns the parsed departure date.
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate, FlightError> {
        if self.from.trim().is_empty() {
            return Err(FlightError::MissingInput("origin"));
        }
        if self.to.trim().is_empty() {
            return Err(FlightError::MissingInput("destination"));
        }
        if self.date.trim().is_empty() {
            return Err(FlightError::MissingInput("date"));
        }
        if self.passengers.adults == 0 {
            return Err(FlightError::InvalidPassengers(
                "at least one adult is required".to_string(),
            ));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| FlightError::InvalidDate(self.date.clone()))?;
        if date < today {
            return Err(FlightError::DateInPast);
        }
        Ok(date)
    }
}

/// Main public API function: validate, resolve both airports, search and
/// normalize, using configuration from the environment.
pub async fn search_flights(request: SearchRequest) -> Result<FlightSearch, FlightError> {
    let config = ClientConfig::from_env()?;
    let client = FlightClient::new(config)?;
    client.search(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: &str, to: &str, date: &str) -> SearchRequest {
        SearchRequest {
            from: from.to_string(),
            to: to.to_string(),
            date: date.to_string(),
            cabin_class: CabinClass::Economy,
            passengers: PassengerCounts::default(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_passenger_counts() {
        let passengers = PassengerCounts::new(2, 1, 1).unwrap();
        assert_eq!(passengers.total(), 4);
        assert!(PassengerCounts::new(0, 2, 0).is_err());

        let passengers = PassengerCounts::default();
        assert_eq!(passengers.adults, 1);
        assert_eq!(passengers.total(), 1);
    }

    #[test]
    fn test_passenger_counts_serialize_total() {
        let json = serde_json::to_value(PassengerCounts::new(2, 1, 0).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"adults": 2, "children": 1, "infants": 0, "total": 3})
        );

        let back: PassengerCounts = serde_json::from_value(json).unwrap();
        assert_eq!(back, PassengerCounts::new(2, 1, 0).unwrap());
    }

    #[test]
    fn test_passenger_counts_deserialize_validates() {
        let result: Result<PassengerCounts, _> =
            serde_json::from_value(serde_json::json!({"adults": 0, "children": 2, "infants": 0}));
        assert!(result.is_err());

        let counts: PassengerCounts = serde_json::from_value(serde_json::json!({"adults": 3})).unwrap();
        assert_eq!(counts.total(), 3);

        let result: Result<PassengerCounts, _> = serde_json::from_value(
            serde_json::json!({"adults": u32::MAX, "children": 1, "infants": 0}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_passenger_counts_reject_overflowing_total() {
        assert!(matches!(
            PassengerCounts::new(u32::MAX, 1, 0),
            Err(FlightError::InvalidPassengers(_))
        ));
        assert!(PassengerCounts::new(1, u32::MAX - 1, 1).is_err());
        assert_eq!(PassengerCounts::new(1, u32::MAX - 1, 0).unwrap().total(), u32::MAX);
    }

    #[test]
    fn test_cabin_class_parsing() {
        assert!(matches!("economy".parse::<CabinClass>(), Ok(CabinClass::Economy)));
        assert!(matches!("premium-economy".parse::<CabinClass>(), Ok(CabinClass::PremiumEconomy)));
        assert!(matches!("Premium_Economy".parse::<CabinClass>(), Ok(CabinClass::PremiumEconomy)));
        assert!(matches!("business".parse::<CabinClass>(), Ok(CabinClass::Business)));
        assert!(matches!("first".parse::<CabinClass>(), Ok(CabinClass::First)));
        assert!("invalid".parse::<CabinClass>().is_err());
        assert_eq!(CabinClass::PremiumEconomy.as_param(), "premium_economy");
    }

    #[test]
    fn test_validate_accepts_today_and_future() {
        assert_eq!(
            request("JFK", "LAX", "2026-10-16").validate(today()).unwrap(),
            today()
        );
        assert!(request("JFK", "LAX", "2027-01-02").validate(today()).is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        assert!(matches!(
            request("", "LAX", "2026-10-20").validate(today()),
            Err(FlightError::MissingInput("origin"))
        ));
        assert!(matches!(
            request("JFK", "  ", "2026-10-20").validate(today()),
            Err(FlightError::MissingInput("destination"))
        ));
        assert!(matches!(
            request("JFK", "LAX", "").validate(today()),
            Err(FlightError::MissingInput("date"))
        ));
    }

    #[test]
    fn test_validate_rejects_past_and_bad_dates() {
        assert!(matches!(
            request("JFK", "LAX", "2026-10-15").validate(today()),
            Err(FlightError::DateInPast)
        ));
        assert!(matches!(
            request("JFK", "LAX", "10/20/2026").validate(today()),
            Err(FlightError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(FlightError::DateInPast.to_string(), "Please select a future date");
        assert_eq!(
            FlightError::InvalidAirportCodes.to_string(),
            "Invalid airport codes. Please check and try again."
        );
        assert_eq!(
            FlightError::Upstream("date: Date must be in the future".to_string()).to_string(),
            "date: Date must be in the future"
        );
    }
}
