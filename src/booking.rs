//! Passenger details step and booking stub
//!
//! A selected offer is handed over together with one form per traveller.
//! Submitting only validates and logs; nothing is persisted or sent.

use crate::normalize::FlightOffer;
use crate::FlightError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const BOOKING_MESSAGE: &str = "Booking successful! (This is a demo)";

/// One traveller's form. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassengerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// YYYY-MM-DD
    pub date_of_birth: String,
    pub nationality: String,
    pub passport_number: String,
    /// YYYY-MM-DD
    pub passport_expiry: String,
}

impl PassengerDetails {
    fn validate(&self, index: usize) -> Result<(), FlightError> {
        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("date of birth", &self.date_of_birth),
            ("nationality", &self.nationality),
            ("passport number", &self.passport_number),
            ("passport expiry", &self.passport_expiry),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(invalid(index, format!("{} is required", field)));
        }

        if !self.email.contains('@') {
            return Err(invalid(index, format!("'{}' is not an email address", self.email)));
        }
        for (field, value) in [
            ("date of birth", &self.date_of_birth),
            ("passport expiry", &self.passport_expiry),
        ] {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| invalid(index, format!("{} must be YYYY-MM-DD", field)))?;
        }
        Ok(())
    }
}

fn invalid(index: usize, reason: String) -> FlightError {
    FlightError::InvalidBooking(format!("passenger {}: {}", index + 1, reason))
}

/// What the no-op booking hands back
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub message: &'static str,
    pub offer: FlightOffer,
    pub passengers: usize,
}

/// Empty forms, one per traveller on the offer.
pub fn blank_forms(offer: &FlightOffer) -> Vec<PassengerDetails> {
    vec![PassengerDetails::default(); offer.passengers.total() as usize]
}

/// Validate the forms against the offer and "book" it.
pub fn submit(
    offer: &FlightOffer,
    details: &[PassengerDetails],
) -> Result<BookingConfirmation, FlightError> {
    let expected = offer.passengers.total() as usize;
    if details.len() != expected {
        return Err(FlightError::InvalidBooking(format!(
            "expected {} passenger forms, got {}",
            expected,
            details.len()
        )));
    }
    for (index, passenger) in details.iter().enumerate() {
        passenger.validate(index)?;
    }

    info!(
        flight_number = offer.flight_number_display(),
        departure = %offer.departure,
        arrival = %offer.arrival,
        passengers = details.len(),
        "Booking submitted"
    );

    Ok(BookingConfirmation {
        message: BOOKING_MESSAGE,
        offer: offer.clone(),
        passengers: details.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_format::FlightTime;
    use crate::PassengerCounts;

    fn offer(passengers: PassengerCounts) -> FlightOffer {
        FlightOffer {
            airline: Some("Delta".to_string()),
            flight_number: Some("DL 401".to_string()),
            departure_time: FlightTime::parse(Some("2026-11-02T09:00:00")),
            arrival_time: FlightTime::parse(Some("2026-11-02T12:20:00")),
            duration: None,
            passengers,
            price: None,
            departure: "New York John F. Kennedy (JFK)".to_string(),
            arrival: "Los Angeles International (LAX)".to_string(),
        }
    }

    fn traveller(first_name: &str) -> PassengerDetails {
        PassengerDetails {
            first_name: first_name.to_string(),
            last_name: "Rivera".to_string(),
            email: "sam@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            nationality: "US".to_string(),
            passport_number: "X1234567".to_string(),
            passport_expiry: "2031-04-11".to_string(),
        }
    }

    #[test]
    fn test_blank_forms_match_party_size() {
        let forms = blank_forms(&offer(PassengerCounts::new(2, 1, 1).unwrap()));
        assert_eq!(forms.len(), 4);
        assert!(forms.iter().all(|f| f.first_name.is_empty()));
    }

    #[test]
    fn test_submit_success() {
        let offer = offer(PassengerCounts::new(1, 1, 0).unwrap());
        let confirmation = submit(&offer, &[traveller("Sam"), traveller("Alex")]).unwrap();
        assert_eq!(confirmation.message, BOOKING_MESSAGE);
        assert_eq!(confirmation.passengers, 2);
    }

    #[test]
    fn test_submit_rejects_wrong_form_count() {
        let offer = offer(PassengerCounts::new(2, 0, 0).unwrap());
        assert!(matches!(
            submit(&offer, &[traveller("Sam")]),
            Err(FlightError::InvalidBooking(_))
        ));
    }

    #[test]
    fn test_submit_rejects_incomplete_forms() {
        let offer = offer(PassengerCounts::default());

        let mut missing = traveller("Sam");
        missing.passport_number = " ".to_string();
        let error = submit(&offer, &[missing]).unwrap_err();
        assert!(error.to_string().contains("passport number is required"));

        let mut bad_email = traveller("Sam");
        bad_email.email = "sam.example.com".to_string();
        assert!(submit(&offer, &[bad_email]).is_err());

        let mut bad_date = traveller("Sam");
        bad_date.date_of_birth = "12/04/1990".to_string();
        let error = submit(&offer, &[bad_date]).unwrap_err();
        assert!(error.to_string().contains("passenger 1: date of birth"));
    }
}
