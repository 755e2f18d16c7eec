//! Offer ordering for the results list

use crate::normalize::FlightOffer;
use crate::FlightError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort key selected in the results view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriterion {
    #[default]
    Price,
    Duration,
    Departure,
}

impl FromStr for SortCriterion {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortCriterion::Price),
            "duration" => Ok(SortCriterion::Duration),
            "departure" => Ok(SortCriterion::Departure),
            _ => Err(FlightError::ParseError(format!("Invalid sort criterion: {}", s))),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortCriterion::Price => "price",
            SortCriterion::Duration => "duration",
            SortCriterion::Departure => "departure",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(FlightError::ParseError(format!("Invalid sort order: {}", s))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Missing keys compare as larger than any present key, so they trail an
/// ascending sort and lead a descending one.
fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending comparison of two offers under `criterion`. Total and
/// deterministic: unresolvable keys never panic.
pub fn compare(a: &FlightOffer, b: &FlightOffer, criterion: SortCriterion) -> Ordering {
    match criterion {
        SortCriterion::Price => missing_last(
            a.price.as_ref().map(|p| p.total),
            b.price.as_ref().map(|p| p.total),
            |a, b| a.total_cmp(&b),
        ),
        SortCriterion::Duration => missing_last(
            a.duration.map(|d| d.minutes()),
            b.duration.map(|d| d.minutes()),
            |a, b| a.cmp(&b),
        ),
        SortCriterion::Departure => missing_last(
            a.departure_time.instant(),
            b.departure_time.instant(),
            |a, b| a.cmp(&b),
        ),
    }
}

/// Return a newly ordered copy of `offers`. Ties keep their input order.
pub fn sort_offers(
    offers: &[FlightOffer],
    criterion: SortCriterion,
    order: SortOrder,
) -> Vec<FlightOffer> {
    let mut sorted = offers.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, criterion);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}
