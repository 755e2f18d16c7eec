//! HTTP client for the Sky Scrapper flight API

use crate::airport::{select_airport, Airport, AirportLookupResponse};
use crate::normalize::{normalize_all, FlightOffer, Normalized};
use crate::raw::{ErrorBody, FlightSearchEnvelope};
use crate::{ClientConfig, FlightError, SearchRequest};
use chrono::{Local, NaiveDate};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

const SEARCH_AIRPORT_PATH: &str = "/api/v1/flights/searchAirport";
const SEARCH_FLIGHTS_PATH: &str = "/api/v1/flights/searchFlights";

/// Shown when a search succeeds but yields nothing usable
pub const NO_FLIGHTS_MESSAGE: &str = "No flights found for this route. Try different airports or dates.";
const NO_FLIGHTS_UPSTREAM_MESSAGE: &str = "No flights found for this route.";

/// Outcome of one search action
#[derive(Debug, Clone)]
pub struct FlightSearch {
    pub from: Airport,
    pub to: Airport,
    pub date: NaiveDate,
    /// Normalized offers in upstream order
    pub offers: Vec<FlightOffer>,
    /// Itineraries dropped for having no leg
    pub dropped: usize,
    /// Itineraries that could not be read
    pub malformed: usize,
}

impl FlightSearch {
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// User-facing notice for an empty result, `None` otherwise.
    pub fn notice(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_FLIGHTS_MESSAGE)
    }
}

/// Main flight client for making requests to the Sky Scrapper API
pub struct FlightClient {
    http_client: Client,
    config: ClientConfig,
}

impl FlightClient {
    /// Create a new flight client
    pub fn new(config: ClientConfig) -> Result<Self, FlightError> {
        debug!(base_url = %config.base_url, "Creating new flight client");
        let http_client = Client::builder()
            .user_agent(concat!("sky-flights/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full search: validate input, resolve both airports concurrently,
    /// then query flights and normalize the itineraries.
    #[instrument(level = "info", skip(self, request), fields(from = %request.from, to = %request.to, date = %request.date))]
    pub async fn search(&self, request: &SearchRequest) -> Result<FlightSearch, FlightError> {
        let date = request.validate(Local::now().date_naive())?;

        let (from, to) = tokio::try_join!(
            self.resolve_airport(&request.from),
            self.resolve_airport(&request.to)
        )?;
        info!(from = %from.sky_id, to = %to.sky_id, "Resolved airports");

        let itineraries = self.search_itineraries(&from, &to, date, request).await?;
        let Normalized {
            offers,
            dropped,
            malformed,
        } = normalize_all(&itineraries, &from, &to, &request.passengers);

        info!(
            offers = offers.len(),
            dropped,
            malformed,
            "Flight search completed"
        );

        Ok(FlightSearch {
            from,
            to,
            date,
            offers,
            dropped,
            malformed,
        })
    }

    /// Look up candidates for `query` and pick one.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve_airport(&self, query: &str) -> Result<Airport, FlightError> {
        let candidates = self.search_airport(query).await?;
        debug!(candidates = candidates.len(), "Airport candidates received");
        select_airport(candidates, query).ok_or_else(|| {
            warn!(query, "No airport candidates");
            FlightError::AirportNotFound(query.trim().to_string())
        })
    }

    /// Raw candidate list from the airport lookup endpoint
    pub async fn search_airport(&self, query: &str) -> Result<Vec<Airport>, FlightError> {
        let params = [("query", query.trim()), ("locale", self.config.locale.as_str())];
        let response: AirportLookupResponse = self.get_json(SEARCH_AIRPORT_PATH, &params).await?;
        Ok(response.into_candidates())
    }

    /// Query flights and return the raw itinerary list. A successful
    /// envelope without itineraries is an empty list.
    #[instrument(level = "info", skip(self, from, to, request))]
    pub async fn search_itineraries(
        &self,
        from: &Airport,
        to: &Airport,
        date: NaiveDate,
        request: &SearchRequest,
    ) -> Result<Vec<serde_json::Value>, FlightError> {
        let date = date.format("%Y-%m-%d").to_string();
        let adults = request.passengers.adults.to_string();
        let children = request.passengers.children.to_string();
        let infants = request.passengers.infants.to_string();

        let params = [
            ("originSkyId", from.sky_id.as_str()),
            ("destinationSkyId", to.sky_id.as_str()),
            ("originEntityId", from.navigation.entity_id.as_str()),
            ("destinationEntityId", to.navigation.entity_id.as_str()),
            ("date", date.as_str()),
            ("adults", adults.as_str()),
            ("children", children.as_str()),
            ("infants", infants.as_str()),
            ("cabinClass", request.cabin_class.as_param()),
            ("currency", self.config.currency.as_str()),
            ("countryCode", self.config.country_code.as_str()),
            ("market", self.config.market.as_str()),
            ("locale", self.config.locale.as_str()),
        ];
        let envelope: FlightSearchEnvelope = self.get_json(SEARCH_FLIGHTS_PATH, &params).await?;

        if envelope.status == Some(false) {
            let message = envelope
                .message
                .map(|m| m.flatten())
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| NO_FLIGHTS_UPSTREAM_MESSAGE.to_string());
            error!(message = %message, "Flight search rejected upstream");
            return Err(FlightError::Upstream(message));
        }

        let itineraries = envelope
            .data
            .and_then(|data| data.itineraries)
            .unwrap_or_default();
        info!(itineraries = itineraries.len(), "Received itineraries");
        Ok(itineraries)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FlightError> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "Making HTTP request");

        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .header("Accept", "application/json")
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", &self.config.api_host)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                FlightError::HttpError(e)
            })?;
        let status = response.status();

        info!(
            path,
            status = %status,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "HTTP request completed"
        );

        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 404 means the airport ids were rejected; other failures surface the
    /// upstream message when there is one.
    async fn status_error(response: Response) -> FlightError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Upstream returned 404");
            return FlightError::InvalidAirportCodes;
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .map(|m| m.flatten())
            .filter(|m| !m.trim().is_empty());

        error!(status = %status, message = ?message, "HTTP request failed");
        match message {
            Some(message) => FlightError::Upstream(message),
            None => FlightError::HttpStatus(status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CabinClass, PassengerCounts};
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> FlightClient {
        FlightClient::new(ClientConfig::new("test-key").with_base_url(server.url())).unwrap()
    }

    fn request(date: &str) -> SearchRequest {
        SearchRequest {
            from: "JFK".to_string(),
            to: "LAX".to_string(),
            date: date.to_string(),
            cabin_class: CabinClass::Economy,
            passengers: PassengerCounts::default(),
        }
    }

    #[test]
    fn test_flight_client_creation() {
        let client = FlightClient::new(ClientConfig::new("key"));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_airport_sends_key_and_picks_exact_match() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_AIRPORT_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "jfk".into()),
                Matcher::UrlEncoded("locale".into(), "en-US".into()),
            ]))
            .match_header("x-rapidapi-key", "test-key")
            .match_header("x-rapidapi-host", "sky-scrapper.p.rapidapi.com")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":true,"data":[
                    {"skyId":"NYCA","presentation":{"title":"New York"},"navigation":{"entityId":"27537542"}},
                    {"skyId":"JFK","presentation":{"title":"New York John F. Kennedy"},"navigation":{"entityId":"95565058"}}
                ]}"#,
            )
            .create_async()
            .await;

        let airport = client(&server).resolve_airport("jfk").await.unwrap();
        assert_eq!(airport.sky_id, "JFK");
        assert_eq!(airport.navigation.entity_id, "95565058");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_airport_without_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_AIRPORT_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":true,"data":[]}"#)
            .create_async()
            .await;

        let result = client(&server).resolve_airport("XXX").await;
        assert!(matches!(result, Err(FlightError::AirportNotFound(code)) if code == "XXX"));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_invalid_airport_codes() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_AIRPORT_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let result = client(&server).search_airport("JFK").await;
        assert!(matches!(result, Err(FlightError::InvalidAirportCodes)));
    }

    #[tokio::test]
    async fn test_server_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_AIRPORT_PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"message":"You have exceeded the rate limit per second for your plan"}"#)
            .create_async()
            .await;

        match client(&server).search_airport("JFK").await {
            Err(FlightError::Upstream(message)) => {
                assert_eq!(message, "You have exceeded the rate limit per second for your plan")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_body_is_generic() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_AIRPORT_PATH)
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let error = client(&server).search_airport("JFK").await.unwrap_err();
        assert!(matches!(error, FlightError::HttpStatus(502)));
        assert!(error.to_string().starts_with("Failed to fetch flights."));
    }

    #[tokio::test]
    async fn test_search_rejects_invalid_input_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let result = client(&server).search(&request("2000-01-01")).await;
        assert!(matches!(result, Err(FlightError::DateInPast)));

        let mut missing = request("2099-01-01");
        missing.to.clear();
        let result = client(&server).search(&missing).await;
        assert!(matches!(result, Err(FlightError::MissingInput(_))));

        mock.assert_async().await;
    }
}
