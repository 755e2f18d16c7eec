//! Client configuration

use crate::FlightError;
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "sky-scrapper.p.rapidapi.com";

pub const API_KEY_VAR: &str = "RAPIDAPI_KEY";
pub const BASE_URL_VAR: &str = "SKY_SCRAPPER_BASE_URL";
pub const CURRENCY_VAR: &str = "SKY_SCRAPPER_CURRENCY";
pub const LOCALE_VAR: &str = "SKY_SCRAPPER_LOCALE";

/// Connection and market settings for the Sky Scrapper API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Sent as `X-RapidAPI-Host`
    pub api_host: String,
    pub locale: String,
    pub market: String,
    pub country_code: String,
    pub currency: String,
}

impl ClientConfig {
    /// Defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            locale: "en-US".to_string(),
            market: "en-US".to_string(),
            country_code: "US".to_string(),
            currency: "USD".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from `RAPIDAPI_KEY` plus the optional `SKY_SCRAPPER_*` overrides.
    pub fn from_env() -> Result<Self, FlightError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FlightError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR)
            .ok_or_else(|| FlightError::Config(format!("{} is not set", API_KEY_VAR)))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = non_empty(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        if let Some(currency) = non_empty(CURRENCY_VAR) {
            config.currency = currency.to_uppercase();
        }
        if let Some(locale) = non_empty(LOCALE_VAR) {
            config.market = locale.clone();
            config.locale = locale;
        }
        Ok(config)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
