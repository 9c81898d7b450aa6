//! Time, weather, encyclopedia and URL tools.
//!
//! Weather and encyclopedia lookups are canned responses; only
//! [`check_url`] touches the network.

use crate::toolkit::format_number;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

const WEATHER_CONDITIONS: [&str; 5] = ["sunny", "cloudy", "rainy", "partly cloudy", "windy"];

/// Timeout for URL checks.
const URL_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn current_time() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Randomized weather report: 15-30 °C with a random condition.
pub fn weather_report<R: Rng + ?Sized>(location: &str, unit: &str, rng: &mut R) -> String {
    let celsius: i32 = rng.random_range(15..=30);
    let condition = WEATHER_CONDITIONS.choose(rng).copied().unwrap_or("sunny");

    let (temperature, unit_str) = if unit.eq_ignore_ascii_case("fahrenheit") {
        (format_number(celsius as f64 * 9.0 / 5.0 + 32.0), "°F")
    } else {
        (celsius.to_string(), "°C")
    };

    format!(
        "The weather in {} is currently {}, {} degrees {}.",
        location, condition, temperature, unit_str
    )
}

/// Fixed weather report used by the basic toolset.
pub fn fixed_weather(location: &str, unit: &str) -> String {
    format!(
        "The weather in {} is currently sunny, 22 degrees {}.",
        location, unit
    )
}

/// Placeholder encyclopedia search result.
pub fn wikipedia_mock(query: &str) -> String {
    format!(
        "Wikipedia search results for '{}': This is a mock result. For real Wikipedia searches, \
         connect a Wikipedia API client and implement proper API calls.",
        query
    )
}

/// Short placeholder result used by the basic toolset.
pub fn wikipedia_brief(query: &str) -> String {
    format!(
        "Wikipedia search results for '{}': This is a mock result. Connect a Wikipedia API client for real searches.",
        query
    )
}

/// Outcome of probing a URL.
#[derive(Debug, Clone, Serialize)]
pub struct UrlStatus {
    pub url: String,
    pub status_code: Option<u16>,
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlStatus {
    fn failed(url: &str, error: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            status_code: None,
            accessible: false,
            content_type: None,
            content_length: None,
            error: Some(error.to_string()),
        }
    }
}

/// Fetch `url` and report whether it answered with HTTP 200.
///
/// Failures are reported in the returned status rather than as errors.
#[instrument(skip(client))]
pub async fn check_url(client: &reqwest::Client, url: &str) -> UrlStatus {
    if let Err(e) = url::Url::parse(url) {
        return UrlStatus::failed(url, format!("Invalid URL: {}", e));
    }

    let response = match client.get(url).timeout(URL_CHECK_TIMEOUT).send().await {
        Ok(response) => response,
        Err(e) => return UrlStatus::failed(url, e),
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return UrlStatus::failed(url, e),
    };

    debug!("{} answered {} with {} bytes", url, status, body.len());

    UrlStatus {
        url: url.to_string(),
        status_code: Some(status.as_u16()),
        accessible: status == reqwest::StatusCode::OK,
        content_type: Some(content_type),
        content_length: Some(body.len()),
        error: None,
    }
}
