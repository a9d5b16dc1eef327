use crate::domain::model::Coordinate;
use crate::domain::ports::{ConfigProvider, Geocoder};
use crate::utils::error::{error_chain, Result, TaxifareError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "taxifare_lewagon_project";

// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.geocoder_endpoint(),
            config.user_agent(),
            config.request_timeout(),
        )
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.endpoint)
    }
}

fn transport_error(err: reqwest::Error) -> TaxifareError {
    let message = error_chain(&err);
    if err.is_connect() || err.is_timeout() {
        TaxifareError::GeocoderUnavailable { message }
    } else {
        TaxifareError::GeocodingError { message }
    }
}

fn status_error(status: StatusCode, body: &str) -> TaxifareError {
    match status {
        // 429 is Nominatim's usage-policy throttle.
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => TaxifareError::GeocoderUnavailable {
            message: format!("HTTP {}", status),
        },
        _ => TaxifareError::GeocodingError {
            message: format!("HTTP {}: {}", status, body.trim()),
        },
    }
}

fn parse_degrees(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| TaxifareError::GeocodingError {
            message: format!("invalid {} '{}': {}", field, raw, e),
        })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
        let url = self.search_url();
        tracing::debug!("Geocoding \"{}\" via {}", address, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!(
                "Geocoder returned non-success status: {}. Body: {}",
                status,
                text
            );
            return Err(status_error(status, &text));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                "Failed to parse geocoder response. URL: {}\nError: {}. Body: {}",
                url,
                e,
                text
            );
            TaxifareError::GeocodingError {
                message: format!("unexpected response body: {}", e),
            }
        })?;

        let Some(place) = places.into_iter().next() else {
            tracing::debug!("No geocode results for \"{}\"", address);
            return Ok(None);
        };

        let latitude = parse_degrees("latitude", &place.lat)?;
        let longitude = parse_degrees("longitude", &place.lon)?;
        let coordinate = Coordinate::new(latitude, longitude)?;

        tracing::debug!(
            "Resolved \"{}\" to {} ({})",
            address,
            coordinate,
            place.display_name.as_deref().unwrap_or("unnamed place")
        );
        Ok(Some(coordinate))
    }
}
