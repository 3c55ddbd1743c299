//! Weather API client for OpenWeatherMap current conditions
//!
//! Fetches the current reading for a coordinate and normalizes it into a
//! [`WeatherSnapshot`]. In mock mode the canonical snapshot is returned
//! without touching the network.

use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::{PipelineError, describe_http_error};
use crate::models::{Coordinate, UNKNOWN_LOCATION, WeatherMode, WeatherSnapshot};

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Weather API client
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("WeatherWear/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create weather HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fail with `ConfigMissing` when live data cannot be requested
    pub fn ensure_api_key(&self) -> Result<&str, PipelineError> {
        self.api_key.as_deref().ok_or_else(|| {
            PipelineError::config_missing("OpenWeatherMap API key is not configured")
        })
    }

    /// Fetch current conditions for a coordinate
    #[instrument(skip(self, coordinate), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn fetch(
        &self,
        coordinate: &Coordinate,
        mode: WeatherMode,
    ) -> Result<WeatherSnapshot, PipelineError> {
        if mode == WeatherMode::Mock {
            debug!("Mock mode, returning canonical snapshot");
            return Ok(WeatherSnapshot::mock());
        }

        let api_key = self.ensure_api_key()?;

        info!(
            "Getting current weather for coordinates: {}",
            coordinate.format_coordinates()
        );
        let start_time = Instant::now();

        let url = format!(
            "{}/weather?lat={}&lon={}&units=metric&appid={}",
            self.base_url,
            coordinate.latitude,
            coordinate.longitude,
            urlencoding::encode(api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PipelineError::network(describe_http_error(e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::network(describe_http_error(e)))?;

        let payload: openweather::CurrentWeatherResponse = serde_json::from_str(&body)
            .map_err(|e| PipelineError::data_format(format!("undecodable payload: {e}")))?;

        let total_duration = start_time.elapsed();
        info!(
            "Successfully retrieved current weather in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        payload.into_snapshot(coordinate.label.as_deref())
    }
}

/// OpenWeatherMap response structures and conversion
mod openweather {
    use serde::Deserialize;

    use super::{PipelineError, UNKNOWN_LOCATION, WeatherSnapshot};

    /// Current weather response from `/weather`
    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub name: Option<String>,
        pub main: Option<MainBlock>,
        pub weather: Option<Vec<Condition>>,
        pub rain: Option<Precipitation>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub temp_max: f64,
        pub temp_min: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Precipitation {
        #[serde(rename = "1h")]
        pub one_hour: Option<f64>,
    }

    impl CurrentWeatherResponse {
        /// Map provider fields into a snapshot, preferring the resolved label
        pub fn into_snapshot(self, label: Option<&str>) -> Result<WeatherSnapshot, PipelineError> {
            let main = self
                .main
                .ok_or_else(|| PipelineError::data_format("payload has no `main` block"))?;
            let description = self
                .weather
                .and_then(|conditions| conditions.into_iter().next())
                .map(|condition| condition.description)
                .ok_or_else(|| PipelineError::data_format("payload has no `weather[0]` entry"))?;

            let location = label
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .or(self.name.filter(|n| !n.is_empty()))
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

            // Volume-based proxy kept as-is: 1h rain in mm times ten
            let rain_prob = self
                .rain
                .and_then(|rain| rain.one_hour)
                .map_or(0.0, |volume| (volume * 10.0).max(0.0));

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let humidity = main.humidity.round().clamp(0.0, 100.0) as u8;

            Ok(WeatherSnapshot {
                location,
                temp_current: main.temp,
                temp_max: main.temp_max,
                temp_min: main.temp_min,
                humidity,
                description,
                rain_prob,
            })
        }
    }
}
