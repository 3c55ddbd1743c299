//! Location Resolution Module
//!
//! Determines a best-effort current coordinate from an IP geolocation
//! lookup. Resolution never fails: any problem yields the configured
//! fallback coordinate, which carries no label.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::LocationConfig;
use crate::models::Coordinate;

/// IP geolocation reply
#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
}

/// Service for resolving the current position
pub struct LocationResolver {
    client: Client,
    base_url: String,
    fallback: Coordinate,
}

impl LocationResolver {
    /// Create a new resolver
    pub fn new(config: &LocationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("WeatherWear/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create geolocation HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            fallback: config.fallback_coordinate(),
        })
    }

    /// Coordinate returned when lookup fails
    #[must_use]
    pub fn fallback(&self) -> &Coordinate {
        &self.fallback
    }

    /// Resolve the current coordinate, degrading to the fallback on any failure
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Coordinate {
        match self.lookup().await {
            Ok(coordinate) => {
                debug!(
                    "Resolved location: {:?} at ({}, {})",
                    coordinate.label, coordinate.latitude, coordinate.longitude
                );
                coordinate
            }
            Err(e) => {
                debug!("IP geolocation failed: {:#}, using default coordinate", e);
                self.fallback.clone()
            }
        }
    }

    async fn lookup(&self) -> Result<Coordinate> {
        let url = format!("{}/json/", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?;
        let reply: IpLocationResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse geolocation response")?;

        if reply.status.as_deref() != Some("success") {
            return Err(anyhow!("Geolocation status was {:?}", reply.status));
        }

        let (Some(lat), Some(lon)) = (reply.lat, reply.lon) else {
            return Err(anyhow!("Geolocation reply has no coordinates"));
        };

        let label = reply
            .city
            .filter(|c| !c.is_empty())
            .or(reply.region_name.filter(|r| !r.is_empty()));

        Ok(match label {
            Some(label) => Coordinate::with_label(lat, lon, label),
            None => Coordinate::new(lat, lon),
        })
    }
}
