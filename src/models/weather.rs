//! Normalized weather snapshot and display methods

use serde::{Deserialize, Serialize};

/// Place name used when neither the resolver nor the provider supplies one
pub const UNKNOWN_LOCATION: &str = "不明な場所";

/// Where weather data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    /// Query the weather provider
    #[default]
    Live,
    /// Return the fixed canonical snapshot without network access
    Mock,
}

/// One normalized reading for one coordinate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Display name of the place
    pub location: String,
    /// Current temperature in Celsius
    pub temp_current: f64,
    /// Maximum temperature in Celsius
    pub temp_max: f64,
    /// Minimum temperature in Celsius
    pub temp_min: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Provider description of the conditions
    pub description: String,
    /// Rain proxy: 1h rain volume x 10, 0 when none is reported.
    /// Not a calibrated probability.
    pub rain_prob: f64,
}

impl WeatherSnapshot {
    /// The canonical snapshot returned in mock mode
    #[must_use]
    pub fn mock() -> Self {
        Self {
            location: "テスト市".to_string(),
            temp_current: 22.5,
            temp_max: 24.0,
            temp_min: 20.0,
            humidity: 60,
            description: "晴れ".to_string(),
            rain_prob: 0.0,
        }
    }

    /// Format current temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temp_current)
    }

    /// Format the daily range with unit
    #[must_use]
    pub fn format_range(&self) -> String {
        format!("{:.1}°C - {:.1}°C", self.temp_min, self.temp_max)
    }
}
