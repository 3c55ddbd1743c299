//! Configuration management for `WeatherWear`
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The resulting
//! value is built once at startup and handed to every component.

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::models::{Coordinate, WeatherMode};

/// Legacy variable holding the weather provider key
pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Legacy variable holding the generative-AI key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Weather key value that selects mock mode
pub const MOCK_API_KEY: &str = "mock";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherWearConfig {
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// IP geolocation settings
    pub location: LocationConfig,
    /// Generative-AI settings
    pub ai: AiConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Fetch cycle settings
    pub pipeline: PipelineConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap key; absence surfaces as `ConfigMissing` per cycle
    pub api_key: Option<String>,
    /// Base URL for the weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Live provider or canonical mock snapshot
    pub mode: WeatherMode,
}

/// IP geolocation configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Base URL for the geolocation API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Latitude used when resolution fails
    pub default_latitude: f64,
    /// Longitude used when resolution fails
    pub default_longitude: f64,
}

/// Generative-AI configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Gemini key; absence selects the rule-based strategy
    pub api_key: Option<String>,
    /// Base URL for the Generative Language API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Fetch cycle settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Optional deadline for one whole resolve/fetch/suggest cycle
    pub cycle_timeout_seconds: Option<u64>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

fn default_location_base_url() -> String {
    "http://ip-api.com".to_string()
}

fn default_location_timeout() -> u64 {
    5
}

fn default_latitude() -> f64 {
    22.3080
}

fn default_longitude() -> f64 {
    114.1718
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ai_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            mode: WeatherMode::Live,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            base_url: default_location_base_url(),
            timeout_seconds: default_location_timeout(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            timeout_seconds: default_ai_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LocationConfig {
    /// Coordinate returned when geolocation fails
    #[must_use]
    pub fn fallback_coordinate(&self) -> Coordinate {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }
}

impl WeatherWearConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERWEAR_WEATHER__API_KEY and friends
        builder = builder.add_source(
            Environment::with_prefix("WEATHERWEAR")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherWearConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherwear").join("config.toml"))
    }

    /// Fill unset keys from the conventional unprefixed variables
    fn apply_legacy_env(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = env::var(OPENWEATHER_API_KEY_ENV).ok();
        }
        if self.ai.api_key.is_none() {
            self.ai.api_key = env::var(GEMINI_API_KEY_ENV).ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        self.weather.api_key = normalize_key(self.weather.api_key.take());
        self.ai.api_key = normalize_key(self.ai.api_key.take());

        if self.weather.api_key.as_deref() == Some(MOCK_API_KEY) {
            self.weather.mode = WeatherMode::Mock;
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.location.base_url.is_empty() {
            self.location.base_url = default_location_base_url();
        }
        if self.location.timeout_seconds == 0 {
            self.location.timeout_seconds = default_location_timeout();
        }
        if self.ai.base_url.is_empty() {
            self.ai.base_url = default_ai_base_url();
        }
        if self.ai.model.is_empty() {
            self.ai.model = default_ai_model();
        }
        if self.ai.timeout_seconds == 0 {
            self.ai.timeout_seconds = default_ai_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=10).contains(&self.weather.timeout_seconds) {
            return Err(anyhow!("Weather API timeout must be between 1 and 10 seconds"));
        }

        if !(1..=5).contains(&self.location.timeout_seconds) {
            return Err(anyhow!("Location lookup timeout must be between 1 and 5 seconds"));
        }

        if !(1..=300).contains(&self.ai.timeout_seconds) {
            return Err(anyhow!("AI request timeout must be between 1 and 300 seconds"));
        }

        if !(-90.0..=90.0).contains(&self.location.default_latitude)
            || !(-180.0..=180.0).contains(&self.location.default_longitude)
        {
            return Err(anyhow!("Default coordinate is out of range"));
        }

        if self.pipeline.cycle_timeout_seconds == Some(0) {
            return Err(anyhow!("Cycle timeout cannot be zero"));
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ));
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Location API", &self.location.base_url),
            ("AI API", &self.ai.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("{name} base URL must be a valid HTTP or HTTPS URL"));
            }
        }

        Ok(())
    }
}

/// Treat blank keys as absent
fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
