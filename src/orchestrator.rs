//! Fetch Orchestrator
//!
//! Sequences one cycle: resolve location, fetch weather, suggest. The first
//! failing stage short-circuits and its error is returned unchanged. Each
//! run is independent; nothing is carried between cycles.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherWearConfig;
use crate::error::PipelineError;
use crate::location_resolver::LocationResolver;
use crate::models::{OutfitSuggestion, WeatherMode};
use crate::suggestion::SuggestionEngine;
use crate::weather::WeatherClient;

/// Runs resolve -> fetch -> suggest cycles
pub struct FetchOrchestrator {
    locator: LocationResolver,
    weather: WeatherClient,
    engine: SuggestionEngine,
    mode: WeatherMode,
    cycle_timeout: Option<Duration>,
}

impl FetchOrchestrator {
    /// Assemble from already-built components
    #[must_use]
    pub fn new(
        locator: LocationResolver,
        weather: WeatherClient,
        engine: SuggestionEngine,
        mode: WeatherMode,
    ) -> Self {
        Self {
            locator,
            weather,
            engine,
            mode,
            cycle_timeout: None,
        }
    }

    /// Bound every cycle by an overall deadline
    #[must_use]
    pub fn with_cycle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cycle_timeout = timeout;
        self
    }

    /// Build every component from configuration
    pub fn from_config(config: &WeatherWearConfig) -> Result<Self> {
        let locator = LocationResolver::new(&config.location)?;
        let weather = WeatherClient::new(&config.weather)?;
        let engine = SuggestionEngine::from_config(&config.ai);

        Ok(Self::new(locator, weather, engine, config.weather.mode).with_cycle_timeout(
            config
                .pipeline
                .cycle_timeout_seconds
                .map(Duration::from_secs),
        ))
    }

    #[must_use]
    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    /// Run exactly one cycle
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn run(&self) -> Result<OutfitSuggestion, PipelineError> {
        let start_time = Instant::now();

        let result = match self.cycle_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_stages())
                .await
                .unwrap_or_else(|_| {
                    Err(PipelineError::network(format!(
                        "cycle exceeded its {}s deadline",
                        limit.as_secs()
                    )))
                }),
            None => self.run_stages().await,
        };

        match &result {
            Ok(_) => info!(
                "Cycle completed in {:.3}s",
                start_time.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("Cycle failed: {}", e),
        }
        result
    }

    async fn run_stages(&self) -> Result<OutfitSuggestion, PipelineError> {
        // Mock data needs no position; a missing key fails before any lookup
        let coordinate = match self.mode {
            WeatherMode::Mock => self.locator.fallback().clone(),
            WeatherMode::Live => {
                self.weather.ensure_api_key()?;
                self.locator.resolve().await
            }
        };
        debug!("Using coordinate {}", coordinate.format_coordinates());

        let snapshot = self.weather.fetch(&coordinate, self.mode).await?;
        debug!(
            "Snapshot for {}: {}, {}",
            snapshot.location,
            snapshot.format_temperature(),
            snapshot.description
        );

        self.engine.suggest(snapshot).await
    }
}
