//! `WeatherWear` - Daily outfit and umbrella suggestions
//!
//! This library resolves the device position, fetches current weather and
//! turns it into a clothing suggestion, either through fixed temperature
//! rules or a generative model.

pub mod config;
pub mod error;
pub mod gemini;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod scheduler;
pub mod suggestion;
pub mod weather;

// Re-export core types for public API
pub use config::WeatherWearConfig;
pub use error::PipelineError;
pub use gemini::{GeminiClient, GenerationRequest, GenerativeClient, RawText, ResponseContent};
pub use location_resolver::LocationResolver;
pub use models::{Coordinate, OutfitSuggestion, UmbrellaNeed, WeatherMode, WeatherSnapshot};
pub use orchestrator::FetchOrchestrator;
pub use scheduler::{CycleHandle, CycleScheduler};
pub use suggestion::{Strategy, SuggestionEngine};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PipelineError>;
