//! Data models for the WeatherWear pipeline
//!
//! One fetch cycle allocates one of each and discards them afterwards:
//! - Location: the resolved coordinate
//! - Weather: the normalized snapshot and data source mode
//! - Suggestion: the outfit and umbrella recommendation

pub mod location;
pub mod suggestion;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Coordinate;
pub use suggestion::{OutfitSuggestion, UmbrellaNeed};
pub use weather::{UNKNOWN_LOCATION, WeatherMode, WeatherSnapshot};
