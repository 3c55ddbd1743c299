//! Coordinate model produced by location resolution

use serde::{Deserialize, Serialize};

/// A best-effort current position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display name (city or region); `None` for the fallback position
    pub label: Option<String>,
}

impl Coordinate {
    /// Create an unlabeled coordinate
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    /// Create a coordinate carrying a display label
    #[must_use]
    pub fn with_label(latitude: f64, longitude: f64, label: String) -> Self {
        Self {
            latitude,
            longitude,
            label: Some(label),
        }
    }

    /// Format as a coordinate string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
