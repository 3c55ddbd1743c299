//! Outfit suggestion model

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Whether an umbrella should be carried.
///
/// Serialized as the two canonical output strings; any other text fails to
/// deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UmbrellaNeed {
    #[serde(rename = "傘が必要")]
    Needed,
    #[serde(rename = "傘は不要")]
    NotNeeded,
}

impl UmbrellaNeed {
    /// All values, in schema order
    pub const ALL: [UmbrellaNeed; 2] = [UmbrellaNeed::Needed, UmbrellaNeed::NotNeeded];

    /// Canonical output string
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Needed => "傘が必要",
            Self::NotNeeded => "傘は不要",
        }
    }
}

impl From<bool> for UmbrellaNeed {
    fn from(needed: bool) -> Self {
        if needed { Self::Needed } else { Self::NotNeeded }
    }
}

impl Display for UmbrellaNeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal artifact of a fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitSuggestion {
    #[serde(rename = "outfit_suggestion")]
    pub outfit_text: String,
    pub umbrella_needed: UmbrellaNeed,
}

impl Display for OutfitSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "服装提案: {}", self.outfit_text)?;
        write!(f, "傘の必要性: {}", self.umbrella_needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umbrella_round_trips_canonical_labels() {
        for need in UmbrellaNeed::ALL {
            let json = serde_json::to_string(&need).unwrap();
            assert_eq!(json, format!("\"{}\"", need.label()));
        }
    }

    #[test]
    fn test_umbrella_rejects_free_text() {
        let result = serde_json::from_str::<UmbrellaNeed>("\"たぶん必要\"");
        assert!(result.is_err());
        let result = serde_json::from_str::<UmbrellaNeed>("\"Needed\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_suggestion_uses_schema_field_names() {
        let suggestion: OutfitSuggestion = serde_json::from_str(
            r#"{"outfit_suggestion": "半袖", "umbrella_needed": "傘は不要"}"#,
        )
        .unwrap();
        assert_eq!(suggestion.outfit_text, "半袖");
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::NotNeeded);
    }

    #[test]
    fn test_display_renders_both_lines() {
        let suggestion = OutfitSuggestion {
            outfit_text: "厚手のコート".to_string(),
            umbrella_needed: UmbrellaNeed::Needed,
        };
        assert_eq!(
            suggestion.to_string(),
            "服装提案: 厚手のコート\n傘の必要性: 傘が必要"
        );
    }
}
