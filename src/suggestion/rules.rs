//! Deterministic rule-based strategy

use crate::models::{OutfitSuggestion, UmbrellaNeed, WeatherSnapshot};

/// Case-insensitive tokens in a description that indicate rain
const RAIN_TOKENS: &[&str] = &["rain", "drizzle", "雨"];

/// Clothing tier selected by current temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutfitTier {
    /// Below 5°C
    HeavyCoat,
    /// 5°C up to 12°C
    Jacket,
    /// 12°C up to 20°C
    LightLayer,
    /// 20°C and above
    ShortSleeve,
}

impl OutfitTier {
    /// Select the tier; boundaries belong to the warmer tier
    #[must_use]
    pub fn from_temperature(celsius: f64) -> Self {
        if celsius < 5.0 {
            Self::HeavyCoat
        } else if celsius < 12.0 {
            Self::Jacket
        } else if celsius < 20.0 {
            Self::LightLayer
        } else {
            Self::ShortSleeve
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::HeavyCoat => "厚手のコート、マフラー、手袋",
            Self::Jacket => "ジャケットやセーター、長ズボン",
            Self::LightLayer => "薄手の長袖または羽織り、長ズボン",
            Self::ShortSleeve => "半袖Tシャツ、軽い羽織りがあれば可",
        }
    }
}

/// True when the description mentions rain in either language
#[must_use]
pub fn mentions_rain(description: &str) -> bool {
    let lowered = description.to_lowercase();
    RAIN_TOKENS.iter().any(|token| lowered.contains(token))
}

/// Umbrella rule: any rain proxy or a rain token in the description
#[must_use]
pub fn umbrella_for(snapshot: &WeatherSnapshot) -> UmbrellaNeed {
    UmbrellaNeed::from(snapshot.rain_prob > 0.0 || mentions_rain(&snapshot.description))
}

/// Build a suggestion without any I/O
#[must_use]
pub fn suggest(snapshot: &WeatherSnapshot) -> OutfitSuggestion {
    OutfitSuggestion {
        outfit_text: OutfitTier::from_temperature(snapshot.temp_current)
            .text()
            .to_string(),
        umbrella_needed: umbrella_for(snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn snapshot(temp: f64, rain_prob: f64, description: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            location: "Test".to_string(),
            temp_current: temp,
            temp_max: temp + 2.0,
            temp_min: temp - 2.0,
            humidity: 50,
            description: description.to_string(),
            rain_prob,
        }
    }

    #[rstest]
    #[case(-30.0, OutfitTier::HeavyCoat)]
    #[case(4.999, OutfitTier::HeavyCoat)]
    #[case(5.0, OutfitTier::Jacket)]
    #[case(11.99, OutfitTier::Jacket)]
    #[case(12.0, OutfitTier::LightLayer)]
    #[case(19.999, OutfitTier::LightLayer)]
    #[case(20.0, OutfitTier::ShortSleeve)]
    #[case(38.5, OutfitTier::ShortSleeve)]
    fn test_tier_boundaries(#[case] temp: f64, #[case] expected: OutfitTier) {
        assert_eq!(OutfitTier::from_temperature(temp), expected);
    }

    #[rstest]
    #[case(0.0, "clear sky", UmbrellaNeed::NotNeeded)]
    #[case(0.1, "clear sky", UmbrellaNeed::Needed)]
    #[case(0.0, "light rain", UmbrellaNeed::Needed)]
    #[case(0.0, "Heavy Intensity RAIN", UmbrellaNeed::Needed)]
    #[case(0.0, "light intensity drizzle", UmbrellaNeed::Needed)]
    #[case(0.0, "小雨", UmbrellaNeed::Needed)]
    #[case(0.0, "晴れ", UmbrellaNeed::NotNeeded)]
    #[case(0.0, "overcast clouds", UmbrellaNeed::NotNeeded)]
    fn test_umbrella_rule(
        #[case] rain_prob: f64,
        #[case] description: &str,
        #[case] expected: UmbrellaNeed,
    ) {
        assert_eq!(umbrella_for(&snapshot(15.0, rain_prob, description)), expected);
    }

    #[test]
    fn test_cold_clear_day() {
        let suggestion = suggest(&snapshot(3.0, 0.0, "clear"));
        assert_eq!(suggestion.outfit_text, "厚手のコート、マフラー、手袋");
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::NotNeeded);
    }

    #[test]
    fn test_mild_rainy_day() {
        let suggestion = suggest(&snapshot(15.0, 5.0, "light rain"));
        assert_eq!(suggestion.outfit_text, "薄手の長袖または羽織り、長ズボン");
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::Needed);
    }

    #[test]
    fn test_mock_snapshot_is_short_sleeves() {
        let suggestion = suggest(&WeatherSnapshot::mock());
        assert_eq!(suggestion.outfit_text, OutfitTier::ShortSleeve.text());
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::NotNeeded);
    }
}
