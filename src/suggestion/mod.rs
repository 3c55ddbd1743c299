//! Suggestion engine
//!
//! Turns a [`WeatherSnapshot`] into an [`OutfitSuggestion`]. The strategy is
//! fixed when the engine is built:
//! - AI-backed, when a generative client could be configured
//! - Rule-based otherwise, without raising any error
//!
//! A failing AI call is reported as `AiServiceFailure`; it does not fall
//! back to the rule-based output.

pub mod generative;
pub mod rules;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::AiConfig;
use crate::error::PipelineError;
use crate::gemini::{GeminiClient, GenerativeClient};
use crate::models::{OutfitSuggestion, WeatherSnapshot};

pub use rules::OutfitTier;

/// Suggestion generation algorithm
#[derive(Clone)]
pub enum Strategy {
    RuleBased,
    Generative(Arc<dyn GenerativeClient>),
}

impl Strategy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RuleBased => "rule-based",
            Strategy::Generative(_) => "generative",
        }
    }
}

/// Service producing outfit suggestions
pub struct SuggestionEngine {
    strategy: Strategy,
}

impl SuggestionEngine {
    /// Build with an optional AI client; `None` selects the rule-based strategy
    #[must_use]
    pub fn new(ai_client: Option<Arc<dyn GenerativeClient>>) -> Self {
        let strategy = ai_client.map_or(Strategy::RuleBased, Strategy::Generative);
        info!("Suggestion strategy: {}", strategy.name());
        Self { strategy }
    }

    /// Build from configuration, degrading to rules when the AI client is unusable
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        if config.api_key.is_none() {
            info!("No Gemini API key configured, AI suggestions disabled");
            return Self::new(None);
        }

        match GeminiClient::new(config) {
            Ok(client) => Self::new(Some(Arc::new(client))),
            Err(e) => {
                warn!("Gemini client initialization failed: {:#}", e);
                Self::new(None)
            }
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Produce a suggestion for the snapshot
    #[instrument(skip(self, snapshot), fields(strategy = self.strategy.name()))]
    pub async fn suggest(
        &self,
        snapshot: WeatherSnapshot,
    ) -> Result<OutfitSuggestion, PipelineError> {
        match &self.strategy {
            Strategy::RuleBased => Ok(rules::suggest(&snapshot)),
            Strategy::Generative(client) => generative::suggest(client.as_ref(), &snapshot).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{GenerationRequest, RawText, ResponseContent};
    use crate::models::UmbrellaNeed;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct CannedClient(Result<ResponseContent, String>);

    #[async_trait]
    impl GenerativeClient for CannedClient {
        async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<ResponseContent> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    fn engine_with(reply: Result<ResponseContent, String>) -> SuggestionEngine {
        SuggestionEngine::new(Some(Arc::new(CannedClient(reply))))
    }

    fn rainy_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: "Osaka".to_string(),
            temp_current: 15.0,
            temp_max: 17.0,
            temp_min: 12.0,
            humidity: 80,
            description: "light rain".to_string(),
            rain_prob: 5.0,
        }
    }

    #[test]
    fn test_missing_key_selects_rules() {
        let engine = SuggestionEngine::from_config(&AiConfig::default());
        assert!(matches!(engine.strategy(), Strategy::RuleBased));
    }

    #[test]
    fn test_configured_key_selects_generative() {
        let config = AiConfig {
            api_key: Some("key".to_string()),
            ..AiConfig::default()
        };
        let engine = SuggestionEngine::from_config(&config);
        assert_eq!(engine.strategy().name(), "generative");
    }

    #[tokio::test]
    async fn test_rule_based_end_to_end() {
        let engine = SuggestionEngine::new(None);
        let suggestion = engine.suggest(rainy_snapshot()).await.unwrap();
        assert_eq!(suggestion.outfit_text, OutfitTier::LightLayer.text());
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::Needed);
    }

    #[tokio::test]
    async fn test_generative_reply_is_parsed() {
        let engine = engine_with(Ok(ResponseContent::PlainText(
            r#"{"outfit_suggestion": "レインコート", "umbrella_needed": "傘が必要"}"#.to_string(),
        )));
        let suggestion = engine.suggest(rainy_snapshot()).await.unwrap();
        assert_eq!(suggestion.outfit_text, "レインコート");
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::Needed);
    }

    #[tokio::test]
    async fn test_generative_candidate_bytes_are_parsed() {
        let engine = engine_with(Ok(ResponseContent::Candidates(vec![RawText::Bytes(
            r#"{"outfit_suggestion": "半袖", "umbrella_needed": "傘は不要"}"#.as_bytes().to_vec(),
        )])));
        let suggestion = engine.suggest(WeatherSnapshot::mock()).await.unwrap();
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::NotNeeded);
    }

    #[tokio::test]
    async fn test_call_failure_is_reported_not_downgraded() {
        let engine = engine_with(Err("connection reset\u{0}".to_string()));
        let result = engine.suggest(rainy_snapshot()).await;
        match result {
            Err(PipelineError::AiServiceFailure { message }) => {
                assert_eq!(message, "connection reset");
            }
            other => panic!("expected AiServiceFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_off_enum_reply_is_failure() {
        let engine = engine_with(Ok(ResponseContent::PlainText(
            r#"{"outfit_suggestion": "半袖", "umbrella_needed": "maybe"}"#.to_string(),
        )));
        let result = engine.suggest(WeatherSnapshot::mock()).await;
        assert!(matches!(result, Err(PipelineError::AiServiceFailure { .. })));
    }
}
