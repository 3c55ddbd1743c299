//! AI-backed strategy: prompt, response schema, extraction and parsing

use serde_json::{Value, json};

use crate::error::PipelineError;
use crate::gemini::{GenerationRequest, GenerativeClient, ResponseContent};
use crate::models::{OutfitSuggestion, UmbrellaNeed, WeatherSnapshot};

const SYSTEM_INSTRUCTION: &str = "あなたはプロの天気スタイリストです。提供された天気データに基づき、\
最も簡潔で実用的な方法で今日の服装と傘の要否を提案してください。\
出力は必ず指定の JSON 形式に厳密に従い、余計な説明や注釈を一切加えないでください。";

/// Declarative schema: two required strings, the umbrella one enum-constrained
#[must_use]
pub fn response_schema() -> Value {
    let umbrella_values: Vec<&str> = UmbrellaNeed::ALL.iter().map(|u| u.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "outfit_suggestion": {
                "type": "STRING",
                "description": "簡潔な服装の提案"
            },
            "umbrella_needed": {
                "type": "STRING",
                "enum": umbrella_values,
                "description": "傘が必要かどうか"
            }
        },
        "required": ["outfit_suggestion", "umbrella_needed"]
    })
}

/// Natural-language prompt embedding every snapshot field
#[must_use]
pub fn build_prompt(snapshot: &WeatherSnapshot) -> String {
    format!(
        "今日の天気データ：\n\
         - 場所：{}\n\
         - 現在の気温：{:.1} ℃\n\
         - 最高気温：{:.1} ℃\n\
         - 最低気温：{:.1} ℃\n\
         - 湿度：{}%\n\
         - 天気概要：{}\n\
         - 降水指標：{:.1}\n",
        snapshot.location,
        snapshot.temp_current,
        snapshot.temp_max,
        snapshot.temp_min,
        snapshot.humidity,
        snapshot.description,
        snapshot.rain_prob,
    )
}

#[must_use]
pub fn build_request(snapshot: &WeatherSnapshot) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: build_prompt(snapshot),
        response_schema: response_schema(),
    }
}

/// Pick the reply text: direct text first, else the first non-empty candidate
pub fn extract_text(content: ResponseContent) -> Result<String, PipelineError> {
    let text = match content {
        ResponseContent::PlainText(text) if !text.trim().is_empty() => Some(text),
        ResponseContent::PlainText(_) => None,
        ResponseContent::Candidates(candidates) => candidates
            .into_iter()
            .map(|raw| raw.into_text())
            .find(|text| !text.trim().is_empty()),
    };

    text.ok_or_else(|| PipelineError::ai_service("AI response contained no text"))
}

/// Parse the text as the structured schema; off-enum umbrella values are rejected
pub fn parse_suggestion(text: &str) -> Result<OutfitSuggestion, PipelineError> {
    serde_json::from_str::<OutfitSuggestion>(text.trim())
        .map_err(|e| PipelineError::ai_service(format!("response did not match schema: {e}")))
}

/// Run one AI-backed suggestion; every failure becomes `AiServiceFailure`
pub async fn suggest(
    client: &dyn GenerativeClient,
    snapshot: &WeatherSnapshot,
) -> Result<OutfitSuggestion, PipelineError> {
    let request = build_request(snapshot);
    let content = client
        .generate(&request)
        .await
        .map_err(|e| PipelineError::ai_service(format!("{e:#}")))?;
    let text = extract_text(content)?;
    parse_suggestion(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::RawText;

    #[test]
    fn test_prompt_formats_one_decimal() {
        let prompt = build_prompt(&WeatherSnapshot::mock());
        assert!(prompt.contains("場所：テスト市"));
        assert!(prompt.contains("現在の気温：22.5 ℃"));
        assert!(prompt.contains("最高気温：24.0 ℃"));
        assert!(prompt.contains("最低気温：20.0 ℃"));
        assert!(prompt.contains("湿度：60%"));
        assert!(prompt.contains("天気概要：晴れ"));
        assert!(prompt.contains("降水指標：0.0"));
    }

    #[test]
    fn test_schema_requires_both_fields_and_enum() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["outfit_suggestion", "umbrella_needed"]));
        assert_eq!(schema["properties"]["outfit_suggestion"]["type"], "STRING");
        assert_eq!(
            schema["properties"]["umbrella_needed"]["enum"],
            json!(["傘が必要", "傘は不要"])
        );
        assert_eq!(schema["properties"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_prefers_plain_text() {
        let text = extract_text(ResponseContent::PlainText("{}".to_string())).unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn test_extract_falls_back_to_candidates() {
        let content = ResponseContent::Candidates(vec![
            RawText::Utf8("  ".to_string()),
            RawText::Bytes(b"{\"k\":1}".to_vec()),
        ]);
        assert_eq!(extract_text(content).unwrap(), "{\"k\":1}");

        let blank = ResponseContent::PlainText(String::new());
        assert!(matches!(
            extract_text(blank),
            Err(PipelineError::AiServiceFailure { .. })
        ));
        assert!(extract_text(ResponseContent::Candidates(vec![])).is_err());
    }

    #[test]
    fn test_parse_valid_reply() {
        let suggestion =
            parse_suggestion(r#" {"outfit_suggestion": "薄手のニット", "umbrella_needed": "傘が必要"} "#)
                .unwrap();
        assert_eq!(suggestion.outfit_text, "薄手のニット");
        assert_eq!(suggestion.umbrella_needed, UmbrellaNeed::Needed);
    }

    #[test]
    fn test_parse_rejects_off_enum_umbrella() {
        let result = parse_suggestion(r#"{"outfit_suggestion": "半袖", "umbrella_needed": "念のため"}"#);
        assert!(matches!(result, Err(PipelineError::AiServiceFailure { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_field_and_non_json() {
        assert!(parse_suggestion(r#"{"outfit_suggestion": "半袖"}"#).is_err());
        assert!(parse_suggestion("sure! here is your outfit").is_err());
    }
}
