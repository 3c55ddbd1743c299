//! Error types for the suggestion pipeline
//!
//! Every stage returns a [`PipelineError`] instead of panicking; the
//! orchestrator forwards the first one unchanged to the boundary.

use thiserror::Error;

/// Upper bound on the length of any message shown to the user.
const MAX_DISPLAY_CHARS: usize = 500;

/// Failure of one stage of a fetch cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A required credential is absent
    #[error("Configuration missing: {message}")]
    ConfigMissing { message: String },

    /// Transport failure, timeout or non-2xx reply
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    /// Provider payload is missing the expected shape
    #[error("Invalid data format: {message}")]
    DataFormatInvalid { message: String },

    /// The AI call, text extraction or schema parse failed
    #[error("AI service failure: {message}")]
    AiServiceFailure { message: String },
}

impl PipelineError {
    /// Create a new missing-configuration error
    pub fn config_missing<S: AsRef<str>>(message: S) -> Self {
        Self::ConfigMissing {
            message: displayable_text(message.as_ref()),
        }
    }

    /// Create a new network error
    pub fn network<S: AsRef<str>>(message: S) -> Self {
        Self::NetworkFailure {
            message: displayable_text(message.as_ref()),
        }
    }

    /// Create a new data format error
    pub fn data_format<S: AsRef<str>>(message: S) -> Self {
        Self::DataFormatInvalid {
            message: displayable_text(message.as_ref()),
        }
    }

    /// Create a new AI service error
    pub fn ai_service<S: AsRef<str>>(message: S) -> Self {
        Self::AiServiceFailure {
            message: displayable_text(message.as_ref()),
        }
    }

    /// Create an AI service error from raw bytes of unknown encoding
    #[must_use]
    pub fn ai_service_bytes(raw: &[u8]) -> Self {
        Self::AiServiceFailure {
            message: displayable_bytes(raw),
        }
    }

    /// The normalized cause text carried by this error
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            PipelineError::ConfigMissing { message }
            | PipelineError::NetworkFailure { message }
            | PipelineError::DataFormatInvalid { message }
            | PipelineError::AiServiceFailure { message } => message,
        }
    }

    /// Get the message rendered by the boundary
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::ConfigMissing { .. } => {
                "OpenWeatherMap の API キーが設定されていません".to_string()
            }
            PipelineError::NetworkFailure { message } => {
                format!("天気 API のリクエストに失敗しました: {message}")
            }
            PipelineError::DataFormatInvalid { message } => {
                format!("天気 API のデータ形式が不正です ({message})")
            }
            PipelineError::AiServiceFailure { message } => {
                format!("Gemini API 呼び出しまたは解析でエラーが発生しました: {message}")
            }
        }
    }
}

/// Normalize externally sourced text so it is always safe to display.
///
/// Control characters other than newline and tab are dropped, surrounding
/// whitespace is trimmed and the result is capped at a fixed length.
#[must_use]
pub fn displayable_text(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.chars().count() > MAX_DISPLAY_CHARS {
        let mut truncated: String = trimmed.chars().take(MAX_DISPLAY_CHARS).collect();
        truncated.push('…');
        truncated
    } else {
        trimmed.to_string()
    }
}

/// Decode bytes lossily and normalize them with [`displayable_text`]
#[must_use]
pub fn displayable_bytes(raw: &[u8]) -> String {
    displayable_text(&String::from_utf8_lossy(raw))
}

/// Render an HTTP client error without the request URL.
///
/// Query strings may carry API keys, so the URL never reaches a message.
#[must_use]
pub fn describe_http_error(err: reqwest::Error) -> String {
    let timed_out = err.is_timeout();
    let text = err.without_url().to_string();
    if timed_out && !text.contains("timed out") {
        format!("request timed out ({text})")
    } else {
        text
    }
}
