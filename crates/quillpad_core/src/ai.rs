//! AI text collaborator boundary.
//!
//! # Responsibility
//! - Define the async contract for rewrite and tag-suggestion requests.
//! - Derive request parameters from an explicit settings snapshot.
//!
//! # Invariants
//! - Requests carry flat text only, never raw block JSON.
//! - Failures are surfaced to the user; nothing here retries.

use crate::settings::{AiModel, Language, Settings};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Parameters sent with every AI request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequestConfig {
    pub model: AiModel,
    pub language: Language,
    pub api_key: Option<String>,
}

impl AiRequestConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.ai_model,
            language: settings.language,
            api_key: settings
                .api_key
                .as_ref()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    MissingApiKey,
    /// The note has no text to send.
    EmptyInput,
    Service(String),
    InvalidResponse(String),
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "no AI API key is configured"),
            Self::EmptyInput => write!(f, "the note has no text to send"),
            Self::Service(message) => write!(f, "AI service error: {message}"),
            Self::InvalidResponse(message) => write!(f, "unexpected AI response: {message}"),
        }
    }
}

impl Error for AiError {}

/// Text service consumed by the editing session.
#[async_trait]
pub trait AiTextService: Send + Sync {
    /// Replacement text for `text`.
    async fn rewrite(&self, text: &str, config: &AiRequestConfig) -> Result<String, AiError>;
    /// Suggested tags for `text`, most relevant first.
    async fn suggest_tags(
        &self,
        text: &str,
        config: &AiRequestConfig,
    ) -> Result<Vec<String>, AiError>;
}

/// Rejects requests that cannot succeed before they reach the service.
pub fn check_request(text: &str, config: &AiRequestConfig) -> Result<(), AiError> {
    if config.api_key.is_none() {
        return Err(AiError::MissingApiKey);
    }
    if text.trim().is_empty() {
        return Err(AiError::EmptyInput);
    }
    Ok(())
}
