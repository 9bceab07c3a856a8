//! Optional external (AI) assessors the core can consult.
//!
//! Both traits are infrastructure seams: implementations live in
//! `services::openai`, tests provide their own. Absence of an assessor is
//! expressed as `None` by the caller, never as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::core::scoring::clamp_score;
use crate::models::{ClientProfile, ConfidenceLevel, IntakeAnalysis, IntakeAnswers, MatchResult, ProviderProfile, Source};

pub const AI_EXPLANATION: &str = "AI-based compatibility assessment";

/// Errors from an external assessment attempt
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Empty completion")]
    EmptyCompletion,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::MalformedPayload(e.to_string())
    }
}

/// Scores one client/provider pair
#[async_trait]
pub trait AiMatchScorer: Send + Sync {
    async fn score(
        &self,
        client: &ClientProfile,
        provider: &ProviderProfile,
    ) -> Result<AiMatchAssessment, AiError>;
}

/// Turns raw intake answers into a personality analysis
#[async_trait]
pub trait AiIntakeAnalyst: Send + Sync {
    async fn analyze(&self, answers: &IntakeAnswers) -> Result<IntakeAnalysis, AiError>;
}

/// Match assessment as returned by the model, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMatchAssessment {
    pub match_score: Value,
    #[serde(default)]
    pub confidence_level: Option<String>,
    #[serde(default)]
    pub match_reasons: Option<Value>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl AiMatchAssessment {
    /// Validate and coerce into a `MatchResult`
    ///
    /// - the score must be a number or numeric string and is clamped to [0, 1]
    /// - an unknown confidence level is derived from the score
    /// - reasons keep only strings; a bare string becomes a one-element list
    pub fn into_match_result(self, provider_id: Uuid) -> Result<MatchResult, AiError> {
        let raw_score = match &self.match_score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| AiError::MalformedPayload(format!("matchScore: {}", self.match_score)))?;

        let score = clamp_score(raw_score);
        let confidence_level = self
            .confidence_level
            .as_deref()
            .and_then(ConfidenceLevel::parse)
            .unwrap_or_else(|| ConfidenceLevel::from_score(score));

        let match_reasons = match self.match_reasons {
            Some(Value::String(reason)) => vec![reason],
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let explanation = self
            .explanation
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| AI_EXPLANATION.to_string());

        Ok(MatchResult {
            provider_id,
            match_score: score,
            confidence_level,
            match_reasons,
            explanation,
            source: Source::Ai,
        })
    }
}

/// Strip Markdown code fences models like to wrap JSON in
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
