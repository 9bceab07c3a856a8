// OpenAI chat-completions client
//
// Implements both external assessors. What to ask for lives in the prompt
// builders below; validation of the answers lives in the core.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::external::{strip_code_fences, AiError, AiIntakeAnalyst, AiMatchAssessment, AiMatchScorer};
use crate::models::{ClientProfile, IntakeAnalysis, IntakeAnswers, ProviderProfile};
use crate::core::normalize::normalize_field;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

const MATCH_SYSTEM_PROMPT: &str = "You are a therapist matching expert. Output ONLY valid JSON.";
const INTAKE_SYSTEM_PROMPT: &str = "You are a clinical psychologist. Return ONLY valid JSON, no other text.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI client used for match scoring and intake analysis
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    match_model: String,
    intake_model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        endpoint: String,
        match_model: String,
        intake_model: String,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            match_model,
            intake_model,
        })
    }

    /// Send one chat completion and return the content with code fences removed
    async fn complete_json(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens,
            temperature,
        };

        tracing::debug!(model = model, prompt_length = prompt.len(), "Calling OpenAI");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(AiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::EmptyCompletion)?;

        Ok(strip_code_fences(&content).to_string())
    }
}

#[async_trait]
impl AiMatchScorer for OpenAiClient {
    async fn score(
        &self,
        client: &ClientProfile,
        provider: &ProviderProfile,
    ) -> Result<AiMatchAssessment, AiError> {
        let prompt = match_prompt(client, provider)?;
        let content = self
            .complete_json(&self.match_model, MATCH_SYSTEM_PROMPT, &prompt, 500, 0.2)
            .await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl AiIntakeAnalyst for OpenAiClient {
    async fn analyze(&self, answers: &IntakeAnswers) -> Result<IntakeAnalysis, AiError> {
        let prompt = intake_prompt(answers);
        let content = self
            .complete_json(&self.intake_model, INTAKE_SYSTEM_PROMPT, &prompt, 1000, 0.3)
            .await?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn match_prompt(client: &ClientProfile, provider: &ProviderProfile) -> Result<String, AiError> {
    Ok(format!(
        r#"Compare client and therapist compatibility:

CLIENT: {}
THERAPIST: {}

Respond ONLY in JSON:
{{
  "matchScore": 0.0-1.0,
  "confidenceLevel": "high|medium|low",
  "matchReasons": ["reason1", "reason2"],
  "explanation": "short explanation"
}}"#,
        serde_json::to_string(client)?,
        serde_json::to_string(provider)?,
    ))
}

fn intake_prompt(answers: &IntakeAnswers) -> String {
    let or_unspecified = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Not specified")
            .to_string()
    };
    let concerns = normalize_field(answers.specific_concerns.as_ref());
    let therapy_types = normalize_field(answers.therapy_type_preference.as_ref());

    format!(
        r#"Analyze this therapy intake information and provide a JSON assessment:

Current Situation: {}
Goals: {}
Specific Concerns: {}
Communication Style: {}
Therapy Type: {}
Previous Therapy: {}
Urgency: {}

Provide JSON with this structure:
{{
  "personalityProfile": {{
    "communicationStyle": "direct|empathetic|analytical|supportive",
    "approachPreference": "solution-focused|exploratory|cognitive|behavioral",
    "emotionalNeed": "high|medium|low",
    "structurePreference": "structured|flexible|moderate"
  }},
  "toneScores": {{
    "directness": 0.0-1.0,
    "empathy": 0.0-1.0,
    "analyticalApproach": 0.0-1.0,
    "supportiveness": 0.0-1.0
  }},
  "therapyFocus": ["approach1", "approach2"],
  "personalityInsights": "brief analysis",
  "matchingCriteria": "key matching factors"
}}"#,
        or_unspecified(&answers.current_situation),
        or_unspecified(&answers.goals),
        if concerns.is_empty() { "None".to_string() } else { concerns.join(", ") },
        or_unspecified(&answers.communication_style_preference),
        if therapy_types.is_empty() { "Not specified".to_string() } else { therapy_types.join(", ") },
        if answers.previous_therapy.unwrap_or(false) { "Yes" } else { "No" },
        or_unspecified(&answers.urgency_level),
    )
}
