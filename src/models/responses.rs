use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{IntakeAnalysis, Source, StoredMatch};

/// Response for the intake analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeIntakeResponse {
    pub success: bool,
    pub intake_response_id: Uuid,
    pub analysis: IntakeAnalysis,
    pub source: Source,
}

/// Response for the match generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMatchesResponse {
    pub success: bool,
    pub matches: Vec<StoredMatch>,
    pub total_therapists_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ai_enabled: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
