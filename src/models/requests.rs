use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::normalize::TagField;
use crate::models::domain::IntakeAnswers;

/// Request to analyze and store an intake submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeIntakeRequest {
    #[validate(nested)]
    #[serde(alias = "intake_data", rename = "intakeData")]
    pub intake_data: IntakeForm,
}

/// Intake answers with the bounds the form enforces
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub current_situation: Option<String>,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub goals: Option<String>,
    #[validate(custom(function = "validate_tag_field"))]
    #[serde(default)]
    pub specific_concerns: Option<TagField>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub budget_range: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub session_format_preference: Option<String>,
    #[validate(custom(function = "validate_tag_field"))]
    #[serde(default)]
    pub therapy_type_preference: Option<TagField>,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub communication_style_preference: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub previous_therapy: Option<bool>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub preferred_gender: Option<String>,
}

impl From<IntakeForm> for IntakeAnswers {
    fn from(form: IntakeForm) -> Self {
        IntakeAnswers {
            current_situation: form.current_situation,
            goals: form.goals,
            specific_concerns: form.specific_concerns,
            urgency_level: form.urgency_level,
            budget_range: form.budget_range,
            session_format_preference: form.session_format_preference,
            therapy_type_preference: form.therapy_type_preference,
            communication_style_preference: form.communication_style_preference,
            preferred_language: form.preferred_language,
            previous_therapy: form.previous_therapy,
            preferred_gender: form.preferred_gender,
        }
    }
}

const MAX_TAGS: usize = 50;

fn validate_tag_field(field: &TagField) -> Result<(), ValidationError> {
    let too_many = match field {
        TagField::One(raw) => raw.len() > 2000,
        TagField::Many(items) => items.len() > MAX_TAGS || items.iter().any(|t| t.len() > 256),
    };
    if too_many {
        return Err(ValidationError::new("too_many_tags"));
    }
    Ok(())
}

/// Request to generate matches for a stored intake
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "intake_response_id", rename = "intakeResponseId")]
    pub intake_response_id: String,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    /// Score against the built-in sample catalog instead of the stored one
    #[serde(default)]
    pub demo: bool,
}

/// Query for reading stored matches back
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "intake_response_id", rename = "intakeResponseId")]
    pub intake_response_id: String,
}
