use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::normalize::{normalize_field, normalize_token, TagField};

/// Preferred language assumed when the client leaves it blank
pub const DEFAULT_LANGUAGE: &str = "english";

/// Raw questionnaire answers as submitted by the intake form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeAnswers {
    #[serde(default)]
    pub current_situation: Option<String>,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub specific_concerns: Option<TagField>,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub session_format_preference: Option<String>,
    #[serde(default)]
    pub therapy_type_preference: Option<TagField>,
    #[serde(default)]
    pub communication_style_preference: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub previous_therapy: Option<bool>,
    #[serde(default)]
    pub preferred_gender: Option<String>,
}

/// Canonical client profile the scoring core works on
///
/// Built once per intake submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub current_situation: String,
    pub goals: String,
    pub specific_concerns: Vec<String>,
    pub communication_style_preference: String,
    pub therapy_type_preference: Vec<String>,
    pub preferred_language: String,
    pub budget_range: Option<String>,
    pub previous_therapy: bool,
    pub preferred_gender: Option<String>,
    pub urgency_level: Option<String>,
    pub session_format_preference: Option<String>,
}

impl ClientProfile {
    /// Map raw form answers into the canonical shape
    pub fn from_answers(answers: &IntakeAnswers) -> Self {
        let preferred_language = answers
            .preferred_language
            .as_deref()
            .map(normalize_token)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Self {
            current_situation: trimmed(answers.current_situation.as_deref()),
            goals: trimmed(answers.goals.as_deref()),
            specific_concerns: normalize_field(answers.specific_concerns.as_ref()),
            communication_style_preference: answers
                .communication_style_preference
                .as_deref()
                .map(normalize_token)
                .unwrap_or_default(),
            therapy_type_preference: normalize_field(answers.therapy_type_preference.as_ref()),
            preferred_language,
            budget_range: non_blank(answers.budget_range.as_deref()),
            previous_therapy: answers.previous_therapy.unwrap_or(false),
            preferred_gender: non_blank(answers.preferred_gender.as_deref()),
            urgency_level: non_blank(answers.urgency_level.as_deref()),
            session_format_preference: non_blank(answers.session_format_preference.as_deref()),
        }
    }
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self::from_answers(&IntakeAnswers::default())
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Provider availability as recorded in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    #[serde(untagged)]
    Other(String),
}

impl AvailabilityStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "available" => AvailabilityStatus::Available,
            "unavailable" => AvailabilityStatus::Unavailable,
            other => AvailabilityStatus::Other(other.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityStatus::Available)
    }
}

/// Therapist entry from the read-only provider catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub communication_style: String,
    #[serde(default)]
    pub approach_style: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub therapy_types: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub years_experience: Option<u32>,
    pub availability_status: AvailabilityStatus,
}

/// Which scorer produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Heuristic,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Ai => "ai",
            Source::Heuristic => "heuristic",
        }
    }
}

/// Coarse bucketing of a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const HIGH_THRESHOLD: f64 = 0.70;
    pub const MEDIUM_THRESHOLD: f64 = 0.40;

    /// Derive the tier from a score in [0, 1] (inclusive lower bounds)
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Parse a tier name, returning None for anything outside the three tiers
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "high" => Some(ConfidenceLevel::High),
            "medium" => Some(ConfidenceLevel::Medium),
            "low" => Some(ConfidenceLevel::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// Compatibility of one client with one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub provider_id: Uuid,
    pub match_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub match_reasons: Vec<String>,
    pub explanation: String,
    pub source: Source,
}

/// Communication style category assigned by the intake analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Direct,
    Empathetic,
    Analytical,
    Supportive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProfile {
    pub communication_style: CommunicationStyle,
    #[serde(default)]
    pub approach_preference: String,
    #[serde(default)]
    pub emotional_need: String,
    #[serde(default)]
    pub structure_preference: String,
}

/// Tone scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneScores {
    pub directness: f64,
    pub empathy: f64,
    pub analytical_approach: f64,
    pub supportiveness: f64,
}

impl ToneScores {
    pub fn clamped(self) -> Self {
        Self {
            directness: unit(self.directness),
            empathy: unit(self.empathy),
            analytical_approach: unit(self.analytical_approach),
            supportiveness: unit(self.supportiveness),
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Personality analysis derived from intake answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeAnalysis {
    pub personality_profile: PersonalityProfile,
    pub tone_scores: ToneScores,
    #[serde(default)]
    pub therapy_focus: Vec<String>,
    #[serde(default)]
    pub personality_insights: String,
    #[serde(default)]
    pub matching_criteria: String,
}

/// Opaque identity of the authenticated caller, forwarded to the store for row ownership
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored intake row as read back from the record store
#[derive(Debug, Clone)]
pub struct IntakeRecord {
    pub id: Uuid,
    pub profile: ClientProfile,
    pub analysis: Option<IntakeAnalysis>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A match result together with its persistence outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub match_id: Option<Uuid>,
    pub persisted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_profile_from_answers_defaults() {
        let profile = ClientProfile::from_answers(&IntakeAnswers::default());

        assert_eq!(profile.preferred_language, DEFAULT_LANGUAGE);
        assert!(profile.specific_concerns.is_empty());
        assert!(profile.therapy_type_preference.is_empty());
        assert!(profile.budget_range.is_none());
        assert!(!profile.previous_therapy);
    }

    #[test]
    fn test_client_profile_normalizes_tags() {
        let answers = IntakeAnswers {
            therapy_type_preference: Some(TagField::One("CBT | DBT".to_string())),
            specific_concerns: Some(TagField::Many(vec![" Anxiety ".to_string(), "".to_string()])),
            communication_style_preference: Some(" Gentle ".to_string()),
            preferred_language: Some("Hindi".to_string()),
            ..Default::default()
        };

        let profile = ClientProfile::from_answers(&answers);

        assert_eq!(profile.therapy_type_preference, vec!["cbt", "dbt"]);
        assert_eq!(profile.specific_concerns, vec!["anxiety"]);
        assert_eq!(profile.communication_style_preference, "gentle");
        assert_eq!(profile.preferred_language, "hindi");
    }

    #[test]
    fn test_confidence_thresholds() {
        assert_eq!(ConfidenceLevel::from_score(0.70), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.6999), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.40), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.3999), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::parse(" HIGH "), Some(ConfidenceLevel::High));
        assert_eq!(ConfidenceLevel::parse("certain"), None);
    }

    #[test]
    fn test_availability_parse() {
        assert!(AvailabilityStatus::parse("Available").is_available());
        assert!(!AvailabilityStatus::parse("unavailable").is_available());
        assert_eq!(
            AvailabilityStatus::parse("on leave"),
            AvailabilityStatus::Other("on leave".to_string())
        );
    }

    #[test]
    fn test_tone_scores_clamped() {
        let tones = ToneScores {
            directness: 1.4,
            empathy: -0.2,
            analytical_approach: f64::NAN,
            supportiveness: 0.5,
        }
        .clamped();

        assert_eq!(tones.directness, 1.0);
        assert_eq!(tones.empathy, 0.0);
        assert_eq!(tones.analytical_approach, 0.0);
        assert_eq!(tones.supportiveness, 0.5);
    }
}
