use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::core::normalize::{normalize_tags, normalize_token, tokens_overlap};
use crate::models::{ClientProfile, ConfidenceLevel, MatchResult, ProviderProfile, Source};
use crate::models::domain::DEFAULT_LANGUAGE;

pub const COMMUNICATION_WEIGHT: f64 = 0.25;
pub const THERAPY_TYPE_WEIGHT_PER_OVERLAP: f64 = 0.10;
pub const THERAPY_TYPE_WEIGHT_CAP: f64 = 0.30;
pub const LANGUAGE_WEIGHT: f64 = 0.15;
pub const BUDGET_WITHIN_WEIGHT: f64 = 0.20;
pub const BUDGET_NEAR_WEIGHT: f64 = 0.10;
pub const EXPERIENCE_WEIGHT: f64 = 0.10;

/// How far above the client's budget ceiling a rate still counts as "near"
pub const BUDGET_TOLERANCE: f64 = 20.0;
pub const EXPERIENCED_YEARS: u32 = 5;

/// Score used when no factor could be evaluated at all
pub const BASELINE_SCORE: f64 = 0.3;
pub const BASELINE_REASON: &str = "Basic compatibility";

pub const HEURISTIC_EXPLANATION: &str =
    "Heuristic-based compatibility from communication style, therapy approach, language, budget and experience";

static BUDGET_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?(\d+)\s*-\s*\$?(\d+)").expect("budget pattern is valid")
});

/// Reasons a single factor could not be evaluated
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Unreadable budget bound: {0}")]
    BudgetBound(String),

    #[error("Hourly rate is not a finite number: {0}")]
    InvalidRate(f64),
}

/// Outcome of one triggered factor
#[derive(Debug, Clone, PartialEq)]
struct Contribution {
    weight: f64,
    reason: String,
}

impl Contribution {
    fn new(weight: f64, reason: impl Into<String>) -> Self {
        Self {
            weight,
            reason: reason.into(),
        }
    }
}

type FactorOutcome = Result<Option<Contribution>, ScoringError>;

/// Calculate a heuristic match result for one client/provider pair
///
/// Factors, in evaluation order:
/// ```text
/// communication style   +0.25
/// therapy type overlap  +min(0.30, 0.10 * overlap)
/// language              +0.15
/// budget                +0.20 within range, +0.10 near it
/// experience            +0.10 for 5+ years
/// ```
/// A factor that fails to evaluate contributes nothing. If all of them
/// fail the baseline result is returned. This function never fails.
pub fn calculate_match_score(client: &ClientProfile, provider: &ProviderProfile) -> MatchResult {
    let outcomes: [FactorOutcome; 5] = [
        communication_factor(client, provider),
        therapy_type_factor(client, provider),
        language_factor(client, provider),
        budget_factor(client, provider),
        experience_factor(provider),
    ];

    let factor_count = outcomes.len();
    let mut total = 0.0;
    let mut reasons = Vec::new();
    let mut failures = 0;

    for outcome in outcomes {
        match outcome {
            Ok(Some(contribution)) => {
                total += contribution.weight;
                reasons.push(contribution.reason);
            }
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                tracing::debug!("Skipping factor for provider {}: {}", provider.id, e);
            }
        }
    }

    if failures == factor_count {
        return baseline_result(provider.id);
    }

    let score = clamp_score(round_score(total));

    MatchResult {
        provider_id: provider.id,
        match_score: score,
        confidence_level: ConfidenceLevel::from_score(score),
        match_reasons: reasons,
        explanation: HEURISTIC_EXPLANATION.to_string(),
        source: Source::Heuristic,
    }
}

/// The result of last resort
pub fn baseline_result(provider_id: Uuid) -> MatchResult {
    MatchResult {
        provider_id,
        match_score: BASELINE_SCORE,
        confidence_level: ConfidenceLevel::Low,
        match_reasons: vec![BASELINE_REASON.to_string()],
        explanation: HEURISTIC_EXPLANATION.to_string(),
        source: Source::Heuristic,
    }
}

/// Drop float accumulation noise so tier thresholds compare exactly
#[inline]
fn round_score(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 1_000_000.0
}

/// Clamp into [0, 1]; NaN becomes 0
#[inline]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

fn communication_factor(client: &ClientProfile, provider: &ProviderProfile) -> FactorOutcome {
    let wanted = normalize_token(&client.communication_style_preference);
    let offered = normalize_token(&provider.communication_style);

    Ok(tokens_overlap(&wanted, &offered)
        .then(|| Contribution::new(COMMUNICATION_WEIGHT, "Communication style match")))
}

fn therapy_type_factor(client: &ClientProfile, provider: &ProviderProfile) -> FactorOutcome {
    let wanted = normalize_tags(&client.therapy_type_preference);
    let offered = normalize_tags(&provider.therapy_types);

    let overlap = offered
        .iter()
        .filter(|t| wanted.iter().any(|w| tokens_overlap(t, w)))
        .count();

    if overlap == 0 {
        return Ok(None);
    }

    let weight = (THERAPY_TYPE_WEIGHT_PER_OVERLAP * overlap as f64).min(THERAPY_TYPE_WEIGHT_CAP);
    Ok(Some(Contribution::new(
        weight,
        format!("Shared therapy approaches: {}", overlap),
    )))
}

fn language_factor(client: &ClientProfile, provider: &ProviderProfile) -> FactorOutcome {
    let mut wanted = normalize_token(&client.preferred_language);
    if wanted.is_empty() {
        wanted = DEFAULT_LANGUAGE.to_string();
    }

    let spoken = normalize_tags(&provider.languages);
    Ok(spoken
        .iter()
        .any(|lang| tokens_overlap(lang, &wanted))
        .then(|| Contribution::new(LANGUAGE_WEIGHT, "Language compatibility")))
}

fn budget_factor(client: &ClientProfile, provider: &ProviderProfile) -> FactorOutcome {
    let rate = provider.hourly_rate.unwrap_or(0.0);
    if !rate.is_finite() {
        return Err(ScoringError::InvalidRate(rate));
    }

    let Some((low, high)) = parse_budget_range(client.budget_range.as_deref().unwrap_or(""))? else {
        return Ok(None);
    };
    if rate <= 0.0 {
        return Ok(None);
    }

    if rate >= low && rate <= high {
        Ok(Some(Contribution::new(BUDGET_WITHIN_WEIGHT, "Within budget range")))
    } else if rate <= high + BUDGET_TOLERANCE {
        Ok(Some(Contribution::new(BUDGET_NEAR_WEIGHT, "Near budget range")))
    } else {
        Ok(None)
    }
}

fn experience_factor(provider: &ProviderProfile) -> FactorOutcome {
    Ok((provider.years_experience.unwrap_or(0) >= EXPERIENCED_YEARS)
        .then(|| Contribution::new(EXPERIENCE_WEIGHT, "Experienced therapist")))
}

/// Parse a `"<low>-<high>"` budget, tolerating `$` signs and spaces
///
/// Returns `Ok(None)` when the text holds no range at all.
pub fn parse_budget_range(raw: &str) -> Result<Option<(f64, f64)>, ScoringError> {
    let Some(caps) = BUDGET_RANGE.captures(raw) else {
        return Ok(None);
    };

    let bound = |idx: usize| -> Result<f64, ScoringError> {
        let text = &caps[idx];
        text.parse::<u64>()
            .map(|v| v as f64)
            .map_err(|_| ScoringError::BudgetBound(text.to_string()))
    };

    Ok(Some((bound(1)?, bound(2)?)))
}
