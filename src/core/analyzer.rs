use std::sync::Arc;

use crate::core::external::AiIntakeAnalyst;
use crate::core::fallback::{with_fallback, Scored};
use crate::core::normalize::{normalize_field, normalize_token};
use crate::models::{CommunicationStyle, IntakeAnalysis, IntakeAnswers, PersonalityProfile, ToneScores};

/// How many concerns are carried into the therapy focus
pub const THERAPY_FOCUS_LIMIT: usize = 5;

pub const HEURISTIC_INSIGHTS: &str =
    "Heuristic-based analysis generated without an AI model; treat these insights as approximate.";
pub const HEURISTIC_CRITERIA: &str =
    "Heuristic matching on communication style, therapy approach, language and budget preferences.";

/// Intake analysis with an optional AI analyst and a heuristic fallback
#[derive(Clone, Default)]
pub struct IntakeAnalyzer {
    ai: Option<Arc<dyn AiIntakeAnalyst>>,
}

impl IntakeAnalyzer {
    pub fn new(ai: Option<Arc<dyn AiIntakeAnalyst>>) -> Self {
        Self { ai }
    }

    pub fn heuristic_only() -> Self {
        Self { ai: None }
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Analyze intake answers; never fails
    pub async fn analyze(&self, answers: &IntakeAnswers) -> Scored<IntakeAnalysis> {
        let attempt = self.ai.as_ref().map(|ai| async move {
            ai.analyze(answers).await.map(|mut analysis| {
                analysis.tone_scores = analysis.tone_scores.clamped();
                analysis
            })
        });

        with_fallback(attempt, || heuristic_analysis(answers), "intake").await
    }
}

/// Map a communication preference onto a style category
pub fn classify_communication(preference: &str) -> CommunicationStyle {
    let preference = normalize_token(preference);
    if preference.contains("gentle") {
        CommunicationStyle::Empathetic
    } else if preference.contains("collaborative") {
        CommunicationStyle::Supportive
    } else if preference.contains("challenging") {
        CommunicationStyle::Direct
    } else {
        CommunicationStyle::Analytical
    }
}

pub fn tone_scores_for(style: CommunicationStyle) -> ToneScores {
    ToneScores {
        directness: if style == CommunicationStyle::Direct { 0.7 } else { 0.4 },
        empathy: if style == CommunicationStyle::Empathetic { 0.8 } else { 0.5 },
        analytical_approach: 0.6,
        supportiveness: if style == CommunicationStyle::Supportive { 0.75 } else { 0.5 },
    }
}

/// Rule-based intake analysis
pub fn heuristic_analysis(answers: &IntakeAnswers) -> IntakeAnalysis {
    let style = classify_communication(answers.communication_style_preference.as_deref().unwrap_or(""));

    let mut therapy_focus = normalize_field(answers.specific_concerns.as_ref());
    therapy_focus.truncate(THERAPY_FOCUS_LIMIT);

    IntakeAnalysis {
        personality_profile: PersonalityProfile {
            communication_style: style,
            approach_preference: "solution-focused".to_string(),
            emotional_need: "medium".to_string(),
            structure_preference: "moderate".to_string(),
        },
        tone_scores: tone_scores_for(style),
        therapy_focus,
        personality_insights: HEURISTIC_INSIGHTS.to_string(),
        matching_criteria: HEURISTIC_CRITERIA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::external::AiError;
    use crate::core::normalize::TagField;
    use crate::models::Source;
    use async_trait::async_trait;

    struct FailingAnalyst;

    #[async_trait]
    impl AiIntakeAnalyst for FailingAnalyst {
        async fn analyze(&self, _answers: &IntakeAnswers) -> Result<IntakeAnalysis, AiError> {
            Err(AiError::EmptyCompletion)
        }
    }

    struct LoudAnalyst;

    #[async_trait]
    impl AiIntakeAnalyst for LoudAnalyst {
        async fn analyze(&self, answers: &IntakeAnswers) -> Result<IntakeAnalysis, AiError> {
            let mut analysis = heuristic_analysis(answers);
            analysis.tone_scores.empathy = 3.0;
            analysis.personality_insights = "from the model".to_string();
            Ok(analysis)
        }
    }

    fn answers(style: &str) -> IntakeAnswers {
        IntakeAnswers {
            communication_style_preference: Some(style.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_style_mapping() {
        assert_eq!(classify_communication("Gentle and warm"), CommunicationStyle::Empathetic);
        assert_eq!(classify_communication("collaborative"), CommunicationStyle::Supportive);
        assert_eq!(classify_communication("CHALLENGING"), CommunicationStyle::Direct);
        assert_eq!(classify_communication(""), CommunicationStyle::Analytical);
        assert_eq!(classify_communication("direct"), CommunicationStyle::Analytical);
    }

    #[test]
    fn test_challenging_is_direct() {
        let analysis = heuristic_analysis(&answers("challenging"));
        assert_eq!(analysis.personality_profile.communication_style, CommunicationStyle::Direct);
        assert_eq!(analysis.tone_scores.directness, 0.7);
        assert_eq!(analysis.tone_scores.empathy, 0.5);
        assert_eq!(analysis.tone_scores.analytical_approach, 0.6);
        assert_eq!(analysis.tone_scores.supportiveness, 0.5);
    }

    #[test]
    fn test_therapy_focus_limited_to_five() {
        let input = IntakeAnswers {
            specific_concerns: Some(TagField::One("anxiety, grief, sleep, work, family, trauma".to_string())),
            ..Default::default()
        };
        let analysis = heuristic_analysis(&input);
        assert_eq!(analysis.therapy_focus, vec!["anxiety", "grief", "sleep", "work", "family"]);
        assert!(heuristic_analysis(&IntakeAnswers::default()).therapy_focus.is_empty());
    }

    #[tokio::test]
    async fn test_failed_ai_falls_back() {
        let analyzer = IntakeAnalyzer::new(Some(Arc::new(FailingAnalyst) as Arc<dyn AiIntakeAnalyst>));
        let scored = analyzer.analyze(&answers("gentle")).await;

        assert_eq!(scored.source, Source::Heuristic);
        assert_eq!(scored.value.tone_scores.empathy, 0.8);
        assert_eq!(scored.value.personality_insights, HEURISTIC_INSIGHTS);
    }

    #[tokio::test]
    async fn test_ai_result_is_clamped() {
        let analyzer = IntakeAnalyzer::new(Some(Arc::new(LoudAnalyst) as Arc<dyn AiIntakeAnalyst>));
        let scored = analyzer.analyze(&answers("gentle")).await;

        assert_eq!(scored.source, Source::Ai);
        assert_eq!(scored.value.tone_scores.empathy, 1.0);
        assert_eq!(scored.value.personality_insights, "from the model");
    }
}
