use std::sync::Arc;

use crate::core::external::AiMatchScorer;
use crate::core::fallback::with_fallback;
use crate::core::scoring::calculate_match_score;
use crate::models::{ClientProfile, MatchResult, ProviderProfile, Source};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_CANDIDATE_CAP: usize = 8;

/// Bounds applied to every orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    /// Maximum number of results returned
    pub limit: usize,
    /// Maximum number of candidates scored (one AI call each)
    pub candidate_cap: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
        }
    }
}

/// Result of one orchestration run
#[derive(Debug)]
pub struct MatchRun {
    pub matches: Vec<MatchResult>,
    /// Candidates actually scored, after filtering and capping
    pub processed: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Availability filter
/// 2. Candidate cap
/// 3. Per-candidate scoring: AI first when configured, heuristic otherwise
///    or on any AI failure
/// 4. Stable ranking by score and truncation
#[derive(Clone, Default)]
pub struct Matcher {
    ai: Option<Arc<dyn AiMatchScorer>>,
    settings: MatchSettings,
}

impl Matcher {
    pub fn new(ai: Option<Arc<dyn AiMatchScorer>>, settings: MatchSettings) -> Self {
        Self { ai, settings }
    }

    pub fn heuristic_only() -> Self {
        Self::new(None, MatchSettings::default())
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Rank candidates for a client using the configured settings
    pub async fn generate_matches(
        &self,
        client: &ClientProfile,
        candidates: Vec<ProviderProfile>,
    ) -> MatchRun {
        self.generate_matches_with(client, candidates, self.settings).await
    }

    /// Rank candidates for a client with explicit bounds
    ///
    /// Candidates are scored one after another; a failure for one of them
    /// only switches that candidate to the heuristic. An empty candidate
    /// list is a valid outcome and yields an empty run.
    pub async fn generate_matches_with(
        &self,
        client: &ClientProfile,
        candidates: Vec<ProviderProfile>,
        settings: MatchSettings,
    ) -> MatchRun {
        let total_candidates = candidates.len();

        let eligible: Vec<ProviderProfile> = candidates
            .into_iter()
            .filter(|p| p.availability_status.is_available())
            .take(settings.candidate_cap)
            .collect();

        let mut matches = Vec::with_capacity(eligible.len());
        let mut ai_scored = 0;

        for provider in &eligible {
            let result = self.score_candidate(client, provider).await;
            if result.source == Source::Ai {
                ai_scored += 1;
            }
            matches.push(result);
        }

        let processed = matches.len();
        rank(&mut matches);
        matches.truncate(settings.limit);

        tracing::info!(
            "Scored {} of {} candidates ({} by AI), returning {}",
            processed,
            total_candidates,
            ai_scored,
            matches.len()
        );

        MatchRun { matches, processed }
    }

    async fn score_candidate(&self, client: &ClientProfile, provider: &ProviderProfile) -> MatchResult {
        let attempt = self.ai.as_ref().map(|ai| async move {
            ai.score(client, provider)
                .await
                .and_then(|assessment| assessment.into_match_result(provider.id))
        });

        let subject = provider.id.to_string();
        let scored = with_fallback(attempt, || calculate_match_score(client, provider), &subject).await;

        MatchResult {
            provider_id: provider.id,
            source: scored.source,
            ..scored.value
        }
    }
}

/// Sort by score descending; equal scores keep their processing order
pub fn rank(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
