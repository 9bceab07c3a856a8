// Core algorithm exports
pub mod analyzer;
pub mod external;
pub mod fallback;
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use analyzer::{heuristic_analysis, IntakeAnalyzer};
pub use external::{AiError, AiIntakeAnalyst, AiMatchAssessment, AiMatchScorer};
pub use fallback::{with_fallback, Scored};
pub use matcher::{rank, MatchRun, MatchSettings, Matcher};
pub use normalize::{normalize_field, normalize_tags, split_tags, TagField};
pub use scoring::calculate_match_score;
