// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AvailabilityStatus, CallerIdentity, ClientProfile, CommunicationStyle, ConfidenceLevel,
    IntakeAnalysis, IntakeAnswers, IntakeRecord, MatchResult, PersonalityProfile,
    ProviderProfile, Source, StoredMatch, ToneScores,
};
pub use requests::{AnalyzeIntakeRequest, GenerateMatchesRequest, IntakeForm, ListMatchesQuery};
pub use responses::{AnalyzeIntakeResponse, ErrorResponse, GenerateMatchesResponse, HealthResponse};
