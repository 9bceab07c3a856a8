//! Therapy Match - intake analysis and therapist matching service
//!
//! This library provides the matching core used by the therapy intake flow.
//! A client's intake answers are normalized into a profile, analyzed, and
//! scored against the available therapist catalog. Every score comes from
//! an AI model when one is configured, with a deterministic heuristic
//! taking over per candidate whenever the AI path fails.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, IntakeAnalyzer, MatchRun, MatchSettings, Matcher};
pub use models::{ClientProfile, ConfidenceLevel, IntakeAnswers, MatchResult, ProviderProfile, Source};
