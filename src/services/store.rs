use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CallerIdentity, ClientProfile, IntakeAnalysis, IntakeRecord, MatchResult, ProviderProfile, Source, StoredMatch};

/// Errors that can occur when reading or writing records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Persistence boundary for intakes, the provider catalog and match rows
///
/// Implementations map their own row shapes into the canonical profiles
/// before returning them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_intake(
        &self,
        caller: &CallerIdentity,
        profile: &ClientProfile,
        analysis: &IntakeAnalysis,
        source: Source,
    ) -> Result<Uuid, StoreError>;

    /// Fetch an intake owned by `caller`
    async fn fetch_intake(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<IntakeRecord, StoreError>;

    async fn query_available_providers(&self) -> Result<Vec<ProviderProfile>, StoreError>;

    async fn insert_match(
        &self,
        caller: &CallerIdentity,
        intake_id: Uuid,
        result: &MatchResult,
    ) -> Result<Uuid, StoreError>;

    /// Stored matches for one intake, best first
    async fn list_matches(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<Vec<StoredMatch>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
