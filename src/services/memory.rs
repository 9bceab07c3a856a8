use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::models::{
    CallerIdentity, ClientProfile, IntakeAnalysis, IntakeRecord, MatchResult, ProviderProfile,
    Source, StoredMatch,
};
use crate::services::store::{RecordStore, StoreError};

struct StoredIntake {
    owner: CallerIdentity,
    record: IntakeRecord,
}

struct MatchRow {
    owner: CallerIdentity,
    intake_id: Uuid,
    stored: StoredMatch,
}

#[derive(Default)]
struct Tables {
    intakes: HashMap<Uuid, StoredIntake>,
    providers: Vec<ProviderProfile>,
    matches: Vec<MatchRow>,
}

/// Record store kept entirely in memory
///
/// Used by tests and local runs without a database. Ownership rules match
/// the Postgres store: intakes and matches are only visible to their owner.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_match_inserts: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers(providers: Vec<ProviderProfile>) -> Self {
        let store = Self::default();
        store.tables().providers = providers;
        store
    }

    /// Make every `insert_match` fail
    pub fn failing_match_inserts(mut self) -> Self {
        self.fail_match_inserts = true;
        self
    }

    /// Number of match rows written so far
    pub fn match_count(&self) -> usize {
        self.tables().matches.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert_intake(
        &self,
        caller: &CallerIdentity,
        profile: &ClientProfile,
        analysis: &IntakeAnalysis,
        _source: Source,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let record = IntakeRecord {
            id,
            profile: profile.clone(),
            analysis: Some(analysis.clone()),
            created_at: chrono::Utc::now(),
        };

        self.tables().intakes.insert(
            id,
            StoredIntake {
                owner: caller.clone(),
                record,
            },
        );

        Ok(id)
    }

    async fn fetch_intake(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<IntakeRecord, StoreError> {
        self.tables()
            .intakes
            .get(&intake_id)
            .filter(|stored| &stored.owner == caller)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| StoreError::NotFound(format!("Intake response {}", intake_id)))
    }

    async fn query_available_providers(&self) -> Result<Vec<ProviderProfile>, StoreError> {
        Ok(self
            .tables()
            .providers
            .iter()
            .filter(|p| p.availability_status.is_available())
            .cloned()
            .collect())
    }

    async fn insert_match(
        &self,
        caller: &CallerIdentity,
        intake_id: Uuid,
        result: &MatchResult,
    ) -> Result<Uuid, StoreError> {
        if self.fail_match_inserts {
            return Err(StoreError::InvalidRecord("match inserts disabled".to_string()));
        }

        let id = Uuid::new_v4();
        self.tables().matches.push(MatchRow {
            owner: caller.clone(),
            intake_id,
            stored: StoredMatch {
                result: result.clone(),
                match_id: Some(id),
                persisted: true,
            },
        });

        Ok(id)
    }

    async fn list_matches(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<Vec<StoredMatch>, StoreError> {
        let mut matches: Vec<StoredMatch> = self
            .tables()
            .matches
            .iter()
            .filter(|row| &row.owner == caller && row.intake_id == intake_id)
            .map(|row| row.stored.clone())
            .collect();

        matches.sort_by(|a, b| {
            b.result
                .match_score
                .partial_cmp(&a.result.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(matches)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
