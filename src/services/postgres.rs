use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::core::normalize::{normalize_tags, normalize_token};
use crate::models::domain::DEFAULT_LANGUAGE;
use crate::models::{
    AvailabilityStatus, CallerIdentity, ClientProfile, ConfidenceLevel, IntakeAnalysis,
    IntakeRecord, MatchResult, ProviderProfile, Source, StoredMatch,
};
use crate::services::store::{RecordStore, StoreError};

/// PostgreSQL-backed record store
///
/// Rows are mapped into canonical profiles here, so nothing past this
/// boundary deals with nullable columns or raw casing.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run embedded migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store from settings values
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert_intake(
        &self,
        caller: &CallerIdentity,
        profile: &ClientProfile,
        analysis: &IntakeAnalysis,
        source: Source,
    ) -> Result<Uuid, StoreError> {
        let query = r#"
            INSERT INTO intake_responses (
                user_id, current_situation, goals, specific_concerns, urgency_level,
                budget_range, session_format_preference, therapy_type_preference,
                communication_style_preference, preferred_language, previous_therapy,
                preferred_gender, personality_profile, ai_analysis, analysis_source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
        "#;

        let personality = serde_json::to_value(&analysis.personality_profile)?;
        let full_analysis = serde_json::to_value(analysis)?;

        let row = sqlx::query(query)
            .bind(caller.as_str())
            .bind(&profile.current_situation)
            .bind(&profile.goals)
            .bind(&profile.specific_concerns)
            .bind(&profile.urgency_level)
            .bind(&profile.budget_range)
            .bind(&profile.session_format_preference)
            .bind(&profile.therapy_type_preference)
            .bind(&profile.communication_style_preference)
            .bind(&profile.preferred_language)
            .bind(profile.previous_therapy)
            .bind(&profile.preferred_gender)
            .bind(personality)
            .bind(full_analysis)
            .bind(source.as_str())
            .fetch_one(&self.pool)
            .await?;

        let id: Uuid = row.try_get("id")?;
        tracing::debug!("Stored intake {} for {}", id, caller.as_str());
        Ok(id)
    }

    async fn fetch_intake(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<IntakeRecord, StoreError> {
        let query = r#"
            SELECT id, current_situation, goals, specific_concerns, urgency_level,
                   budget_range, session_format_preference, therapy_type_preference,
                   communication_style_preference, preferred_language, previous_therapy,
                   preferred_gender, ai_analysis, created_at
            FROM intake_responses
            WHERE id = $1 AND user_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(intake_id)
            .bind(caller.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Intake response {}", intake_id)))?;

        intake_from_row(&row)
    }

    async fn query_available_providers(&self) -> Result<Vec<ProviderProfile>, StoreError> {
        let query = r#"
            SELECT id, name, title, communication_style, approach_style, specializations,
                   therapy_types, languages, hourly_rate, years_experience, availability_status
            FROM therapists
            WHERE availability_status = 'available'
            ORDER BY created_at, id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let providers: Vec<ProviderProfile> = rows
            .iter()
            .filter_map(|row| match provider_from_row(row) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Skipping unreadable therapist row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Queried {} available providers", providers.len());

        Ok(providers)
    }

    async fn insert_match(
        &self,
        caller: &CallerIdentity,
        intake_id: Uuid,
        result: &MatchResult,
    ) -> Result<Uuid, StoreError> {
        let query = r#"
            INSERT INTO matches (
                user_id, therapist_id, intake_response_id, match_score, confidence_level,
                match_reasons, ai_explanation, source, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(caller.as_str())
            .bind(result.provider_id)
            .bind(intake_id)
            .bind(result.match_score)
            .bind(result.confidence_level.as_str())
            .bind(&result.match_reasons)
            .bind(&result.explanation)
            .bind(result.source.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    async fn list_matches(&self, caller: &CallerIdentity, intake_id: Uuid) -> Result<Vec<StoredMatch>, StoreError> {
        let query = r#"
            SELECT id, therapist_id, match_score, confidence_level, match_reasons,
                   ai_explanation, source
            FROM matches
            WHERE user_id = $1 AND intake_response_id = $2
            ORDER BY match_score DESC, created_at
        "#;

        let rows = sqlx::query(query)
            .bind(caller.as_str())
            .bind(intake_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn intake_from_row(row: &PgRow) -> Result<IntakeRecord, StoreError> {
    let specific_concerns: Option<Vec<String>> = row.try_get("specific_concerns")?;
    let therapy_types: Option<Vec<String>> = row.try_get("therapy_type_preference")?;
    let language: Option<String> = row.try_get("preferred_language")?;
    let style: Option<String> = row.try_get("communication_style_preference")?;
    let analysis: Option<serde_json::Value> = row.try_get("ai_analysis")?;

    let profile = ClientProfile {
        current_situation: row.try_get::<Option<String>, _>("current_situation")?.unwrap_or_default(),
        goals: row.try_get::<Option<String>, _>("goals")?.unwrap_or_default(),
        specific_concerns: normalize_tags(&specific_concerns.unwrap_or_default()),
        communication_style_preference: style.as_deref().map(normalize_token).unwrap_or_default(),
        therapy_type_preference: normalize_tags(&therapy_types.unwrap_or_default()),
        preferred_language: language
            .as_deref()
            .map(normalize_token)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        budget_range: row.try_get("budget_range")?,
        previous_therapy: row.try_get::<Option<bool>, _>("previous_therapy")?.unwrap_or(false),
        preferred_gender: row.try_get("preferred_gender")?,
        urgency_level: row.try_get("urgency_level")?,
        session_format_preference: row.try_get("session_format_preference")?,
    };

    Ok(IntakeRecord {
        id: row.try_get("id")?,
        profile,
        analysis: analysis.and_then(|v| serde_json::from_value(v).ok()),
        created_at: row.try_get("created_at")?,
    })
}

fn provider_from_row(row: &PgRow) -> Result<ProviderProfile, StoreError> {
    let years: Option<i32> = row.try_get("years_experience")?;
    let rate: Option<f64> = row.try_get("hourly_rate")?;
    let status: Option<String> = row.try_get("availability_status")?;

    Ok(ProviderProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        communication_style: row.try_get::<Option<String>, _>("communication_style")?.unwrap_or_default(),
        approach_style: row.try_get::<Option<String>, _>("approach_style")?.unwrap_or_default(),
        specializations: row.try_get::<Option<Vec<String>>, _>("specializations")?.unwrap_or_default(),
        therapy_types: row.try_get::<Option<Vec<String>>, _>("therapy_types")?.unwrap_or_default(),
        languages: row.try_get::<Option<Vec<String>>, _>("languages")?.unwrap_or_default(),
        hourly_rate: rate.filter(|r| *r >= 0.0),
        years_experience: years.and_then(|y| u32::try_from(y).ok()),
        availability_status: AvailabilityStatus::parse(status.as_deref().unwrap_or("")),
    })
}

fn match_from_row(row: &PgRow) -> Result<StoredMatch, StoreError> {
    let confidence: String = row.try_get("confidence_level")?;
    let source: String = row.try_get("source")?;
    let match_score: f64 = row.try_get("match_score")?;

    let source = match source.as_str() {
        "ai" => Source::Ai,
        "heuristic" => Source::Heuristic,
        other => return Err(StoreError::InvalidRecord(format!("unknown match source {}", other))),
    };

    Ok(StoredMatch {
        result: MatchResult {
            provider_id: row.try_get("therapist_id")?,
            match_score,
            confidence_level: ConfidenceLevel::parse(&confidence)
                .unwrap_or_else(|| ConfidenceLevel::from_score(match_score)),
            match_reasons: row.try_get::<Option<Vec<String>>, _>("match_reasons")?.unwrap_or_default(),
            explanation: row.try_get::<Option<String>, _>("ai_explanation")?.unwrap_or_default(),
            source,
        },
        match_id: Some(row.try_get("id")?),
        persisted: true,
    })
}
