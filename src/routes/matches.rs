use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::{IntakeAnalyzer, MatchSettings, Matcher};
use crate::models::{
    GenerateMatchesRequest, GenerateMatchesResponse, HealthResponse, ListMatchesQuery, StoredMatch,
};
use crate::routes::{authenticate, error_response, store_error_response};
use crate::services::{sample_providers, CatalogCache, JwtVerifier, RecordStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub catalog: CatalogCache,
    pub matcher: Matcher,
    pub analyzer: IntakeAnalyzer,
    pub auth: JwtVerifier,
    /// Upper bound for a caller-supplied `limit`
    pub max_limit: usize,
    pub allow_demo: bool,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/generate", web::post().to(generate_matches))
        .route("/matches", web::get().to(list_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_enabled: state.matcher.ai_enabled(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate matches endpoint
///
/// POST /api/v1/matches/generate
///
/// Request body:
/// ```json
/// {
///   "intakeResponseId": "uuid",
///   "limit": 5,
///   "demo": false
/// }
/// ```
async fn generate_matches(
    state: web::Data<AppState>,
    req: web::Json<GenerateMatchesRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state.auth, &http_req) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate_matches request: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    let intake_id = match Uuid::parse_str(req.intake_response_id.trim()) {
        Ok(id) => id,
        Err(e) => return error_response(400, "Invalid intake response id", e.to_string()),
    };

    if req.demo && !state.allow_demo {
        return error_response(403, "Demo data disabled", "This server does not serve sample providers".to_string());
    }

    let intake = match state.store.fetch_intake(&caller, intake_id).await {
        Ok(intake) => intake,
        Err(e) => {
            tracing::info!("Intake {} unavailable for {}: {}", intake_id, caller.as_str(), e);
            return store_error_response("Intake response not found", &e);
        }
    };

    let candidates = if req.demo {
        tracing::info!("Serving sample providers for intake {}", intake_id);
        sample_providers()
    } else {
        match state.catalog.available_providers(state.store.as_ref()).await {
            Ok(catalog) => Vec::clone(&catalog),
            Err(e) => {
                tracing::error!("Failed to load provider catalog: {}", e);
                return error_response(500, "Failed to load therapists", e.to_string());
            }
        }
    };

    let defaults = state.matcher.settings();
    let settings = MatchSettings {
        limit: req
            .limit
            .map(|l| usize::from(l).min(state.max_limit))
            .unwrap_or(defaults.limit),
        ..defaults
    };

    tracing::info!(
        "Generating matches for intake {} ({} candidates, limit {})",
        intake_id,
        candidates.len(),
        settings.limit
    );

    let run = state
        .matcher
        .generate_matches_with(&intake.profile, candidates, settings)
        .await;

    let mut matches = Vec::with_capacity(run.matches.len());
    for result in run.matches {
        // Sample providers have no catalog rows to reference
        if req.demo {
            matches.push(StoredMatch { result, match_id: None, persisted: false });
            continue;
        }

        match state.store.insert_match(&caller, intake_id, &result).await {
            Ok(match_id) => matches.push(StoredMatch { result, match_id: Some(match_id), persisted: true }),
            Err(e) => {
                tracing::warn!("Failed to persist match for provider {}: {}", result.provider_id, e);
                matches.push(StoredMatch { result, match_id: None, persisted: false });
            }
        }
    }

    let message = matches
        .is_empty()
        .then(|| "No available therapists found".to_string());

    HttpResponse::Ok().json(GenerateMatchesResponse {
        success: true,
        matches,
        total_therapists_processed: run.processed,
        message,
    })
}

/// Read back stored matches for an intake
///
/// GET /api/v1/matches?intakeResponseId=uuid
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ListMatchesQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state.auth, &http_req) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    let intake_id = match Uuid::parse_str(query.intake_response_id.trim()) {
        Ok(id) => id,
        Err(e) => return error_response(400, "Invalid intake response id", e.to_string()),
    };

    match state.store.list_matches(&caller, intake_id).await {
        Ok(matches) => {
            tracing::debug!("Returning {} stored matches for intake {}", matches.len(), intake_id);
            HttpResponse::Ok().json(matches)
        }
        Err(e) => {
            tracing::error!("Failed to list matches for intake {}: {}", intake_id, e);
            store_error_response("Failed to fetch matches", &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityStatus, ProviderProfile};
    use crate::routes::configure_routes;
    use crate::services::{Claims, InMemoryStore};
    use actix_web::{test, App};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn bearer(sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        format!("Bearer {}", token)
    }

    fn provider(name: &str) -> ProviderProfile {
        ProviderProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            title: "Therapist".to_string(),
            communication_style: "gentle".to_string(),
            approach_style: String::new(),
            specializations: vec!["Anxiety".to_string()],
            therapy_types: vec!["CBT".to_string()],
            languages: vec!["English".to_string()],
            hourly_rate: Some(100.0),
            years_experience: Some(6),
            availability_status: AvailabilityStatus::Available,
        }
    }

    fn state(store: Arc<dyn RecordStore>, allow_demo: bool) -> AppState {
        AppState {
            store,
            catalog: CatalogCache::new(60),
            matcher: Matcher::heuristic_only(),
            analyzer: IntakeAnalyzer::heuristic_only(),
            auth: JwtVerifier::new(SECRET),
            max_limit: 20,
            allow_demo,
        }
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::new(InMemoryStore::new()), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["ai_enabled"], false);
    }

    #[actix_web::test]
    async fn test_generate_requires_auth() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::new(InMemoryStore::new()), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .set_json(serde_json::json!({ "intakeResponseId": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_generate_unknown_intake_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::new(InMemoryStore::new()), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_analyze_then_generate_and_list() {
        let store = Arc::new(InMemoryStore::with_providers(vec![provider("A"), provider("B")]));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(store.clone(), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/intake/analyze")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({
                "intakeData": {
                    "communicationStylePreference": "gentle",
                    "therapyTypePreference": ["CBT"],
                    "specificConcerns": "Anxiety",
                    "budgetRange": "80-120"
                }
            }))
            .to_request();
        let analyzed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(analyzed["success"], true);
        assert_eq!(analyzed["source"], "heuristic");
        let intake_id = analyzed["intakeResponseId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id, "limit": 1 }))
            .to_request();
        let generated: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(generated["totalTherapistsProcessed"], 2);
        assert_eq!(generated["matches"].as_array().unwrap().len(), 1);
        assert_eq!(generated["matches"][0]["persisted"], true);
        assert_eq!(store.match_count(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches?intakeResponseId={}", intake_id))
            .insert_header(("Authorization", bearer("user-1")))
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        // Another caller cannot see the intake
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-2")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn test_persistence_failure_is_not_fatal() {
        let store = InMemoryStore::with_providers(vec![provider("A")]).failing_match_inserts();
        let caller = crate::models::CallerIdentity("user-1".to_string());
        let analysis = crate::core::heuristic_analysis(&Default::default());
        let intake_id = store
            .insert_intake(&caller, &Default::default(), &analysis, crate::models::Source::Heuristic)
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::new(store), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id }))
            .to_request();
        let generated: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(generated["success"], true);
        assert_eq!(generated["matches"][0]["persisted"], false);
        assert!(generated["matches"][0]["matchId"].is_null());
    }

    #[actix_web::test]
    async fn test_demo_requires_server_opt_in() {
        let store = InMemoryStore::new();
        let caller = crate::models::CallerIdentity("user-1".to_string());
        let analysis = crate::core::heuristic_analysis(&Default::default());
        let intake_id = store
            .insert_intake(&caller, &Default::default(), &analysis, crate::models::Source::Heuristic)
            .await
            .unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(store);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(store.clone(), false)))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id, "demo": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(store, true)))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id, "demo": true }))
            .to_request();
        let generated: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(generated["totalTherapistsProcessed"], sample_providers().len());
        assert_eq!(generated["matches"][0]["persisted"], false);
    }

    #[actix_web::test]
    async fn test_empty_catalog_returns_message() {
        let store = InMemoryStore::new();
        let caller = crate::models::CallerIdentity("user-1".to_string());
        let analysis = crate::core::heuristic_analysis(&Default::default());
        let intake_id = store
            .insert_intake(&caller, &Default::default(), &analysis, crate::models::Source::Heuristic)
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(Arc::new(store), false)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/generate")
            .insert_header(("Authorization", bearer("user-1")))
            .set_json(serde_json::json!({ "intakeResponseId": intake_id }))
            .to_request();
        let generated: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(generated["success"], true);
        assert_eq!(generated["totalTherapistsProcessed"], 0);
        assert!(generated["matches"].as_array().unwrap().is_empty());
        assert!(generated["message"].is_string());
    }
}
