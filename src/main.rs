use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use therapy_match::config::Settings;
use therapy_match::core::{AiIntakeAnalyst, AiMatchScorer, IntakeAnalyzer, Matcher};
use therapy_match::routes::{self, matches::AppState};
use therapy_match::services::{CatalogCache, JwtVerifier, OpenAiClient, PostgresStore, RecordStore};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(settings: Option<&Settings>) {
    let default_level = settings.map(|s| s.logging.level.clone()).unwrap_or_else(|| "info".to_string());
    let default_format = settings.map(|s| s.logging.format.clone()).unwrap_or_else(|| "json".to_string());

    let log_level = std::env::var("LOG_LEVEL").unwrap_or(default_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(default_format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_tracing(settings.as_ref().ok());

    info!("Starting therapy matching service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error("Configuration error", e)
    })?;

    info!("Configuration loaded successfully");

    let store = PostgresStore::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        io_error("PostgreSQL connection error", e)
    })?;
    let store: Arc<dyn RecordStore> = Arc::new(store);

    info!("PostgreSQL store initialized");

    // AI is optional; without a key every score and analysis is heuristic
    let openai = match settings.openai.configured_key() {
        Some(key) => {
            let client = OpenAiClient::new(
                key.to_string(),
                settings.openai.endpoint.clone(),
                settings.openai.match_model.clone(),
                settings.openai.intake_model.clone(),
                Duration::from_secs(settings.openai.timeout_secs),
            )
            .map_err(|e| io_error("OpenAI client error", e))?;
            info!("OpenAI client initialized ({})", settings.openai.match_model);
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENAI_API_KEY not configured, using heuristic scoring only");
            None
        }
    };

    let scorer = openai.clone().map(|c| c as Arc<dyn AiMatchScorer>);
    let analyst = openai.map(|c| c as Arc<dyn AiIntakeAnalyst>);

    let match_settings = settings.matching.match_settings();
    let matcher = Matcher::new(scorer, match_settings);

    info!("Matcher initialized with settings: {:?}", match_settings);

    let app_state = AppState {
        store,
        catalog: CatalogCache::new(settings.cache.catalog_ttl_secs),
        matcher,
        analyzer: IntakeAnalyzer::new(analyst),
        auth: JwtVerifier::new(&settings.auth.jwt_secret),
        max_limit: settings.matching.max_limit,
        allow_demo: settings.matching.allow_demo,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
