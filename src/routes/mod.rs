// Route exports
pub mod intake;
pub mod matches;

use actix_web::{http::header, web, HttpRequest, HttpResponse};

use crate::models::{CallerIdentity, ErrorResponse};
use crate::services::{JwtVerifier, StoreError};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(intake::configure),
    );
}

pub(crate) fn error_response(status_code: u16, error: &str, message: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status_code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// 404 for missing rows, 500 for everything else
pub(crate) fn store_error_response(error: &str, err: &StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(_) => error_response(404, error, err.to_string()),
        _ => error_response(500, error, err.to_string()),
    }
}

/// Resolve the caller or produce the 401 response
pub(crate) fn authenticate(verifier: &JwtVerifier, req: &HttpRequest) -> Result<CallerIdentity, HttpResponse> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    verifier.authenticate(header).map_err(|e| {
        tracing::info!("Rejected request to {}: {}", req.path(), e);
        error_response(401, "Unauthorized", e.to_string())
    })
}
