use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::{AnalyzeIntakeRequest, AnalyzeIntakeResponse, ClientProfile, IntakeAnswers};
use crate::routes::matches::AppState;
use crate::routes::{authenticate, error_response};

/// Configure intake routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/intake/analyze", web::post().to(analyze_intake));
}

/// Analyze and store an intake submission
///
/// POST /api/v1/intake/analyze
///
/// Request body:
/// ```json
/// {
///   "intakeData": {
///     "communicationStylePreference": "gentle",
///     "therapyTypePreference": ["CBT"],
///     "specificConcerns": "anxiety, sleep",
///     "budgetRange": "80-120"
///   }
/// }
/// ```
async fn analyze_intake(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeIntakeRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match authenticate(&state.auth, &http_req) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze_intake request: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    let answers = IntakeAnswers::from(req.into_inner().intake_data);
    let profile = ClientProfile::from_answers(&answers);

    let analysis = state.analyzer.analyze(&answers).await;

    let intake_id = match state
        .store
        .insert_intake(&caller, &profile, &analysis.value, analysis.source)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to store intake for {}: {}", caller.as_str(), e);
            return error_response(500, "Failed to save intake analysis", e.to_string());
        }
    };

    tracing::info!(
        "Stored intake {} for {} ({} analysis)",
        intake_id,
        caller.as_str(),
        analysis.source.as_str()
    );

    HttpResponse::Ok().json(AnalyzeIntakeResponse {
        success: true,
        intake_response_id: intake_id,
        analysis: analysis.value,
        source: analysis.source,
    })
}
