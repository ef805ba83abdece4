//! # API REST
//!
//! REST binding of the DDX query surface.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Every response body, including errors, carries the educational disclaimer.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path as AxumPath, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ddx_core::content::{
    AffectedAnatomy, AlarmSymptom, BodySystem, CareGuidance, ClinicalFeatureSet, ConceptId,
    DiagnosisCategory, DiagnosticWorkup, DifferentialDiagnosis, DifferentialEntry,
    DifferentiatingTest, ExplanationLadder, HighlightColor, InvolvementType, Likelihood,
    NonEmptyText, Pathophysiology, SymptomFrequency, Timeframe, Urgency,
};
use ddx_core::{
    AnatomyHighlight, DdxError, DifferentialExplorer, DifferentialExplorerResult,
    RankedDifferential, RedFlagTrigger, ScoreReason, ScoreReasonKind, Sex, SymptomModifiers,
    TriggeredRedFlag, UserSymptomInput, EDUCATIONAL_DISCLAIMER,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    explorer: DifferentialExplorer,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        explore,
        list_symptoms,
        symptom_differentials,
        get_diagnosis,
        get_explanation,
        list_category,
    ),
    components(schemas(
        HealthRes,
        ExploreReq,
        SymptomSummary,
        SymptomsRes,
        DiagnosisRes,
        ExplanationRes,
        DiagnosisSummary,
        CategoryRes,
        ErrorRes,
        DifferentialExplorerResult,
        RankedDifferential,
        ScoreReason,
        ScoreReasonKind,
        TriggeredRedFlag,
        RedFlagTrigger,
        AnatomyHighlight,
        SymptomModifiers,
        Sex,
        DifferentialDiagnosis,
        DifferentialEntry,
        Pathophysiology,
        AffectedAnatomy,
        ClinicalFeatureSet,
        SymptomFrequency,
        AlarmSymptom,
        DiagnosticWorkup,
        DifferentiatingTest,
        CareGuidance,
        ExplanationLadder,
        DiagnosisCategory,
        Likelihood,
        BodySystem,
        InvolvementType,
        Urgency,
        Timeframe,
        HighlightColor,
        ConceptId,
        NonEmptyText,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub knowledge_base_version: String,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ExploreReq {
    pub symptom_id: ConceptId,
    #[serde(default)]
    pub modifiers: Option<SymptomModifiers>,
    #[serde(default)]
    pub selected_diagnosis_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SymptomQuery {
    /// Search by name, id or alias
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SymptomSummary {
    pub symptom_id: String,
    pub symptom_name: String,
    pub aliases: Vec<String>,
    pub candidate_count: usize,
    pub must_not_miss_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SymptomsRes {
    pub symptoms: Vec<SymptomSummary>,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosisRes {
    pub diagnosis: DifferentialDiagnosis,
    /// Symptoms whose differential lists this diagnosis.
    pub symptoms: Vec<String>,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExplanationRes {
    pub diagnosis_id: String,
    pub level: u8,
    pub text: String,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisSummary {
    pub diagnosis_id: String,
    pub name: String,
    pub likelihood: Likelihood,
    pub urgency: Urgency,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryRes {
    pub category: DiagnosisCategory,
    pub diagnoses: Vec<DiagnosisSummary>,
    pub disclaimer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    pub disclaimer: String,
}

/// Maps engine errors onto HTTP status codes.
#[derive(Debug)]
pub enum ApiError {
    Engine(DdxError),
    BadRequest(String),
}

impl From<DdxError> for ApiError {
    fn from(err: DdxError) -> Self {
        ApiError::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Engine(err) if err.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::Engine(DdxError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, format!("invalid input: {message}"))
            }
            ApiError::Engine(err) => {
                tracing::error!("request failed: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_owned(),
                )
            }
        };
        let body = ErrorRes {
            error: message,
            disclaimer: EDUCATIONAL_DISCLAIMER.to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the REST router with Swagger UI mounted.
pub fn router(explorer: DifferentialExplorer) -> Router {
    let state = AppState { explorer };

    Router::new()
        .route("/health", get(health))
        .route("/explore", post(explore))
        .route("/symptoms", get(list_symptoms))
        .route("/symptoms/:id/differentials", get(symptom_differentials))
        .route("/diagnoses/:id", get(get_diagnosis))
        .route("/diagnoses/:id/explanations/:level", get(get_explanation))
        .route("/categories/:category/diagnoses", get(list_category))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve the router until the process stops.
pub async fn serve(addr: &str, explorer: DifferentialExplorer) -> anyhow::Result<()> {
    tracing::info!("-- Starting DDX REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(explorer)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "DDX REST API is alive".into(),
        knowledge_base_version: state.explorer.knowledge_base().version().to_string(),
        disclaimer: EDUCATIONAL_DISCLAIMER.into(),
    })
}

#[utoipa::path(
    post,
    path = "/explore",
    request_body = ExploreReq,
    responses(
        (status = 200, description = "Ranked differential", body = DifferentialExplorerResult),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 404, description = "Unknown symptom or selected diagnosis", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Rank the differential for a symptom with optional modifiers
#[axum::debug_handler]
async fn explore(
    State(state): State<AppState>,
    req: Result<Json<ExploreReq>, JsonRejection>,
) -> Result<Json<DifferentialExplorerResult>, ApiError> {
    let Json(req) = req.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let input = UserSymptomInput {
        symptom_id: req.symptom_id,
        modifiers: req.modifiers,
    };
    let result = state
        .explorer
        .explore_with_selection(&input, req.selected_diagnosis_id.as_deref())?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/symptoms",
    params(SymptomQuery),
    responses(
        (status = 200, description = "Matching symptoms", body = SymptomsRes),
        (status = 400, description = "Malformed query string", body = ErrorRes)
    )
)]
/// List symptoms, best matches first when `q` is given
#[axum::debug_handler]
async fn list_symptoms(
    State(state): State<AppState>,
    query: Result<Query<SymptomQuery>, QueryRejection>,
) -> Result<Json<SymptomsRes>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let kb = state.explorer.knowledge_base();
    let symptoms = kb
        .search_symptoms(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(|(list, _)| SymptomSummary {
            symptom_id: list.symptom_id.to_string(),
            symptom_name: list.symptom_name.to_string(),
            aliases: list.aliases.iter().map(|a| a.to_string()).collect(),
            candidate_count: list.entries.len(),
            must_not_miss_count: list.must_not_miss().count(),
        })
        .collect();

    Ok(Json(SymptomsRes {
        symptoms,
        disclaimer: EDUCATIONAL_DISCLAIMER.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/symptoms/{id}/differentials",
    params(("id" = String, Path, description = "Symptom id, e.g. chest-pain")),
    responses(
        (status = 200, description = "Curated differential without modifiers", body = DifferentialExplorerResult),
        (status = 400, description = "Malformed symptom id", body = ErrorRes),
        (status = 404, description = "Unknown symptom", body = ErrorRes)
    )
)]
/// The curated differential for a symptom, with must-not-miss red flags surfaced
#[axum::debug_handler]
async fn symptom_differentials(
    State(state): State<AppState>,
    path: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<DifferentialExplorerResult>, ApiError> {
    let AxumPath(id) = path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let symptom_id = ConceptId::new(&id)
        .map_err(|e| ApiError::BadRequest(format!("invalid symptom id '{id}': {e}")))?;
    let result = state.explorer.explore(&UserSymptomInput::new(symptom_id))?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/diagnoses/{id}",
    params(("id" = String, Path, description = "Diagnosis id, e.g. appendicitis")),
    responses(
        (status = 200, description = "Full diagnosis record", body = DiagnosisRes),
        (status = 404, description = "Unknown diagnosis", body = ErrorRes)
    )
)]
/// Fetch one diagnosis with the symptoms that list it
#[axum::debug_handler]
async fn get_diagnosis(
    State(state): State<AppState>,
    path: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<DiagnosisRes>, ApiError> {
    let AxumPath(id) = path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let diagnosis = state.explorer.get_diagnosis(&id)?;
    let symptoms = state
        .explorer
        .knowledge_base()
        .symptoms_for_diagnosis(&id)?
        .iter()
        .map(|list| list.symptom_id.to_string())
        .collect();

    Ok(Json(DiagnosisRes {
        diagnosis: diagnosis.clone(),
        symptoms,
        disclaimer: EDUCATIONAL_DISCLAIMER.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/diagnoses/{id}/explanations/{level}",
    params(
        ("id" = String, Path, description = "Diagnosis id"),
        ("level" = u8, Path, description = "Explanation level 1-5")
    ),
    responses(
        (status = 200, description = "Explanation text", body = ExplanationRes),
        (status = 400, description = "Level outside 1-5", body = ErrorRes),
        (status = 404, description = "Unknown diagnosis", body = ErrorRes)
    )
)]
/// One rung of a diagnosis's explanation ladder
#[axum::debug_handler]
async fn get_explanation(
    State(state): State<AppState>,
    path: Result<AxumPath<(String, String)>, PathRejection>,
) -> Result<Json<ExplanationRes>, ApiError> {
    let AxumPath((id, level)) =
        path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let level: u8 = level
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("explanation level '{level}' is not 1-5")))?;
    let text = state.explorer.knowledge_base().explanation(&id, level)?;
    Ok(Json(ExplanationRes {
        diagnosis_id: id,
        level,
        text: text.to_string(),
        disclaimer: EDUCATIONAL_DISCLAIMER.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/categories/{category}/diagnoses",
    params(("category" = String, Path, description = "Diagnosis category, e.g. neurologic")),
    responses(
        (status = 200, description = "Diagnoses in the category", body = CategoryRes),
        (status = 400, description = "Unknown category", body = ErrorRes)
    )
)]
/// Diagnoses in one clinical category
#[axum::debug_handler]
async fn list_category(
    State(state): State<AppState>,
    path: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<CategoryRes>, ApiError> {
    let AxumPath(category) =
        path.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let category: DiagnosisCategory = category.parse().map_err(ApiError::BadRequest)?;

    let diagnoses = state
        .explorer
        .knowledge_base()
        .diagnoses_by_category(category)
        .into_iter()
        .map(|dx| DiagnosisSummary {
            diagnosis_id: dx.diagnosis_id.to_string(),
            name: dx.name.to_string(),
            likelihood: dx.likelihood,
            urgency: dx.care_guidance.urgency,
        })
        .collect();

    Ok(Json(CategoryRes {
        category,
        diagnoses,
        disclaimer: EDUCATIONAL_DISCLAIMER.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use ddx_core::{resolve_knowledge_base_dir, KnowledgeBase};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let dir = resolve_knowledge_base_dir(None).expect("bundled knowledge base");
        let kb = KnowledgeBase::load_from_dir(&dir).expect("loads");
        router(DifferentialExplorer::new(Arc::new(kb)))
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(req).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).expect("json body");
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_version_and_disclaimer() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["knowledge_base_version"], "2026.10");
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
    }

    #[tokio::test]
    async fn explore_escalates_thunderclap_headache() {
        let req = post_json(
            "/explore",
            serde_json::json!({
                "symptom_id": "headache",
                "modifiers": { "associated_symptoms": ["thunderclap onset"] }
            }),
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommended_action"]["urgency"], "emergency");
        assert_eq!(body["guidance_source"], "subarachnoid-hemorrhage");
        assert_eq!(body["ranked"][0]["entry"]["diagnosis_id"], "tension-headache");
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
    }

    #[tokio::test]
    async fn explore_unknown_symptom_is_404_with_disclaimer() {
        let req = post_json(
            "/explore",
            serde_json::json!({ "symptom_id": "unknown-symptom-xyz" }),
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
    }

    #[tokio::test]
    async fn explore_rejects_out_of_range_severity() {
        let req = post_json(
            "/explore",
            serde_json::json!({ "symptom_id": "chest-pain", "modifiers": { "severity": 11 } }),
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("message").contains("severity"));
    }

    #[tokio::test]
    async fn explore_rejects_malformed_body() {
        let req = post_json("/explore", serde_json::json!({ "symptom_id": "Chest Pain" }));
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
    }

    #[tokio::test]
    async fn symptom_differentials_keep_must_not_miss_entries() {
        let (status, body) = send(get("/symptoms/chest-pain/differentials")).await;
        assert_eq!(status, StatusCode::OK);

        let ranked = body["ranked"].as_array().expect("ranked");
        assert_eq!(ranked.len(), 5);
        let first_mnm = ranked
            .iter()
            .find(|r| r["entry"]["must_not_miss"] == true)
            .expect("must-not-miss");
        assert_eq!(first_mnm["entry"]["diagnosis_id"], "acute-coronary-syndrome");
    }

    #[tokio::test]
    async fn symptoms_search_uses_aliases() {
        let (status, body) = send(get("/symptoms?q=dyspnea")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symptoms"][0]["symptom_id"], "shortness-of-breath");
    }

    #[tokio::test]
    async fn rejected_query_string_is_json_with_disclaimer() {
        let (status, body) = send(get("/symptoms?q=chest&q=head")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn rejected_path_segment_is_json_with_disclaimer() {
        for uri in [
            "/diagnoses/%FF",
            "/symptoms/%FF/differentials",
            "/diagnoses/%FF/explanations/1",
            "/categories/%FF/diagnoses",
        ] {
            let (status, body) = send(get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER, "{uri}");
        }
    }

    #[tokio::test]
    async fn diagnosis_lookup_and_not_found() {
        let (status, body) = send(get("/diagnoses/pulmonary-embolism")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["diagnosis"]["name"], "Pulmonary embolism");
        assert_eq!(
            body["symptoms"],
            serde_json::json!(["chest-pain", "shortness-of-breath"])
        );

        let (status, body) = send(get("/diagnoses/nonexistent-dx")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["disclaimer"], EDUCATIONAL_DISCLAIMER);
    }

    #[tokio::test]
    async fn explanation_levels_are_bounded() {
        let (status, body) = send(get("/diagnoses/appendicitis/explanations/2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], 2);

        let (status, _) = send(get("/diagnoses/appendicitis/explanations/6")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(get("/diagnoses/appendicitis/explanations/top")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn category_listing() {
        let (status, body) = send(get("/categories/infectious/diagnoses")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["diagnoses"]
            .as_array()
            .expect("diagnoses")
            .iter()
            .filter_map(|d| d["diagnosis_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["bacterial-meningitis", "community-acquired-pneumonia"]);

        let (status, _) = send(get("/categories/astrology/diagnoses")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/explore"].is_object());
    }
}
