//! # HTTP Handlers
//!
//! Each public function is an Axum handler mapped in
//! [`super::create_router()`].
//!
//! | Handler | Method | Route | Returns |
//! |---------|--------|-------|---------|
//! | `index` | GET | `/` | checklist page |
//! | `diagnose_form` | POST | `/diagnose` | result page, 422 page on bad input |
//! | `api_symptoms` | GET | `/api/symptoms` | JSON symptom catalog |
//! | `api_pests` | GET | `/api/pests` | JSON pest catalog |
//! | `api_diagnose` | POST | `/api/diagnose` | JSON report, 422 on unknown symptom |
//! | `api_recommendations` | GET | `/api/pests/{name}/recommendations` | JSON plan |
//!
//! Every diagnosing handler creates a fresh [`Consultation`]; nothing
//! survives between requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::AppState;
use super::templates;
use crate::consultation::{Consultation, Finding};
use crate::core::{ExpertError, Pest, Presence, Symptom};
use crate::inference::FiredRule;
use crate::observation::ObservationParser;
use crate::recommendations::{self, RecommendationPlan};

fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

/// GET `/`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    markup_to_html(templates::checklist_page(
        &state.kb,
        state.settings.default_confidence,
    ))
}

/// POST `/diagnose`, the checklist form.
///
/// The form is read as raw pairs: `sym_<name>` marks a ticked symptom and
/// `cf_<name>` carries its confidence in percent. Confidences go through
/// [`ObservationParser`], so `80`, `80%` and `0.8` are all accepted.
pub async fn diagnose_form(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let parser = ObservationParser::new(state.settings.default_confidence);
    let mut consultation = Consultation::new(state.kb.clone());

    for (key, _) in &fields {
        let Some(name) = key.strip_prefix("sym_") else {
            continue;
        };
        let cf_key = format!("cf_{name}");
        let token = match fields.iter().find(|(k, v)| *k == cf_key && !v.trim().is_empty()) {
            Some((_, raw)) => format!("{name}={}", raw.trim()),
            None => name.to_string(),
        };

        let asserted = parser.parse(&token).and_then(|obs| {
            let symptom = obs.symptom_name(&state.kb)?;
            consultation.assert_symptom(&symptom, true, obs.confidence)
        });
        if let Err(e) = asserted {
            tracing::warn!(error = %e, "rejected checklist form input");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                markup_to_html(templates::error_page(&e.to_string())),
            )
                .into_response();
        }
    }

    let report = consultation.report();
    markup_to_html(templates::result_page(&report)).into_response()
}

/// GET `/api/symptoms`
pub async fn api_symptoms(State(state): State<AppState>) -> Json<Vec<Symptom>> {
    Json(state.kb.symptoms().to_vec())
}

/// GET `/api/pests`
pub async fn api_pests(State(state): State<AppState>) -> Json<Vec<Pest>> {
    Json(state.kb.pests().to_vec())
}

/// Presence as sent by API clients: `true`/`false` or `"yes"`/`"no"`/`"unknown"`.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
pub enum PresenceInput {
    Flag(bool),
    Symbol(Presence),
}

impl Default for PresenceInput {
    fn default() -> Self {
        PresenceInput::Symbol(Presence::Yes)
    }
}

impl From<PresenceInput> for Presence {
    fn from(input: PresenceInput) -> Self {
        match input {
            PresenceInput::Flag(flag) => Presence::from(flag),
            PresenceInput::Symbol(p) => p,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ObservationInput {
    pub symptom: String,
    /// Defaults to `yes`.
    #[serde(default)]
    pub present: PresenceInput,
    /// Defaults to the configured default confidence.
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub observations: Vec<ObservationInput>,
}

#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub consultation_id: Uuid,
    pub fired_rules: Vec<FiredRule>,
    /// Ranked by descending confidence, each with pest metadata and plan.
    pub diagnoses: Vec<Finding>,
}

/// JSON error body: `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError(ExpertError);

impl From<ExpertError> for ApiError {
    fn from(e: ExpertError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ExpertError::UnknownSymptom(_) | ExpertError::InvalidObservation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ExpertError::FactParse { .. } => StatusCode::BAD_REQUEST,
            ExpertError::InvalidKnowledgeBase(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// POST `/api/diagnose`
pub async fn api_diagnose(
    State(state): State<AppState>,
    Json(request): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    let mut consultation = Consultation::new(state.kb.clone());
    for obs in &request.observations {
        let confidence = obs
            .confidence
            .unwrap_or(state.settings.default_confidence);
        if let Err(e) = consultation.assert_presence(&obs.symptom, obs.present.into(), confidence) {
            tracing::warn!(error = %e, "rejected API observation");
            return Err(e.into());
        }
    }

    let report = consultation.report();
    Ok(Json(DiagnoseResponse {
        consultation_id: report.consultation_id,
        fired_rules: report.fired_rules,
        diagnoses: report.findings,
    }))
}

/// GET `/api/pests/{name}/recommendations`
///
/// Unknown pests get four empty groups, not a 404.
pub async fn api_recommendations(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<RecommendationPlan> {
    Json(recommendations::recommendations_for(&state.kb, &name))
}
