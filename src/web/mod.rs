//! # Web Module: Consultation over HTTP
//!
//! Built with **Axum** + **Maud**. Two audiences share one router:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ Browser (plain HTML forms)                                     │
//! │  ├── GET  /                               → checklist page     │
//! │  └── POST /diagnose                       → result page        │
//! ├────────────────────────────────────────────────────────────────┤
//! │ JSON clients                                                   │
//! │  ├── GET  /api/symptoms                   → symptom catalog    │
//! │  ├── GET  /api/pests                      → pest catalog       │
//! │  ├── POST /api/diagnose                   → fired rules + plan │
//! │  └── GET  /api/pests/{name}/recommendations → IPM plan         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Sub-module | Responsibility |
//! |------------|----------------|
//! | [`state`] | shared `AppState` |
//! | [`handlers`] | one Axum handler per route |
//! | [`templates`] | Maud pages |

pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Builds the router with every route, request tracing and permissive CORS
/// for the JSON API.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/symptoms", get(handlers::api_symptoms))
        .route("/pests", get(handlers::api_pests))
        .route("/pests/{name}/recommendations", get(handlers::api_recommendations))
        .route("/diagnose", post(handlers::api_diagnose))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(handlers::index))
        .route("/diagnose", post(handlers::diagnose_form))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;
    use crate::core::KnowledgeBase;

    fn app() -> Router {
        create_router(AppState::new(
            Arc::new(KnowledgeBase::malaysian_rice()),
            Settings::default(),
        ))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, serde_json::from_str(&body_string(response).await).unwrap())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, serde_json::from_str(&body_string(response).await).unwrap())
    }

    async fn post_form(body: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                Request::post("/diagnose")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_string(response).await)
    }

    #[tokio::test]
    async fn index_renders_checklist() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Symptom checklist"));
        assert!(html.contains("sym_hopper_burn"));
    }

    #[tokio::test]
    async fn catalogs_are_served() {
        let (status, symptoms) = get_json("/api/symptoms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(symptoms.as_array().unwrap().len(), 25);

        let (_, pests) = get_json("/api/pests").await;
        assert_eq!(pests.as_array().unwrap().len(), 5);
        assert_eq!(pests[0]["scientific_name"], "Nilaparvata lugens");
    }

    #[tokio::test]
    async fn api_diagnose_ranks_and_joins() {
        let (status, body) = post_json(
            "/api/diagnose",
            serde_json::json!({
                "observations": [
                    { "symptom": "hopper_burn", "present": true, "confidence": 0.9 },
                    { "symptom": "yellowing-drying", "present": "yes", "confidence": 0.9 },
                    { "symptom": "circular_patches", "confidence": 0.9 },
                    { "symptom": "plant_base_insects", "present": "yes", "confidence": 0.9 }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let fired: Vec<&str> = body["fired_rules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["rule_id"].as_str().unwrap())
            .collect();
        assert_eq!(fired, vec!["R1", "R3"]);

        let top = &body["diagnoses"][0];
        assert_eq!(top["pest_name"], "Brown Planthopper");
        assert!((top["confidence"].as_f64().unwrap() - 0.965925).abs() < 1e-6);
        assert_eq!(top["pest"]["scientific_name"], "Nilaparvata lugens");
        assert_eq!(top["recommendations"]["chemical"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn api_diagnose_unknown_presence_does_not_fire() {
        let (status, body) = post_json(
            "/api/diagnose",
            serde_json::json!({
                "observations": [
                    { "symptom": "white_head", "present": "yes", "confidence": 0.9 },
                    { "symptom": "empty_panicles", "present": "unknown", "confidence": 0.9 }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["diagnoses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_diagnose_rejects_unknown_symptom() {
        let (status, body) = post_json(
            "/api/diagnose",
            serde_json::json!({ "observations": [{ "symptom": "blue_leaves" }] }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("blue_leaves"));
    }

    #[tokio::test]
    async fn recommendations_for_known_and_unknown_pests() {
        let (status, plan) = get_json("/api/pests/Rice%20Bug/recommendations").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!plan["cultural"].as_array().unwrap().is_empty());

        let (status, plan) = get_json("/api/pests/Locust/recommendations").await;
        assert_eq!(status, StatusCode::OK);
        for key in ["cultural", "mechanical", "biological", "chemical"] {
            assert!(plan[key].as_array().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn form_diagnosis_renders_result() {
        let (status, html) =
            post_form("sym_silver_shoot=on&cf_silver_shoot=90&sym_onion_leaf_gall=on&cf_onion_leaf_gall=90&cf_foul_smell=80")
                .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Rice Gall Midge"));
        assert!(html.contains("85.5%"));
        assert!(!html.contains("Rice Bug</h2>"));
    }

    #[tokio::test]
    async fn form_with_nothing_ticked_reports_no_pest() {
        let (status, html) = post_form("cf_hopper_burn=80").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No pest could be identified"));
    }

    #[tokio::test]
    async fn form_rejects_tampered_symptom() {
        let (status, html) = post_form("sym_lava_flow=on").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("lava_flow"));
    }
}
