//! Axum route handlers for the Screening and Settings APIs.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::screening::models::{validate_request, Job, ResumeInput};
use crate::screening::session::SessionSnapshot;
use crate::screening::weights::{ScoringWeights, WeightsSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartScreeningRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub resumes: Vec<ResumeInput>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/settings/scoring-weights
pub async fn handle_get_weights(State(state): State<AppState>) -> Json<WeightsSummary> {
    Json(state.weights.summary())
}

/// PUT /api/v1/settings/scoring-weights
///
/// Out-of-range weights are rejected; a total other than 100 is accepted and
/// flagged with `sum_mismatch`.
pub async fn handle_set_weights(
    State(state): State<AppState>,
    payload: Result<Json<ScoringWeights>, JsonRejection>,
) -> Result<Json<WeightsSummary>, AppError> {
    let Json(weights) = payload?;
    Ok(Json(state.weights.set(weights)?))
}

/// POST /api/v1/jobs/:job_id/screenings
///
/// Starts a screening for the job and returns immediately with the `running`
/// snapshot. Poll GET /api/v1/jobs/:job_id/screening for the outcome.
pub async fn handle_start_screening(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    payload: Result<Json<StartScreeningRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let Json(request) = payload?;
    let job = Job {
        id: job_id,
        title: request.title,
        summary: request.summary,
        requirements: request.requirements,
    };

    // rejected requests must not leave a registry entry behind
    validate_request(&job, &request.resumes)?;
    let session = state.registry.get_or_create(&job.id);
    let attempt = session.start(&job, &request.resumes)?;
    debug!("Accepted screening attempt {} for job '{}'", attempt.number, job.id);
    // detach; the outcome lands in the session
    drop(attempt.task);

    Ok((StatusCode::ACCEPTED, Json(session.snapshot())))
}

/// GET /api/v1/jobs/:job_id/screening
pub async fn handle_get_screening(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state
        .registry
        .get(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("No screening for job '{job_id}'")))?;
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/jobs/:job_id/screening/cancel
pub async fn handle_cancel_screening(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state
        .registry
        .get(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("No screening for job '{job_id}'")))?;
    session.cancel()?;
    Ok(Json(session.snapshot()))
}

/// DELETE /api/v1/jobs/:job_id/screening
pub async fn handle_remove_screening(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .remove(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("No screening for job '{job_id}'")))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::routes::build_router;
    use crate::screening::registry::SessionRegistry;
    use crate::screening::session::tests::{two_candidates, MockBackend};
    use crate::screening::session::ScreeningStatus;
    use crate::screening::weights::WeightStore;
    use crate::state::AppState;

    fn app(backend: Arc<MockBackend>) -> (Router, AppState) {
        let weights = Arc::new(WeightStore::default());
        let state = AppState {
            registry: Arc::new(SessionRegistry::new(backend, weights.clone())),
            weights,
            config: Config {
                scoring_endpoint_url: "http://scoring.test/score".to_string(),
                scoring_api_key: None,
                scoring_timeout_secs: 5,
                port: 0,
                rust_log: "info".to_string(),
            },
        };
        (build_router(state.clone()), state)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn start_body() -> Value {
        json!({
            "title": "Senior Frontend Engineer",
            "summary": "Build beautiful and performant user interfaces.",
            "requirements": ["5+ years of React experience", "TypeScript proficiency"],
            "resumes": [{"text": "Alex Chen, 6 years React"}, {"fileName": "Resume_2.pdf"}]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(MockBackend::replying(Ok(two_candidates()), Duration::ZERO));
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scoring_endpoint"], "http://scoring.test/score");
        assert_eq!(body["scoring_timeout_secs"], 5);
    }

    #[tokio::test]
    async fn test_screening_end_to_end() {
        let backend = MockBackend::replying(Ok(two_candidates()), Duration::ZERO);
        let (app, state) = app(backend.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screenings",
            Some(start_body()),
        )
        .await;
        assert_eq!(status, 202);
        assert_eq!(body["status"], "running");
        assert_eq!(body["attempt"], 1);

        let session = state.registry.get("senior-frontend").unwrap();
        session
            .subscribe()
            .wait_for(|s| s.status == ScreeningStatus::Complete)
            .await
            .unwrap();

        let (status, body) =
            send(&app, Method::GET, "/api/v1/jobs/senior-frontend/screening", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "complete");
        assert_eq!(body["candidates"][0]["score"], 94);
        assert_eq!(body["candidates"][0]["band"], "high");
        assert_eq!(body["candidates"][1]["score"], 82);
        assert_eq!(body["candidate_count"], 2);
        assert_eq!(backend.calls(), 1);

        let sent = backend.requests.lock().unwrap();
        assert_eq!(sent[0].resumes[1], "Resume_2.pdf");
    }

    #[tokio::test]
    async fn test_start_with_no_resumes_is_400() {
        let backend = MockBackend::replying(Ok(two_candidates()), Duration::ZERO);
        let (app, _) = app(backend.clone());

        let mut body = start_body();
        body["resumes"] = json!([]);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screenings",
            Some(body),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_start_leaves_no_session() {
        let backend = MockBackend::replying(Ok(two_candidates()), Duration::ZERO);
        let (app, state) = app(backend.clone());

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/ghost/screenings",
            Some(json!({"title": "T", "resumes": []})),
        )
        .await;
        assert_eq!(status, 400);

        let (status, body) = send(&app, Method::GET, "/api/v1/jobs/ghost/screening", None).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(state.registry.get("ghost").is_none());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_start_body_is_400_json() {
        let backend = MockBackend::replying(Ok(two_candidates()), Duration::ZERO);
        let (app, state) = app(backend.clone());

        let mut body = start_body();
        body.as_object_mut().unwrap().remove("title");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screenings",
            Some(body),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("title"));
        assert!(state.registry.get("senior-frontend").is_none());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_409_and_cancel_resets_to_idle() {
        let backend = MockBackend::replying(Ok(two_candidates()), Duration::from_secs(30));
        let (app, _) = app(backend.clone());
        let uri = "/api/v1/jobs/senior-frontend/screenings";

        let (status, _) = send(&app, Method::POST, uri, Some(start_body())).await;
        assert_eq!(status, 202);
        let (status, body) = send(&app, Method::POST, uri, Some(start_body())).await;
        assert_eq!(status, 409);
        assert_eq!(body["error"]["code"], "ALREADY_RUNNING");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screening/cancel",
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "idle");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screening/cancel",
            None,
        )
        .await;
        assert_eq!(status, 409);
        assert_eq!(body["error"]["code"], "NOT_RUNNING");
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let (app, _) = app(MockBackend::replying(Ok(two_candidates()), Duration::ZERO));
        let (status, _) = send(&app, Method::GET, "/api/v1/jobs/ghost/screening", None).await;
        assert_eq!(status, 404);
        let (status, _) = send(&app, Method::DELETE, "/api/v1/jobs/ghost/screening", None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_delete_removes_session() {
        let (app, state) = app(MockBackend::replying(Ok(two_candidates()), Duration::ZERO));
        send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screenings",
            Some(start_body()),
        )
        .await;

        let (status, _) =
            send(&app, Method::DELETE, "/api/v1/jobs/senior-frontend/screening", None).await;
        assert_eq!(status, 204);
        assert!(state.registry.get("senior-frontend").is_none());
    }

    #[tokio::test]
    async fn test_failed_screening_exposes_error() {
        let backend = MockBackend::replying(Ok(json!({})), Duration::ZERO);
        let (app, state) = app(backend);

        send(
            &app,
            Method::POST,
            "/api/v1/jobs/senior-frontend/screenings",
            Some(start_body()),
        )
        .await;
        state
            .registry
            .get("senior-frontend")
            .unwrap()
            .subscribe()
            .wait_for(|s| s.status == ScreeningStatus::Failed)
            .await
            .unwrap();

        let (_, body) =
            send(&app, Method::GET, "/api/v1/jobs/senior-frontend/screening", None).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"]["code"], "schema");
        assert_eq!(body["candidates"], json!([]));
    }

    #[tokio::test]
    async fn test_weights_round_trip_through_settings() {
        let (app, _) = app(MockBackend::replying(Ok(two_candidates()), Duration::ZERO));
        let uri = "/api/v1/settings/scoring-weights";

        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["total"], 100);
        assert_eq!(body["sum_mismatch"], false);

        let (status, body) = send(
            &app,
            Method::PUT,
            uri,
            Some(json!({"technical": 40, "experience": 70})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["sum_mismatch"], true);
        assert_eq!(body["weights"]["experience"], 70);

        let (status, body) = send(&app, Method::PUT, uri, Some(json!({"technical": 150}))).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(body["weights"]["technical"], 40);
    }

    #[tokio::test]
    async fn test_non_integer_weights_are_400_json() {
        let (app, state) = app(MockBackend::replying(Ok(two_candidates()), Duration::ZERO));
        let uri = "/api/v1/settings/scoring-weights";

        for bad in [json!({"technical": 40.5}), json!({"technical": 1e30}), json!([1, 2])] {
            let (status, body) = send(&app, Method::PUT, uri, Some(bad)).await;
            assert_eq!(status, 400);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
        assert_eq!(state.weights.summary().total, 100);
    }
}
