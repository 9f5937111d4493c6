use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use expenso_agent::tools::{
    TOOL_CATEGORIZE_EXPENSE, TOOL_EXPENSE_SUMMARY, TOOL_SEARCH_POLICY, TOOL_VALIDATE_EXPENSE,
};
use expenso_agent::AgentRuntime;
use expenso_core::domain::session::{Session, SessionEvent, SessionEventKind, SessionId};
use expenso_db::{RepositoryError, SessionRepository};

#[derive(Clone)]
pub struct AppState {
    pub agent_runtime: Arc<AgentRuntime>,
    pub sessions: Arc<dyn SessionRepository>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/{id}/events", get(list_events))
        .route("/api/v1/sessions/{id}/tools/{tool}", post(invoke_tool))
        .with_state(state)
}

struct ApiError {
    status: StatusCode,
    message: String,
    correlation_id: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        }
    }

    fn not_found(message: impl Into<String>, correlation_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        }
    }

    fn internal(correlation_id: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error, please retry".to_string(),
            correlation_id: correlation_id.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "correlation_id": self.correlation_id,
        });
        (self.status, Json(body)).into_response()
    }
}

fn repository_error(error: RepositoryError, correlation_id: &str) -> ApiError {
    tracing::error!(
        event_name = "api.repository_error",
        correlation_id,
        error = %error,
        "session repository operation failed"
    );
    ApiError::internal(correlation_id)
}

#[derive(Deserialize)]
struct CreateSessionRequest {
    #[serde(default)]
    user_id: String,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: String,
    user_id: String,
    created_at: String,
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let user_id = request.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(ApiError::bad_request("user_id must not be empty", &correlation_id));
    }

    let session = Session {
        id: SessionId(Uuid::new_v4().to_string()),
        user_id,
        created_at: Utc::now(),
    };
    state
        .sessions
        .create(session.clone())
        .await
        .map_err(|error| repository_error(error, &correlation_id))?;

    tracing::info!(
        event_name = "api.session.created",
        correlation_id,
        session_id = %session.id.0,
        "session created"
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id.0,
            user_id: session.user_id,
            created_at: session.created_at.to_rfc3339(),
        }),
    ))
}

#[derive(Serialize)]
struct EventResponse {
    id: i64,
    kind: &'static str,
    payload: Value,
    created_at: String,
}

#[derive(Serialize)]
struct EventListResponse {
    session_id: String,
    events: Vec<EventResponse>,
}

async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventListResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id = SessionId(id);

    let session = state
        .sessions
        .find_by_id(&session_id)
        .await
        .map_err(|error| repository_error(error, &correlation_id))?;
    if session.is_none() {
        return Err(ApiError::not_found(
            format!("session `{}` was not found", session_id.0),
            &correlation_id,
        ));
    }

    let events = state
        .sessions
        .list_events(&session_id)
        .await
        .map_err(|error| repository_error(error, &correlation_id))?;

    Ok(Json(EventListResponse {
        session_id: session_id.0,
        events: events.into_iter().map(event_response).collect(),
    }))
}

fn event_response(event: SessionEvent) -> EventResponse {
    EventResponse {
        id: event.id,
        kind: event.kind.as_str(),
        payload: event.payload,
        created_at: event.created_at.to_rfc3339(),
    }
}

fn event_kind_for(tool: &str) -> Option<SessionEventKind> {
    match tool {
        TOOL_SEARCH_POLICY => Some(SessionEventKind::PolicySearch),
        TOOL_VALIDATE_EXPENSE => Some(SessionEventKind::Validation),
        TOOL_CATEGORIZE_EXPENSE => Some(SessionEventKind::Categorization),
        TOOL_EXPENSE_SUMMARY => Some(SessionEventKind::Summary),
        _ => None,
    }
}

async fn invoke_tool(
    State(state): State<AppState>,
    Path((id, tool)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id = SessionId(id);

    let session = state
        .sessions
        .find_by_id(&session_id)
        .await
        .map_err(|error| repository_error(error, &correlation_id))?;
    if session.is_none() {
        return Err(ApiError::not_found(
            format!("session `{}` was not found", session_id.0),
            &correlation_id,
        ));
    }

    let kind = event_kind_for(&tool).filter(|_| state.agent_runtime.knows_tool(&tool)).ok_or_else(
        || ApiError::not_found(format!("unknown tool `{tool}`"), &correlation_id),
    )?;

    tracing::info!(
        event_name = "api.tool.invoked",
        correlation_id,
        session_id = %session_id.0,
        tool = %tool,
        "dispatching tool"
    );

    let output = state
        .agent_runtime
        .dispatch_tool(&tool, input)
        .await
        .map_err(|error| ApiError::bad_request(error.to_string(), &correlation_id))?;

    state
        .sessions
        .append_event(&session_id, kind, output.clone())
        .await
        .map_err(|error| repository_error(error, &correlation_id))?;

    Ok(Json(output))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use expenso_agent::search::StaticPolicySearch;
    use expenso_agent::AgentRuntime;
    use expenso_db::InMemorySessionRepository;

    use super::{router, AppState};

    fn test_app() -> Router {
        router(AppState {
            agent_runtime: Arc::new(AgentRuntime::with_default_tools(Arc::new(StaticPolicySearch))),
            sessions: Arc::new(InMemorySessionRepository::default()),
        })
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        serde_json::from_slice(&bytes).expect("parse response body")
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/sessions", json!({"user_id": "U100"})))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        body["session_id"].as_str().expect("session id").to_string()
    }

    #[tokio::test]
    async fn session_creation_requires_a_user_id() {
        let app = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/v1/sessions", json!({"user_id": "  "})))
            .await
            .expect("send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn tool_invocation_records_a_session_event() {
        let app = test_app();
        let session_id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{session_id}/tools/validate_expense_data"),
                json!({"expense_data": {"amount": 120.0, "category": "meals", "has_receipt": true}}),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::OK);

        let tool_output = json_body(response).await;
        assert_eq!(tool_output["is_valid"], json!(false));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/sessions/{session_id}/events"))
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let events = body["events"].as_array().expect("events array");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["kind"], json!("validation"));
        assert_eq!(events[0]["payload"]["is_valid"], json!(false));
    }

    #[tokio::test]
    async fn unknown_session_and_unknown_tool_are_not_found() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/sessions/ghost/tools/validate_expense_data",
                json!({}),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let session_id = create_session(&app).await;
        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{session_id}/tools/approve_reimbursement"),
                json!({}),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summary_tool_round_trips_through_the_api() {
        let app = test_app();
        let session_id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{session_id}/tools/generate_expense_summary"),
                json!({"expenses": [
                    {"amount": 40.0, "category": "meals", "has_receipt": true},
                    {"amount": 220.0, "category": "lodging", "has_receipt": true},
                ]}),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["expense_count"], json!(2));
        assert_eq!(body["categories"]["meals"]["count"], json!(1));
    }
}
