//! JSON routes over the lifecycle engine.

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use bugsage_core::bug::NewBug;
use bugsage_core::enums::Status;
use bugsage_core::filter::{AssigneeFilter, BugFilter};
use bugsage_core::history::BugPatch;
use bugsage_core::validation::{ValidationError, validate_priority};
use bugsage_lifecycle::{CreateOutcome, LifecycleError};

use crate::error::ApiError;
use crate::state::{Caller, SharedState};

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

/// Listing query string. Everything arrives as text so bad values produce
/// the usual `{"error": ..}` body instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub project: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Blank query values mean "not set", as sent by empty form fields.
fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ListParams {
    fn into_filter(self) -> Result<BugFilter, ApiError> {
        let status = non_blank(self.status.as_ref())
            .map(|s| Status::parse(s).ok_or_else(|| ValidationError::InvalidStatus(s.to_string())))
            .transpose()?;
        let priority = non_blank(self.priority.as_ref())
            .map(|p| validate_priority(Some(p)))
            .transpose()?;
        let assignee = non_blank(self.assignee.as_ref())
            .map(|a| AssigneeFilter::parse(a).ok_or_else(|| ValidationError::InvalidAssignee(a.to_string())))
            .transpose()?;
        let project_id = non_blank(self.project.as_ref())
            .map(|p| {
                p.parse::<i64>()
                    .map_err(|_| LifecycleError::Reference { field: "project" })
            })
            .transpose()?;

        Ok(BugFilter {
            status,
            priority,
            assignee,
            project_id,
            page: non_blank(self.page.as_ref()).and_then(|p| p.parse().ok()),
            per_page: non_blank(self.per_page.as_ref()).and_then(|p| p.parse().ok()),
        })
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ── Health ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ── Users & auth ──────────────────────────────────────────────────────

async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let user = state
        .engine
        .call(move |engine| engine.verify_credentials(&req.email, &req.password))
        .await?;
    Ok(Json(json!({"user": user})))
}

async fn register_user(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let user = state
        .engine
        .call(move |engine| {
            engine.register_user(&req.name, &req.email, &req.password, req.role.as_deref())
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "user_id": user.user_id})),
    ))
}

async fn list_users(
    State(state): State<SharedState>,
    _caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.engine.call(|engine| engine.list_users()).await?;
    Ok(Json(users))
}

// ── Projects ──────────────────────────────────────────────────────────

async fn list_projects(
    State(state): State<SharedState>,
    _caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.engine.call(|engine| engine.list_projects()).await?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<SharedState>,
    _caller: Caller,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let project = state
        .engine
        .call(move |engine| engine.create_project(&req.project_name, &req.description))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "project_id": project.project_id})),
    ))
}

// ── Bugs ──────────────────────────────────────────────────────────────

async fn list_bugs(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.into_filter()?;
    let page = state
        .engine
        .call(move |engine| engine.list_bugs(&caller, &filter))
        .await?;
    Ok(Json(page))
}

async fn create_bug(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    payload: Result<Json<NewBug>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_bug = body(payload)?;
    let outcome = state
        .engine
        .call(move |engine| engine.create_bug(&caller, &new_bug))
        .await?;

    let response = match outcome {
        CreateOutcome::Created { bug_id } => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "bug_id": bug_id,
                "message": "Bug created successfully",
            })),
        ),
        CreateOutcome::Duplicates(duplicates) => (
            StatusCode::OK,
            Json(json!({
                "warning": "Similar bugs found",
                "duplicates": duplicates,
            })),
        ),
    };
    Ok(response)
}

async fn search_bugs(
    State(state): State<SharedState>,
    _caller: Caller,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let q = params.q.unwrap_or_default();
    let results = state.engine.call(move |engine| engine.search_bugs(&q)).await?;
    Ok(Json(json!({"results": results})))
}

async fn get_bug(
    State(state): State<SharedState>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.engine.call(move |engine| engine.bug_detail(id)).await?;
    Ok(Json(detail))
}

async fn update_bug(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = body(payload)?;
    state
        .engine
        .call(move |engine| {
            engine.update_bug_with(&caller, id, || BugPatch::from_json_map(&fields))
        })
        .await?;
    Ok(Json(json!({"success": true, "message": "Bug updated successfully"})))
}

async fn update_status(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let changed = state
        .engine
        .call(move |engine| engine.update_status(&caller, id, &req.status))
        .await?;
    let message = if changed {
        "Status updated successfully"
    } else {
        "Status unchanged"
    };
    Ok(Json(json!({"success": true, "message": message, "changed": changed})))
}

async fn add_comment(
    State(state): State<SharedState>,
    Caller(caller): Caller,
    Path(id): Path<i64>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let comment = state
        .engine
        .call(move |engine| engine.add_comment(&caller, id, &req.comment))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "comment_id": comment.comment_id})),
    ))
}

async fn bug_history(
    State(state): State<SharedState>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.engine.call(move |engine| engine.bug_history(id)).await?;
    Ok(Json(history))
}

// ── Dashboard ─────────────────────────────────────────────────────────

async fn dashboard_stats(
    State(state): State<SharedState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .engine
        .read(move |engine| engine.dashboard_stats(&caller))
        .await?;
    Ok(Json(stats))
}

async fn dashboard_recent(
    State(state): State<SharedState>,
    _caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let recent = state.engine.read(|engine| engine.dashboard_recent()).await?;
    Ok(Json(recent))
}

async fn dashboard_charts(
    State(state): State<SharedState>,
    _caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let charts = state.engine.read(|engine| engine.dashboard_charts()).await?;
    Ok(Json(charts))
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/users", get(list_users).post(register_user))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/bugs", get(list_bugs).post(create_bug))
        .route("/api/bugs/search", get(search_bugs))
        .route("/api/bugs/{id}", get(get_bug).patch(update_bug))
        .route("/api/bugs/{id}/status", put(update_status))
        .route("/api/bugs/{id}/comments", post(add_comment))
        .route("/api/bugs/{id}/history", get(bug_history))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/dashboard/recent", get(dashboard_recent))
        .route("/api/dashboard/charts", get(dashboard_charts))
}
