use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::github::{GhCli, IssueTracker};
use super::launcher::{AgentLauncher, LaunchRequest, LauncherConfig};
use super::logs::read_log;
use super::markers::MarkerRules;
use super::models::LogKind;
use super::registry::AgentRegistry;
use super::resolver::StatusResolver;
use super::workspace::Provisioner;
use crate::config::DashboardToml;
use crate::errors::DashboardError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub registry: AgentRegistry,
    pub launcher: AgentLauncher,
    pub resolver: StatusResolver,
    pub tracker: Arc<dyn IssueTracker>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the production components from a loaded configuration.
    pub fn from_config(config: &DashboardToml) -> Result<Self> {
        Self::with_workspace_root(config, config.workspace_root())
    }

    pub fn with_workspace_root(config: &DashboardToml, workspace_root: PathBuf) -> Result<Self> {
        let rules = MarkerRules::from_config(&config.markers)
            .context("Invalid marker configuration")?;
        let launcher = AgentLauncher::new(
            Provisioner::new(workspace_root),
            LauncherConfig::from_toml(config),
        );
        let tracker = GhCli::new(config.gh_cmd(), config.agent.repo_list_limit);

        Ok(Self {
            registry: AgentRegistry::new(),
            launcher,
            resolver: StatusResolver::new(rules),
            tracker: Arc::new(tracker),
        })
    }
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RepoQuery {
    pub repo: Option<String>,
}

#[derive(Deserialize)]
pub struct LogsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchAgentRequest {
    pub repo: Option<String>,
    pub issue: Option<serde_json::Value>,
    pub prompt: Option<String>,
    pub agent_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateConfigRequest {
    pub issue: Option<serde_json::Value>,
    pub config_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchAgentResponse {
    pub workspace_id: String,
    pub message: String,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Validation(msg) => ApiError::BadRequest(msg),
            DashboardError::AgentNotFound { .. } | DashboardError::LogNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            // The tool's own error text is what the UI shows.
            DashboardError::ExternalTool(msg) => {
                tracing::error!(error = %msg, "external tool failed");
                ApiError::Internal(msg)
            }
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/repos", get(list_repos))
        .route("/api/issues", get(list_issues))
        .route("/api/issues/{number}", get(get_issue))
        .route("/api/generate-config", post(generate_config))
        .route("/api/launch-agent", post(launch_agent))
        .route("/api/agents", get(list_agents))
        .route("/api/agent/{id}", get(get_agent))
        .route("/api/agent/{id}/logs", get(get_agent_logs))
        .route("/health", get(health_check))
}

fn require_repo(query: RepoQuery) -> Result<String, ApiError> {
    query
        .repo
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Repository parameter is required".into()))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_repos(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let repos = state.tracker.list_repos().await?;
    Ok(Json(repos))
}

async fn list_issues(
    State(state): State<SharedState>,
    Query(query): Query<RepoQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = require_repo(query)?;
    let issues = state.tracker.list_issues(&repo).await?;
    Ok(Json(issues))
}

async fn get_issue(
    State(state): State<SharedState>,
    number: Result<Path<i64>, PathRejection>,
    Query(query): Query<RepoQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(number) = number.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let repo = require_repo(query)?;
    let issue = state.tracker.get_issue(&repo, number).await?;
    Ok(Json(issue))
}

async fn generate_config(
    State(state): State<SharedState>,
    payload: Result<Json<GenerateConfigRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let issue = req
        .issue
        .filter(|i| !i.is_null())
        .ok_or_else(|| ApiError::BadRequest("Issue is required".into()))?;
    let config_type = req
        .config_type
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Config type is required".into()))?;

    let config = state.launcher.generate_config(&issue, &config_type).await?;
    Ok(Json(serde_json::json!({ "config": config })))
}

async fn launch_agent(
    State(state): State<SharedState>,
    payload: Result<Json<LaunchAgentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let record = state.launcher.launch(
        &state.registry,
        LaunchRequest {
            repo: req.repo,
            issue: req.issue,
            prompt: req.prompt,
            agent_type: req.agent_type,
        },
    )?;

    Ok(Json(LaunchAgentResponse {
        message: format!("Agent launched for issue #{}", record.issue_number),
        workspace_id: record.id,
    }))
}

async fn list_agents(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let agents = state.registry.snapshot()?;
    Ok(Json(agents))
}

async fn get_agent(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.resolver.resolve(&state.registry, &id)?;
    Ok(Json(record))
}

async fn get_agent_logs(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = match query.kind.as_deref() {
        None | Some("") => LogKind::Output,
        Some(raw) => raw.parse::<LogKind>().map_err(ApiError::BadRequest)?,
    };
    let logs = read_log(&state.registry, &id, kind)?;
    Ok(Json(serde_json::json!({ "logs": logs })))
}
