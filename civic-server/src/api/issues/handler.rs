//! Issue API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    Issue, IssueDraft, IssueFilter, IssueStatus, RejectionReason, VoteDirection,
};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    /// `up` | `down`
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub evidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Wire name (`WRONG_LOCATION`) or label (`Wrong Location`)
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRequest {
    pub stars: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /api/issues - 上报问题
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(draft): Json<IssueDraft>,
) -> AppResult<ApiResponse<Issue>> {
    let issue = state
        .issues()
        .create_issue(current_user.principal(), draft)
        .await?;
    Ok(ApiResponse::success(issue))
}

/// GET /api/issues - 过滤查询，最新在前
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<IssueFilter>,
) -> AppResult<ApiResponse<Vec<Issue>>> {
    let issues = state.issues().query(&filter).await?;
    Ok(ApiResponse::success(issues))
}

/// GET /api/issues/{id} - 获取单个问题
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Issue>> {
    let issue = state.issues().get(&id).await?;
    Ok(ApiResponse::success(issue))
}

/// POST /api/issues/{id}/vote - 确认 / 标记 (重复同方向即撤回)
pub async fn vote(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> AppResult<ApiResponse<Issue>> {
    let direction: VoteDirection = payload.direction.parse().map_err(|_| {
        AppError::new(ErrorCode::InvalidVoteDirection).with_detail("direction", payload.direction)
    })?;

    let issue = state
        .issues()
        .vote(current_user.principal(), &id, direction)
        .await?;
    Ok(ApiResponse::success(issue))
}

/// POST /api/issues/{id}/status - PENDING / IN_PROGRESS
pub async fn set_status(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<StatusRequest>,
) -> AppResult<ApiResponse<Issue>> {
    let status: IssueStatus = payload
        .status
        .parse()
        .map_err(|e: String| AppError::invalid_request(e).with_detail("status", payload.status))?;

    let issue = state
        .issues()
        .set_status(current_user.principal(), &id, status)
        .await?;
    Ok(ApiResponse::success(issue))
}

/// POST /api/issues/{id}/resolve - 附证据解决
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ResolveRequest>,
) -> AppResult<ApiResponse<Issue>> {
    let issue = state
        .issues()
        .resolve(current_user.principal(), &id, &payload.evidence)
        .await?;
    Ok(ApiResponse::success(issue))
}

/// POST /api/issues/{id}/reject - 按原因驳回
pub async fn reject(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<ApiResponse<Issue>> {
    let reason: RejectionReason = payload.reason.parse().map_err(|_| {
        AppError::new(ErrorCode::InvalidRejectionReason).with_detail("reason", payload.reason)
    })?;

    let issue = state
        .issues()
        .reject(current_user.principal(), &id, reason)
        .await?;
    Ok(ApiResponse::success(issue))
}

/// POST /api/issues/{id}/rating - 作者评分 (1-5)
pub async fn rate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RatingRequest>,
) -> AppResult<ApiResponse<Issue>> {
    let issue = state
        .issues()
        .rate(
            current_user.principal(),
            &id,
            payload.stars,
            payload.comment.as_deref(),
        )
        .await?;
    Ok(ApiResponse::success(issue))
}
