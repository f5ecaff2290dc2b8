//! Statistics API Handlers

use axum::extract::{Extension, Path, State};
use shared::models::{CityStats, DistrictCount};
use shared::{ApiResponse, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/stats/cities/{city} - 城市仪表盘计数
pub async fn city_stats(
    State(state): State<ServerState>,
    Path(city): Path<String>,
) -> AppResult<ApiResponse<CityStats>> {
    let stats = state.issues().city_stats(&city).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/stats/districts - 超级管理员总览
pub async fn district_counts(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<DistrictCount>>> {
    let counts = state
        .issues()
        .district_counts(current_user.principal())
        .await?;
    Ok(ApiResponse::success(counts))
}
