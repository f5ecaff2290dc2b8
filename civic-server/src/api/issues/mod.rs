//! Issue API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/issues | POST | 上报问题 |
//! | /api/issues | GET | 过滤查询 (city, authorId, status, category) |
//! | /api/issues/{id} | GET | 详情 |
//! | /api/issues/{id}/vote | POST | 社区投票 |
//! | /api/issues/{id}/status | POST | 管理员: PENDING / IN_PROGRESS |
//! | /api/issues/{id}/resolve | POST | 管理员: 附证据解决 |
//! | /api/issues/{id}/reject | POST | 管理员: 按原因驳回 |
//! | /api/issues/{id}/rating | POST | 作者评分 |

mod handler;

pub use handler::{RatingRequest, RejectRequest, ResolveRequest, StatusRequest, VoteRequest};

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/issues", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/vote", post(handler::vote))
        .route("/{id}/status", post(handler::set_status))
        .route("/{id}/resolve", post(handler::resolve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/rating", post(handler::rate))
}
