//! Statistics API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/stats/cities/{city} | GET | 城市状态统计 |
//! | /api/stats/districts | GET | 各区问题数 (仅超级管理员) |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stats", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/cities/{city}", get(handler::city_stats))
        .route("/districts", get(handler::district_counts))
}
