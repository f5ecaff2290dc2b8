//! Civic Issue Server - 城市问题上报与社区核实引擎
//!
//! # 架构概述
//!
//! - **引擎** (`engine`): 投票聚合 + 状态机，纯函数
//! - **问题存储** (`issues`): 校验、按 id 串行化的读改写、redb / 内存持久化、变更广播
//! - **视图同步** (`views`): 客户端投影在每次变更后整体替换
//! - **认证** (`auth`): JWT bearer token 校验
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! civic-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务器
//! ├── engine/        # 投票聚合、状态流转
//! ├── issues/        # IssueStore、IssueService、持久化
//! ├── views/         # 投影同步
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod engine;
pub mod issues;
pub mod utils;
pub mod views;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use engine::{IssueError, IssueResult};
pub use issues::{IssueChanged, IssueService};
pub use views::IssueViews;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{LoggerGuard, cleanup_old_logs, init_logger, init_logger_with_file};

/// Security log helper - `security` target, written to `<log_dir>/security`
///
/// ```ignore
/// security_log!(WARN, "auth_failed", error = %e, uri = uri.path());
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}
