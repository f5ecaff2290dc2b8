//! Issue lifecycle engine
//!
//! - [`votes`] - 社区投票 (confirm/flag) 聚合
//! - [`transitions`] - 状态机 (管理员操作 + 作者评分)
//! - [`IssueError`] - 引擎错误
//!
//! Admin and citizen entry points share these functions; nothing here
//! touches storage.

pub mod error;
pub mod transitions;
pub mod votes;

pub use error::{IssueError, IssueResult};
pub use transitions::{rate, reject, resolve, set_in_progress, set_pending, set_status};
pub use votes::{apply_vote, cast_vote};
