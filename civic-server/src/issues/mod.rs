//! Issue record store and its persistence collaborators
//!
//! # 模块结构
//!
//! - [`repository`] - 持久化接口 `IssueRepository` + `StorageError`
//! - [`redb_storage`] - redb 实现 (默认)
//! - [`memory`] - 内存实现 (测试 / 临时模式)
//! - [`store`] - 校验、按 id 串行化的 read-modify-write
//! - [`service`] - 对外操作入口 + 变更广播

pub mod memory;
pub mod redb_storage;
pub mod repository;
pub mod service;
pub mod store;

pub use memory::MemoryIssueRepository;
pub use redb_storage::RedbIssueRepository;
pub use repository::{IssueRepository, StorageError, StorageResult};
pub use service::{ChangeKind, DEFAULT_EVENT_CHANNEL_CAPACITY, IssueChanged, IssueService};
pub use store::IssueStore;
