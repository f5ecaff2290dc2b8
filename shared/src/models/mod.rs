//! Data models
//!
//! Shared between civic-server and frontend (via API).
//! Wire format is camelCase JSON; all ids are opaque strings.

pub mod issue;
pub mod principal;
pub mod stats;
pub mod vote;

// Re-exports
pub use issue::*;
pub use principal::*;
pub use stats::*;
pub use vote::*;
