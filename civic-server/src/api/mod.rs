//! API 路由模块
//!
//! - [`health`] - 健康检查 (公共)
//! - [`issues`] - 问题上报、投票、状态流转、评分
//! - [`stats`] - 仪表盘统计

pub mod health;
pub mod issues;
pub mod stats;
