use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, ServerError, StorageBackend};
use crate::issues::{IssueRepository, IssueService, MemoryIssueRepository, RedbIssueRepository};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | service | Arc<IssueService> | 事件操作入口 |
/// | jwt_service | Arc<JwtService> | JWT 校验 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub service: Arc<IssueService>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 持久化后端 (redb 或 memory)
    /// 3. IssueService + JwtService
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        // 1. 工作目录
        std::fs::create_dir_all(&config.work_dir)?;

        // 2. 持久化后端
        let repo: Arc<dyn IssueRepository> = match config.storage_backend {
            StorageBackend::Redb => {
                let path = config.db_path();
                tracing::info!(path = %path.display(), "Opening redb issue store");
                Arc::new(RedbIssueRepository::open(&path)?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory issue store, data is lost on restart");
                Arc::new(MemoryIssueRepository::new())
            }
        };

        // 3. 服务
        let service = Arc::new(IssueService::new(repo, config.event_channel_capacity));
        Ok(Self::with_service(config.clone(), service))
    }

    /// 使用已构造的服务组装状态 (测试)
    pub fn with_service(config: Config, service: Arc<IssueService>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            service,
            jwt_service,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn issues(&self) -> &IssueService {
        &self.service
    }
}
