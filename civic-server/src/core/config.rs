use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::issues::DEFAULT_EVENT_CHANNEL_CAPACITY;

/// 持久化后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// 嵌入式 redb 文件 `<work_dir>/issues.redb`
    Redb,
    /// 进程内存 (重启即丢失)
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | production 时为 true | JSON 日志输出 |
/// | STORAGE_BACKEND | redb | redb \| memory |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 变更广播容量 |
/// | JWT_* | 见 [`JwtConfig::from_env`] | 令牌校验 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/civic HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub storage_backend: StorageBackend,
    pub event_channel_capacity: usize,
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let log_json_default = environment == "production";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(log_json_default),
            storage_backend: std::env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(StorageBackend::Redb),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVENT_CHANNEL_CAPACITY),
            jwt: JwtConfig::from_env(),
            environment,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        storage_backend: StorageBackend,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.storage_backend = storage_backend;
        config
    }

    /// 启动前检查
    ///
    /// 生产环境必须显式配置 JWT_SECRET，且不允许内存存储。
    pub fn validate(&self) -> Result<(), ServerError> {
        self.jwt
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        if self.is_production() {
            if self.jwt.ephemeral {
                return Err(ServerError::Config(
                    "JWT_SECRET environment variable must be set in production".into(),
                ));
            }
            if self.storage_backend == StorageBackend::Memory {
                return Err(ServerError::Config(
                    "STORAGE_BACKEND=memory is not allowed in production".into(),
                ));
            }
        }

        if self.event_channel_capacity == 0 {
            return Err(ServerError::Config(
                "EVENT_CHANNEL_CAPACITY must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("issues.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            work_dir: "/tmp/civic".to_string(),
            http_port: 0,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            storage_backend: StorageBackend::Memory,
            event_channel_capacity: 16,
            jwt: JwtConfig::with_secret("0123456789abcdef0123456789abcdef"),
        }
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("REDB".parse(), Ok(StorageBackend::Redb));
        assert_eq!(" memory ".parse(), Ok(StorageBackend::Memory));
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_paths() {
        let config = config();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/civic/issues.redb"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/civic/logs"));
    }

    #[test]
    fn test_development_accepts_memory_backend() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_production_rules() {
        let mut prod = config();
        prod.environment = "production".to_string();
        assert!(matches!(prod.validate(), Err(ServerError::Config(_))));

        prod.storage_backend = StorageBackend::Redb;
        assert!(prod.validate().is_ok());

        prod.jwt.ephemeral = true;
        assert!(prod.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut short = config();
        short.jwt = JwtConfig::with_secret("too-short");
        assert!(short.validate().is_err());
    }
}
