//! JWT 令牌服务
//!
//! 校验身份服务签发的 HS256 bearer token。核心不签发会话；
//! [`JwtService::generate_token`] 仅供测试和本地工具使用。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use shared::models::{Principal, UserRole};
use thiserror::Error;

/// Minimum accepted secret length
pub const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)，仅影响本地签发
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
    /// 密钥是启动时随机生成的 (未配置 JWT_SECRET)
    #[serde(skip)]
    pub ephemeral: bool,
}

impl JwtConfig {
    /// 从环境变量读取
    ///
    /// | 环境变量 | 默认值 |
    /// |---------|--------|
    /// | JWT_SECRET | 随机 64 字符 (ephemeral) |
    /// | JWT_EXPIRATION_MINUTES | 1440 |
    /// | JWT_ISSUER | civic-identity |
    /// | JWT_AUDIENCE | civic-clients |
    pub fn from_env() -> Self {
        let (secret, ephemeral) = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => (secret, false),
            _ => (generate_printable_secret(), true),
        };

        Self {
            secret,
            ephemeral,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "civic-identity".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "civic-clients".to_string()),
        }
    }

    /// 固定密钥配置 (测试 / 本地工具)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 60,
            issuer: "civic-identity".to_string(),
            audience: "civic-clients".to_string(),
            ephemeral: false,
        }
    }

    pub fn validate(&self) -> Result<(), JwtError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::ConfigError(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
            )));
        }
        Ok(())
    }
}

/// 生成可打印的随机密钥 (开发环境)
pub fn generate_printable_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// 令牌中的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 显示名 (写入 authorName)
    pub name: String,
    /// `SUPER_ADMIN` | `CITY_ADMIN` | `CITIZEN`
    pub role: String,
    /// 管理员所属城市 / 区
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为主体签发令牌
    pub fn generate_token(&self, principal: &Principal) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: principal.id.clone(),
            name: principal.name.clone(),
            role: principal.role.as_str().to_string(),
            city: principal.city_district.clone(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由 [`require_auth`](super::require_auth) 注入请求扩展，handler 通过
/// `Extension<CurrentUser>` 或直接作为 extractor 获取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Principal);

impl CurrentUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role: UserRole = claims.role.parse()?;
        if role == UserRole::CityAdmin && claims.city.as_deref().is_none_or(|c| c.trim().is_empty()) {
            return Err("CITY_ADMIN token without city".to_string());
        }

        Ok(Self(Principal {
            id: claims.sub,
            name: claims.name,
            role,
            city_district: claims.city,
        }))
    }
}
