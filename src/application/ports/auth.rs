//! Auth Port - 认证服务
//!
//! 认证守卫只依赖这个接口：成功时得到调用方身份，失败时终止请求

use async_trait::async_trait;
use http::HeaderMap;
use thiserror::Error;

use crate::domain::AuthenticatedUser;

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("auth backend unavailable: {0}")]
    Unavailable(String),
}

/// Auth Service Port
#[async_trait]
pub trait AuthService: Send + Sync {
    /// 根据请求头解析调用方身份
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError>;
}
