//! Scope Port - 权限范围检查

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AuthenticatedUser;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("scope backend unavailable: {0}")]
    Unavailable(String),
}

/// Scope Checker Port
#[async_trait]
pub trait ScopeChecker: Send + Sync {
    /// 判断用户是否拥有 `scopes` 中的全部权限
    ///
    /// `global_only` 为 true 时只看全局授权；`route_params` 为当前路由的路径参数，
    /// 用于定位资源（如 `projectId`）
    async fn has_scope(
        &self,
        user: &AuthenticatedUser,
        scopes: &[&str],
        global_only: bool,
        route_params: &HashMap<String, String>,
    ) -> Result<bool, ScopeError>;
}
