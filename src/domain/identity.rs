//! Identity - 已认证的调用方

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 认证中间件写入请求上下文的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    /// 全局授权
    #[serde(default)]
    pub global_scopes: Vec<String>,

    /// 项目级授权：project_id -> scopes
    #[serde(default)]
    pub project_scopes: HashMap<String, Vec<String>>,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            global_scopes: Vec::new(),
            project_scopes: HashMap::new(),
        }
    }

    pub fn with_global_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_project_scopes<I, S>(mut self, project_id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_scopes
            .insert(project_id.into(), scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_global_scope(&self, scope: &str) -> bool {
        self.global_scopes.iter().any(|s| s == scope)
    }

    pub fn has_project_scope(&self, project_id: &str, scope: &str) -> bool {
        self.project_scopes
            .get(project_id)
            .map(|scopes| scopes.iter().any(|s| s == scope))
            .unwrap_or(false)
    }
}
