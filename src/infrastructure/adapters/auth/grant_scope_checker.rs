//! Grant Scope Checker
//!
//! 直接使用用户身份上携带的授权做权限范围判断

use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::{ScopeChecker, ScopeError};
use crate::domain::AuthenticatedUser;

/// 项目级授权从这个路径参数里取 project id
pub const PROJECT_ID_PARAM: &str = "projectId";

#[derive(Debug, Clone, Default)]
pub struct GrantScopeChecker;

impl GrantScopeChecker {
    pub fn new() -> Self {
        Self
    }

    fn grants(user: &AuthenticatedUser, scope: &str, project_id: Option<&str>) -> bool {
        user.has_global_scope(scope)
            || project_id.is_some_and(|project_id| user.has_project_scope(project_id, scope))
    }
}

#[async_trait]
impl ScopeChecker for GrantScopeChecker {
    async fn has_scope(
        &self,
        user: &AuthenticatedUser,
        scopes: &[&str],
        global_only: bool,
        route_params: &HashMap<String, String>,
    ) -> Result<bool, ScopeError> {
        let project_id = if global_only {
            None
        } else {
            route_params.get(PROJECT_ID_PARAM).map(String::as_str)
        };
        Ok(scopes.iter().all(|scope| Self::grants(user, scope, project_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser::new("u-1")
            .with_global_scopes(["widget:read"])
            .with_project_scopes("p-1", ["widget:write"])
    }

    fn params(project_id: &str) -> HashMap<String, String> {
        HashMap::from([(PROJECT_ID_PARAM.to_string(), project_id.to_string())])
    }

    #[tokio::test]
    async fn test_global_grant() {
        let checker = GrantScopeChecker::new();
        assert!(checker
            .has_scope(&user(), &["widget:read"], true, &HashMap::new())
            .await
            .unwrap());
        assert!(!checker
            .has_scope(&user(), &["widget:delete"], false, &params("p-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_project_grant_needs_matching_project() {
        let checker = GrantScopeChecker::new();
        assert!(checker
            .has_scope(&user(), &["widget:write"], false, &params("p-1"))
            .await
            .unwrap());
        assert!(!checker
            .has_scope(&user(), &["widget:write"], false, &params("p-2"))
            .await
            .unwrap());
        assert!(!checker
            .has_scope(&user(), &["widget:write"], false, &HashMap::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_global_only_ignores_project_grants() {
        let checker = GrantScopeChecker::new();
        assert!(!checker
            .has_scope(&user(), &["widget:write"], true, &params("p-1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_all_scopes_are_required() {
        let checker = GrantScopeChecker::new();
        assert!(!checker
            .has_scope(&user(), &["widget:read", "widget:write"], true, &HashMap::new())
            .await
            .unwrap());
        assert!(checker
            .has_scope(&user(), &["widget:read", "widget:write"], false, &params("p-1"))
            .await
            .unwrap());
    }
}
