//! Bearer Token Auth
//!
//! 静态 token 表实现的认证服务：`Authorization: Bearer <token>`

use async_trait::async_trait;
use dashmap::DashMap;
use http::{header::AUTHORIZATION, HeaderMap};

use crate::application::{AuthError, AuthService};
use crate::config::TokenConfig;
use crate::domain::AuthenticatedUser;

/// 基于内存 token 表的认证服务
#[derive(Debug, Default)]
pub struct BearerTokenAuth {
    tokens: DashMap<String, AuthenticatedUser>,
}

impl BearerTokenAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置构建
    pub fn from_config(tokens: &[TokenConfig]) -> Self {
        let auth = Self::new();
        for entry in tokens {
            let mut user = AuthenticatedUser::new(&entry.user_id)
                .with_global_scopes(entry.global_scopes.iter().cloned());
            user.email = entry.email.clone();
            for (project_id, scopes) in &entry.project_scopes {
                user = user.with_project_scopes(project_id, scopes.iter().cloned());
            }
            auth.insert(&entry.token, user);
        }
        tracing::debug!(tokens = auth.len(), "Bearer tokens loaded");
        auth
    }

    /// 添加或替换 token
    pub fn insert(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens.insert(token.into(), user);
    }

    /// 吊销 token
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidCredentials)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidCredentials)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidCredentials);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

#[async_trait]
impl AuthService for BearerTokenAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(headers)?;
        self.tokens
            .get(token)
            .map(|user| user.value().clone())
            .ok_or(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::collections::HashMap;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn auth() -> BearerTokenAuth {
        BearerTokenAuth::from_config(&[TokenConfig {
            token: "t-1".into(),
            user_id: "u-1".into(),
            email: Some("u1@example.com".into()),
            global_scopes: vec!["widget:read".into()],
            project_scopes: HashMap::from([("p-1".to_string(), vec!["widget:write".to_string()])]),
        }])
    }

    #[tokio::test]
    async fn test_known_token_authenticates() {
        let user = auth().authenticate(&headers("Bearer t-1")).await.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email.as_deref(), Some("u1@example.com"));
        assert!(user.has_global_scope("widget:read"));
        assert!(user.has_project_scope("p-1", "widget:write"));
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        assert!(auth().authenticate(&headers("bearer t-1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_header() {
        let err = auth().authenticate(&HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_token() {
        let auth = auth();
        assert!(matches!(
            auth.authenticate(&headers("Bearer nope")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate(&headers("Basic dTpw")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let auth = auth();
        assert!(auth.revoke("t-1"));
        assert!(auth.is_empty());
        assert!(auth.authenticate(&headers("Bearer t-1")).await.is_err());
    }
}
