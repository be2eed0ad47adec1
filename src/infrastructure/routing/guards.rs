//! Guards
//!
//! 路由链前部的守卫：限流、认证、许可证、权限范围

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::IntoResponse;

use super::middleware::{Flow, Middleware};
use crate::application::{AuthService, LicenseService, ScopeChecker};
use crate::domain::{AccessScope, RateLimit};
use crate::infrastructure::http::{
    ApiError, RequestContext, LICENSE_MISSING_MESSAGE, MISSING_SCOPE_MESSAGE,
};
use crate::infrastructure::memory::{Decision, FixedWindowRateLimiter};

/// 限流守卫，每条路由一个独立的计数器
pub struct RateLimitGuard {
    limiter: FixedWindowRateLimiter,
}

impl RateLimitGuard {
    pub fn new(rate_limit: RateLimit) -> Self {
        Self {
            limiter: FixedWindowRateLimiter::new(rate_limit),
        }
    }
}

#[async_trait]
impl Middleware for RateLimitGuard {
    fn name(&self) -> &str {
        "rate-limit"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        match self.limiter.try_acquire(&ctx.caller_key()) {
            Decision::Allowed { .. } => Ok(()),
            Decision::Limited { retry_after } => {
                Err(ApiError::TooManyRequests { retry_after }.into_response())
            }
        }
    }
}

/// 认证守卫：成功后把用户写入上下文
pub struct AuthGuard {
    service: Arc<dyn AuthService>,
    timeout: Duration,
}

impl AuthGuard {
    pub fn new(service: Arc<dyn AuthService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }
}

#[async_trait]
impl Middleware for AuthGuard {
    fn name(&self) -> &str {
        "auth"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        let outcome =
            tokio::time::timeout(self.timeout, self.service.authenticate(ctx.headers())).await;
        match outcome {
            Ok(Ok(user)) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    user_id = %user.id,
                    "Caller authenticated"
                );
                ctx.set_user(user);
                Ok(())
            }
            Ok(Err(e)) => Err(ApiError::from(e).into_response()),
            Err(_) => Err(
                ApiError::ServiceUnavailable("authentication timed out".to_string())
                    .into_response(),
            ),
        }
    }
}

/// 许可证守卫
pub struct LicenseGuard {
    service: Arc<dyn LicenseService>,
    feature: String,
}

impl LicenseGuard {
    pub fn new(service: Arc<dyn LicenseService>, feature: impl Into<String>) -> Self {
        Self {
            service,
            feature: feature.into(),
        }
    }
}

#[async_trait]
impl Middleware for LicenseGuard {
    fn name(&self) -> &str {
        "license"
    }

    async fn handle(&self, _ctx: &mut RequestContext) -> Flow {
        if !self.service.is_feature_enabled(&self.feature) {
            tracing::info!(feature = %self.feature, "Feature not covered by license");
            return Err(ApiError::forbidden(LICENSE_MISSING_MESSAGE).into_response());
        }
        Ok(())
    }
}

/// 权限范围守卫，必须排在认证守卫之后
pub struct ScopeGuard {
    checker: Arc<dyn ScopeChecker>,
    access_scope: AccessScope,
    timeout: Duration,
}

impl ScopeGuard {
    pub fn new(
        checker: Arc<dyn ScopeChecker>,
        access_scope: AccessScope,
        timeout: Duration,
    ) -> Self {
        Self {
            checker,
            access_scope,
            timeout,
        }
    }
}

#[async_trait]
impl Middleware for ScopeGuard {
    fn name(&self) -> &str {
        "scope"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        let Some(user) = ctx.user() else {
            return Err(ApiError::Unauthenticated.into_response());
        };

        let AccessScope { scope, global_only } = &self.access_scope;
        let scopes = [scope.as_str()];
        let check = self
            .checker
            .has_scope(user, &scopes, *global_only, ctx.params());

        match tokio::time::timeout(self.timeout, check).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => {
                tracing::info!(user_id = %user.id, scope = %scope, "Missing scope");
                Err(ApiError::forbidden(MISSING_SCOPE_MESSAGE).into_response())
            }
            Ok(Err(e)) => Err(ApiError::from(e).into_response()),
            Err(_) => Err(
                ApiError::ServiceUnavailable("scope check timed out".to_string()).into_response(),
            ),
        }
    }
}
