//! Middleware Composer
//!
//! 按固定顺序组装每条路由的处理链：
//! 限流 → 认证 → 许可证 → 权限范围 → 控制器中间件 → 路由中间件 → handler
//!
//! 顺序不可配置，只能决定某一环是否出现

use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Response};

use super::guards::{AuthGuard, LicenseGuard, RateLimitGuard, ScopeGuard};
use super::metadata::{BoundHandler, RouteMetadata};
use super::middleware::Middleware;
use super::resolver::ArgResolver;
use crate::application::{AuthService, LicenseService, ScopeChecker};
use crate::infrastructure::http::{reply, RequestContext};

/// 守卫依赖的外部服务
#[derive(Clone)]
pub struct GuardServices {
    pub auth: Arc<dyn AuthService>,
    pub license: Arc<dyn LicenseService>,
    pub scopes: Arc<dyn ScopeChecker>,
}

/// 组装选项
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// production 模式下才启用限流
    pub production: bool,
    /// 认证与权限范围检查的超时时间
    pub guard_timeout: Duration,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            production: false,
            guard_timeout: Duration::from_secs(10),
        }
    }
}

/// 一条路由的完整处理链
pub struct RouteChain {
    middlewares: Vec<Arc<dyn Middleware>>,
    resolver: ArgResolver,
    handler: BoundHandler,
    uses_templates: bool,
}

impl RouteChain {
    /// 各环节名称（按执行顺序），最后一项为 handler
    pub fn describe(&self) -> Vec<String> {
        let mut stages: Vec<String> = self
            .middlewares
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        stages.push(if self.uses_templates { "handler(raw)" } else { "handler" }.to_string());
        stages
    }

    /// 执行处理链
    ///
    /// 任一中间件拒绝时立即返回它的响应，handler 只在全部放行后调用
    pub async fn dispatch(&self, mut ctx: RequestContext) -> Response {
        for middleware in &self.middlewares {
            if let Err(response) = middleware.handle(&mut ctx).await {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    stage = middleware.name(),
                    status = response.status().as_u16(),
                    "Request short-circuited"
                );
                return response;
            }
        }

        let ctx = Arc::new(ctx);
        let writer = ctx.response().clone();
        let args = match self.resolver.resolve(&ctx) {
            Ok(args) => args,
            Err(e) => return e.into_response(),
        };

        let result = (self.handler)(args).await;

        if self.uses_templates {
            return match result {
                Ok(_) => writer.take_response(),
                Err(e) => e.into_response(),
            };
        }
        reply::send(result, &writer)
    }
}

/// 组装一条路由的处理链
///
/// `controller_middlewares` 必须已经绑定到控制器实例
pub fn compose(
    route: &RouteMetadata,
    controller_middlewares: &[Arc<dyn Middleware>],
    handler: BoundHandler,
    services: &GuardServices,
    options: &ComposeOptions,
) -> RouteChain {
    let mut middlewares: Vec<Arc<dyn Middleware>> = Vec::new();

    if options.production {
        if let Some(rate_limit) = route.rate_limit() {
            middlewares.push(Arc::new(RateLimitGuard::new(rate_limit)));
        }
    }

    if !route.skip_auth() {
        middlewares.push(Arc::new(AuthGuard::new(services.auth.clone(), options.guard_timeout)));
    }

    if let Some(feature) = route.license_feature() {
        middlewares.push(Arc::new(LicenseGuard::new(services.license.clone(), feature)));
    }

    if let Some(access_scope) = route.access_scope() {
        middlewares.push(Arc::new(ScopeGuard::new(
            services.scopes.clone(),
            access_scope.clone(),
            options.guard_timeout,
        )));
    }

    middlewares.extend(controller_middlewares.iter().cloned());
    middlewares.extend(route.middlewares().iter().cloned());

    RouteChain {
        middlewares,
        resolver: ArgResolver::new(route.args().to_vec()),
        handler,
        uses_templates: route.uses_templates(),
    }
}
