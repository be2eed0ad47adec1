//! Annotation API
//!
//! 控制器与路由的声明式构建器。每个方法只写元数据里的一个字段
//! （或向一个列表追加），声明时不做任何校验，校验统一在注册阶段进行
//!
//! ```ignore
//! registry
//!     .controller::<WidgetController>()
//!     .rest_controller("/widgets")
//!     .route("get_widget", |route| {
//!         route
//!             .get("/:id")
//!             .param(0, "id")
//!             .query(1, validated::<WidgetQuery>())
//!             .global_scope("widget:read")
//!             .handler(WidgetController::get_widget)
//!     });
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::FutureExt;

use super::metadata::{
    BoundHandler, ControllerMetadata, HandlerBinder, HandlerResult, MiddlewareBinder, RouteMetadata,
    RouteOptions,
};
use super::middleware::{BoundMiddleware, ControllerMiddleware, Middleware};
use super::resolver::HandlerArgs;
use crate::application::Instance;
use crate::domain::{AccessScope, ArgBinding, HttpMethod, RateLimit, Schema};

/// 控制器级声明
pub struct ControllerDecl<'r, C> {
    metadata: &'r mut ControllerMetadata,
    _controller: PhantomData<fn() -> C>,
}

impl<'r, C> ControllerDecl<'r, C>
where
    C: Send + Sync + 'static,
{
    pub(crate) fn new(metadata: &'r mut ControllerMetadata) -> Self {
        Self {
            metadata,
            _controller: PhantomData,
        }
    }

    /// 声明为 REST 控制器并设置 base path
    pub fn rest_controller(self, base_path: impl Into<String>) -> Self {
        self.metadata.base_path = Some(base_path.into());
        self
    }

    /// 追加控制器级中间件，注册时绑定到控制器实例
    pub fn middleware(self, middleware: impl ControllerMiddleware<C>) -> Self {
        let middleware: Arc<dyn ControllerMiddleware<C>> = Arc::new(middleware);
        let binder: MiddlewareBinder = Arc::new(move |instance: &Instance| {
            let controller = instance.clone().downcast::<C>().ok()?;
            let bound: Arc<dyn Middleware> =
                Arc::new(BoundMiddleware::new(controller, middleware.clone()));
            Some(bound)
        });
        self.metadata.middlewares.push(binder);
        self
    }

    /// 声明一个 handler 的路由
    pub fn route<F>(self, handler_name: &str, declare: F) -> Self
    where
        F: FnOnce(RouteDecl<'_, C>) -> RouteDecl<'_, C>,
    {
        declare(RouteDecl::new(self.metadata.route_mut(handler_name)));
        self
    }
}

/// 单个 handler 的路由声明
pub struct RouteDecl<'r, C> {
    route: &'r mut RouteMetadata,
    _controller: PhantomData<fn() -> C>,
}

impl<'r, C> RouteDecl<'r, C>
where
    C: Send + Sync + 'static,
{
    pub(crate) fn new(route: &'r mut RouteMetadata) -> Self {
        Self {
            route,
            _controller: PhantomData,
        }
    }

    /// 完整声明：方法、路径和路由选项
    pub fn declare(
        self,
        method: HttpMethod,
        path: impl Into<String>,
        options: RouteOptions,
    ) -> Self {
        self.route.declare(method, path.into(), options);
        self
    }

    pub fn get(self, path: impl Into<String>) -> Self {
        self.endpoint(HttpMethod::Get, path)
    }

    pub fn post(self, path: impl Into<String>) -> Self {
        self.endpoint(HttpMethod::Post, path)
    }

    pub fn put(self, path: impl Into<String>) -> Self {
        self.endpoint(HttpMethod::Put, path)
    }

    pub fn patch(self, path: impl Into<String>) -> Self {
        self.endpoint(HttpMethod::Patch, path)
    }

    pub fn delete(self, path: impl Into<String>) -> Self {
        self.endpoint(HttpMethod::Delete, path)
    }

    fn endpoint(self, method: HttpMethod, path: impl Into<String>) -> Self {
        self.route.set_endpoint(method, path.into());
        self
    }

    /// 绑定第 `index` 个参数
    pub fn arg(self, index: usize, binding: ArgBinding) -> Self {
        self.route.set_arg(index, binding);
        self
    }

    pub fn req(self, index: usize) -> Self {
        self.arg(index, ArgBinding::Req)
    }

    pub fn res(self, index: usize) -> Self {
        self.arg(index, ArgBinding::Res)
    }

    pub fn body(self, index: usize, schema: Arc<dyn Schema>) -> Self {
        self.arg(index, ArgBinding::body(schema))
    }

    pub fn query(self, index: usize, schema: Arc<dyn Schema>) -> Self {
        self.arg(index, ArgBinding::query(schema))
    }

    pub fn param(self, index: usize, key: impl Into<String>) -> Self {
        self.arg(index, ArgBinding::param(key))
    }

    /// 需要许可证特性
    pub fn licensed(self, feature: impl Into<String>) -> Self {
        self.route.license_feature = Some(feature.into());
        self
    }

    /// 只接受全局授权的权限范围
    pub fn global_scope(self, scope: impl Into<String>) -> Self {
        self.access_scope(AccessScope::global(scope))
    }

    /// 全局或项目授权均可
    pub fn project_scope(self, scope: impl Into<String>) -> Self {
        self.access_scope(AccessScope::project(scope))
    }

    pub fn access_scope(self, access_scope: AccessScope) -> Self {
        self.route.access_scope = Some(access_scope);
        self
    }

    pub fn rate_limit(self, rate_limit: RateLimit) -> Self {
        self.route.rate_limit = Some(rate_limit);
        self
    }

    pub fn skip_auth(self) -> Self {
        self.route.skip_auth = true;
        self
    }

    /// handler 自己写响应，返回值不再经过统一的发送逻辑
    pub fn uses_templates(self) -> Self {
        self.route.uses_templates = true;
        self
    }

    /// 追加路由级中间件
    pub fn use_middleware(self, middleware: impl Middleware) -> Self {
        self.route.middlewares.push(Arc::new(middleware));
        self
    }

    /// 设置 handler，注册时绑定到解析出的控制器实例
    pub fn handler<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<C>, HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let binder: HandlerBinder = Arc::new(move |instance: &Instance| {
            let controller = instance.clone().downcast::<C>().ok()?;
            let handler = handler.clone();
            let bound: BoundHandler =
                Arc::new(move |args: HandlerArgs| handler(controller.clone(), args).boxed());
            Some(bound)
        });
        self.route.handler = Some(binder);
        self
    }
}
