//! Route / Controller Metadata
//!
//! 声明阶段写入、注册阶段只读的元数据

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use super::middleware::Middleware;
use super::resolver::HandlerArgs;
use crate::application::{Container, ContainerError, Instance};
use crate::domain::{AccessScope, ArgBinding, HttpMethod, RateLimit};
use crate::infrastructure::http::{ApiError, Reply};

/// handler 返回值
pub type HandlerResult = Result<Reply, ApiError>;

/// 已绑定控制器实例的 handler
pub type BoundHandler = Arc<dyn Fn(HandlerArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

pub(crate) type HandlerBinder = Arc<dyn Fn(&Instance) -> Option<BoundHandler> + Send + Sync>;

pub(crate) type MiddlewareBinder =
    Arc<dyn Fn(&Instance) -> Option<Arc<dyn Middleware>> + Send + Sync>;

pub(crate) type InstanceResolver = fn(&Container) -> Result<Instance, ContainerError>;

/// 路由声明选项
#[derive(Clone, Default)]
pub struct RouteOptions {
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub uses_templates: bool,
    /// 为 true 时不校验认证，上下文中也不会有用户
    pub skip_auth: bool,
    /// 仅在 production 模式下生效
    pub rate_limit: Option<RateLimit>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn uses_templates(mut self) -> Self {
        self.uses_templates = true;
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }
}

/// 同一 handler 上两次不一致的方法/路径声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConflict {
    pub previous: (HttpMethod, String),
    pub declared: (HttpMethod, String),
}

/// 单个 handler 的路由元数据
#[derive(Clone, Default)]
pub struct RouteMetadata {
    pub(crate) method: Option<HttpMethod>,
    pub(crate) path: Option<String>,
    pub(crate) args: Vec<Option<ArgBinding>>,
    pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
    pub(crate) uses_templates: bool,
    pub(crate) skip_auth: bool,
    pub(crate) rate_limit: Option<RateLimit>,
    pub(crate) license_feature: Option<String>,
    pub(crate) access_scope: Option<AccessScope>,
    pub(crate) handler: Option<HandlerBinder>,
    /// 与已有声明不一致的方法/路径重复声明
    pub(crate) conflicts: Vec<EndpointConflict>,
}

impl RouteMetadata {
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn args(&self) -> &[Option<ArgBinding>] {
        &self.args
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    pub fn uses_templates(&self) -> bool {
        self.uses_templates
    }

    pub fn skip_auth(&self) -> bool {
        self.skip_auth
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit
    }

    pub fn license_feature(&self) -> Option<&str> {
        self.license_feature.as_deref()
    }

    pub fn access_scope(&self) -> Option<&AccessScope> {
        self.access_scope.as_ref()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn conflicts(&self) -> &[EndpointConflict] {
        &self.conflicts
    }

    /// 写入方法/路径与选项
    pub(crate) fn declare(&mut self, method: HttpMethod, path: String, options: RouteOptions) {
        self.set_endpoint(method, path);
        self.middlewares = options.middlewares;
        self.uses_templates = options.uses_templates;
        self.skip_auth = options.skip_auth;
        self.rate_limit = options.rate_limit;
    }

    /// 写入方法/路径
    ///
    /// 相同的方法和路径重复声明不改变任何东西；不同的值会覆盖，
    /// 同时记录冲突，由注册阶段报错
    pub(crate) fn set_endpoint(&mut self, method: HttpMethod, path: String) {
        if let (Some(current_method), Some(current_path)) = (self.method, self.path.as_ref()) {
            if current_method != method || *current_path != path {
                self.conflicts.push(EndpointConflict {
                    previous: (current_method, current_path.clone()),
                    declared: (method, path.clone()),
                });
            }
        }
        self.method = Some(method);
        self.path = Some(path);
    }

    pub(crate) fn set_arg(&mut self, index: usize, binding: ArgBinding) {
        if self.args.len() <= index {
            self.args.resize(index + 1, None);
        }
        self.args[index] = Some(binding);
    }
}

impl fmt::Debug for RouteMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMetadata")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("args", &self.args)
            .field("middlewares", &self.middlewares.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("uses_templates", &self.uses_templates)
            .field("skip_auth", &self.skip_auth)
            .field("rate_limit", &self.rate_limit)
            .field("license_feature", &self.license_feature)
            .field("access_scope", &self.access_scope)
            .field("has_handler", &self.handler.is_some())
            .field("conflicts", &self.conflicts)
            .finish()
    }
}

/// 控制器元数据
#[derive(Clone)]
pub struct ControllerMetadata {
    pub(crate) name: &'static str,
    pub(crate) base_path: Option<String>,
    pub(crate) middlewares: Vec<MiddlewareBinder>,
    pub(crate) routes: IndexMap<String, RouteMetadata>,
    pub(crate) resolver: InstanceResolver,
}

impl ControllerMetadata {
    pub(crate) fn new(name: &'static str, resolver: InstanceResolver) -> Self {
        Self {
            name,
            base_path: None,
            middlewares: Vec::new(),
            routes: IndexMap::new(),
            resolver,
        }
    }

    /// 控制器类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 生效的 base path；未声明时为 `/`
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or("/")
    }

    /// 是否显式声明过 base path
    pub fn has_base_path(&self) -> bool {
        self.base_path.is_some()
    }

    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, &RouteMetadata)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn route(&self, handler_name: &str) -> Option<&RouteMetadata> {
        self.routes.get(handler_name)
    }

    pub(crate) fn route_mut(&mut self, handler_name: &str) -> &mut RouteMetadata {
        self.routes.entry(handler_name.to_string()).or_default()
    }
}

impl fmt::Debug for ControllerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerMetadata")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .field("middlewares", &self.middlewares.len())
            .field("routes", &self.routes)
            .finish()
    }
}
