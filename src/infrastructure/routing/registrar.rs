//! Dispatcher / Registrar
//!
//! 启动时把仓库里的全部声明校验一遍，解析控制器实例，组装处理链并挂到
//! `axum::Router` 上。任何配置错误都会让整个注册失败，不会挂上半套路由

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::to_bytes,
    extract::{rejection::RawPathParamsRejection, RawPathParams, Request},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Router,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use indexmap::IndexMap;

use super::composer::{compose, ComposeOptions, GuardServices, RouteChain};
use super::metadata::{ControllerMetadata, HandlerBinder, RouteMetadata};
use super::middleware::Middleware;
use super::registry::Registry;
use crate::application::{Container, RegistrationError};
use crate::domain::{join_paths, validate_path, HttpMethod};
use crate::infrastructure::http::{ApiError, RequestContext};

/// 注册配置
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// 全局 API 前缀，例如 `rest`
    pub rest_prefix: String,
    pub production: bool,
    pub guard_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            rest_prefix: "rest".to_string(),
            production: false,
            guard_timeout: Duration::from_secs(10),
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

/// 校验通过、等待挂载的路由
struct Endpoint<'m> {
    handler_name: &'m str,
    route: &'m RouteMetadata,
    method: HttpMethod,
    path: &'m str,
    binder: &'m HandlerBinder,
}

/// 路由注册器
pub struct Registrar<'a> {
    registry: &'a Registry,
    container: &'a Container,
    services: GuardServices,
    config: RoutingConfig,
}

impl<'a> Registrar<'a> {
    pub fn new(
        registry: &'a Registry,
        container: &'a Container,
        services: GuardServices,
        config: RoutingConfig,
    ) -> Self {
        Self {
            registry,
            container,
            services,
            config,
        }
    }

    /// 注册全部控制器
    pub fn register_controllers(&self) -> Result<Router, RegistrationError> {
        let options = ComposeOptions {
            production: self.config.production,
            guard_timeout: self.config.guard_timeout,
        };
        let mut mounted: IndexMap<String, MethodRouter> = IndexMap::new();
        let mut seen: HashSet<(HttpMethod, String)> = HashSet::new();
        // 与 axum 相同的匹配器，非法或冲突的路径模式在这里报错
        let mut patterns: matchit::Router<()> = matchit::Router::new();
        let mut route_count = 0usize;

        for controller in self.registry.controllers() {
            if controller.routes.is_empty() {
                tracing::debug!(
                    controller = controller.name(),
                    "Skipping controller without routes"
                );
                continue;
            }

            let base_path = controller
                .base_path
                .as_deref()
                .ok_or(RegistrationError::MissingBasePath {
                    controller: controller.name(),
                })?;
            validate_path(base_path).map_err(|source| RegistrationError::InvalidBasePath {
                controller: controller.name(),
                source,
            })?;

            let endpoints = validate_routes(controller)?;

            let instance = (controller.resolver)(self.container).map_err(|source| {
                RegistrationError::Container {
                    controller: controller.name(),
                    source,
                }
            })?;
            let mismatch = || RegistrationError::InstanceMismatch {
                controller: controller.name(),
            };

            let controller_middlewares = controller
                .middlewares
                .iter()
                .map(|bind| bind(&instance).ok_or_else(mismatch))
                .collect::<Result<Vec<Arc<dyn Middleware>>, _>>()?;

            let prefix = join_paths([self.config.rest_prefix.as_str(), base_path]);

            for endpoint in endpoints {
                let handler = (endpoint.binder)(&instance).ok_or_else(mismatch)?;
                let full_path = join_paths([prefix.as_str(), endpoint.path]);

                if !seen.insert((endpoint.method, full_path.clone())) {
                    return Err(RegistrationError::DuplicateMount {
                        controller: controller.name(),
                        handler: endpoint.handler_name.to_string(),
                        method: endpoint.method,
                        path: full_path,
                    });
                }

                if !mounted.contains_key(&full_path) {
                    patterns.insert(full_path.clone(), ()).map_err(|source| {
                        RegistrationError::RouteConflict {
                            controller: controller.name(),
                            handler: endpoint.handler_name.to_string(),
                            path: full_path.clone(),
                            source,
                        }
                    })?;
                }

                let chain = compose(
                    endpoint.route,
                    &controller_middlewares,
                    handler,
                    &self.services,
                    &options,
                );
                tracing::info!(
                    controller = controller.name(),
                    handler = endpoint.handler_name,
                    method = %endpoint.method,
                    path = %full_path,
                    chain = ?chain.describe(),
                    "Mounted route"
                );

                let method_router = mounted.entry(full_path).or_insert_with(MethodRouter::new);
                *method_router = std::mem::replace(method_router, MethodRouter::new()).on(
                    method_filter(endpoint.method),
                    dispatch_handler(Arc::new(chain), self.config.body_limit_bytes),
                );
                route_count += 1;
            }
        }

        tracing::info!(routes = route_count, paths = mounted.len(), "Controllers registered");

        Ok(mounted
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router)
            }))
    }
}

/// 校验一个控制器下的全部路由
fn validate_routes(
    controller: &ControllerMetadata,
) -> Result<Vec<Endpoint<'_>>, RegistrationError> {
    let name = controller.name();
    let mut endpoints = Vec::with_capacity(controller.routes.len());

    for (handler_name, route) in controller.routes() {
        if let Some(conflict) = route.conflicts().first() {
            return Err(RegistrationError::ConflictingDeclaration {
                controller: name,
                handler: handler_name.to_string(),
                first_method: conflict.previous.0,
                first_path: conflict.previous.1.clone(),
                second_method: conflict.declared.0,
                second_path: conflict.declared.1.clone(),
            });
        }

        let (Some(method), Some(path)) = (route.method(), route.path()) else {
            return Err(RegistrationError::MissingRouteDeclaration {
                controller: name,
                handler: handler_name.to_string(),
            });
        };

        validate_path(path).map_err(|source| RegistrationError::InvalidRoutePath {
            controller: name,
            handler: handler_name.to_string(),
            source,
        })?;

        if let Some(rate_limit) = route.rate_limit() {
            rate_limit
                .validate()
                .map_err(|source| RegistrationError::InvalidRateLimit {
                    controller: name,
                    handler: handler_name.to_string(),
                    source,
                })?;
        }

        let binder = route.handler.as_ref().ok_or_else(|| RegistrationError::MissingHandler {
            controller: name,
            handler: handler_name.to_string(),
        })?;

        endpoints.push(Endpoint {
            handler_name,
            route,
            method,
            path,
            binder,
        });
    }

    Ok(endpoints)
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// 路径参数；百分号解码后不是合法 UTF-8 时直接返回 400
fn path_params(
    params: Result<RawPathParams, RawPathParamsRejection>,
) -> Result<HashMap<String, String>, Response> {
    match params {
        Ok(params) => Ok(params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()),
        Err(RawPathParamsRejection::MissingPathParams(_)) => Ok(HashMap::new()),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected path parameters");
            Err(ApiError::bad_request(rejection.body_text()).into_response())
        }
    }
}

type DispatchFuture = BoxFuture<'static, Response>;

/// 把处理链包装成 axum handler
fn dispatch_handler(
    chain: Arc<RouteChain>,
    body_limit: usize,
) -> impl Fn(Result<RawPathParams, RawPathParamsRejection>, Request) -> DispatchFuture
       + Clone
       + Send
       + Sync
       + 'static {
    move |params: Result<RawPathParams, RawPathParamsRejection>, request: Request| {
        let chain = chain.clone();
        let params = path_params(params);

        async move {
            let params = match params {
                Ok(params) => params,
                Err(response) => return response,
            };
            let (parts, body) = request.into_parts();
            let body = match to_bytes(body, body_limit).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, limit = body_limit, "Failed to read request body");
                    return ApiError::bad_request("Request body is unreadable or too large")
                        .into_response();
                }
            };
            chain
                .dispatch(RequestContext::from_parts(parts, params, body))
                .await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{AuthError, AuthService, LicenseService, ScopeChecker, ScopeError};
    use crate::domain::{validated, AuthenticatedUser, RateLimit, RouteError};
    use crate::infrastructure::http::Reply;
    use crate::infrastructure::routing::metadata::HandlerResult;
    use crate::infrastructure::routing::resolver::HandlerArgs;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header::RETRY_AFTER, HeaderMap, StatusCode};
    use garde::Validate;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// `Bearer reader` 带 widget:read，`Bearer nobody` 没有任何权限
    struct HeaderAuth;

    #[async_trait]
    impl AuthService for HeaderAuth {
        async fn authenticate(
            &self,
            headers: &HeaderMap,
        ) -> Result<AuthenticatedUser, AuthError> {
            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                Some("Bearer reader") => {
                    Ok(AuthenticatedUser::new("reader").with_global_scopes(["widget:read"]))
                }
                Some("Bearer nobody") => Ok(AuthenticatedUser::new("nobody")),
                Some(_) => Err(AuthError::InvalidCredentials),
                None => Err(AuthError::MissingCredentials),
            }
        }
    }

    struct NoFeatures;

    impl LicenseService for NoFeatures {
        fn is_feature_enabled(&self, _feature: &str) -> bool {
            false
        }
    }

    struct GlobalScopes;

    #[async_trait]
    impl ScopeChecker for GlobalScopes {
        async fn has_scope(
            &self,
            user: &AuthenticatedUser,
            scopes: &[&str],
            _global_only: bool,
            _route_params: &HashMap<String, String>,
        ) -> Result<bool, ScopeError> {
            Ok(scopes.iter().any(|scope| user.has_global_scope(scope)))
        }
    }

    fn services() -> GuardServices {
        GuardServices {
            auth: Arc::new(HeaderAuth),
            license: Arc::new(NoFeatures),
            scopes: Arc::new(GlobalScopes),
        }
    }

    struct WidgetController {
        owner: &'static str,
    }

    #[derive(Deserialize, Validate)]
    struct WidgetQuery {
        #[garde(length(min = 1))]
        verbose: String,
    }

    impl WidgetController {
        async fn get_widget(self: Arc<Self>, mut args: HandlerArgs) -> HandlerResult {
            let id = args.param(0)?.unwrap_or_default();
            let query: WidgetQuery = args.take(1)?;
            Reply::json(&json!({ "id": id, "verbose": query.verbose, "owner": self.owner }))
        }

        async fn raw(self: Arc<Self>, args: HandlerArgs) -> HandlerResult {
            let request = args.request(0)?;
            args.response(1)?;
            Ok(Reply::Json(json!({ "args": args.len(), "path": request.path() })))
        }
    }

    struct EmptyController;

    fn container() -> Container {
        let container = Container::new();
        container.provide(WidgetController { owner: "acme" });
        container
    }

    fn widget_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .controller::<WidgetController>()
            .rest_controller("/widgets")
            .route("get_widget", |route| {
                route
                    .get("/:id")
                    .param(0, "id")
                    .query(1, validated::<WidgetQuery>())
                    .global_scope("widget:read")
                    .handler(WidgetController::get_widget)
            })
            .route("raw", |route| route.get("/").skip_auth().handler(WidgetController::raw));
        registry
    }

    fn register(registry: &Registry, container: &Container) -> Result<Router, RegistrationError> {
        register_with(registry, container, RoutingConfig::default())
    }

    fn register_with(
        registry: &Registry,
        container: &Container,
        config: RoutingConfig,
    ) -> Result<Router, RegistrationError> {
        Registrar::new(registry, container, services(), config).register_controllers()
    }

    async fn call(router: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_widget_without_scope_is_forbidden() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, body) = call(router, "/rest/widgets/42?verbose=yes", Some("nobody")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            json!({
                "status": "error",
                "message": "User is missing a scope required to perform this action"
            })
        );
    }

    #[tokio::test]
    async fn test_widget_without_credentials_is_unauthorized() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, _) = call(router, "/rest/widgets/42?verbose=yes", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_widget_with_invalid_query_is_bad_request() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, body) = call(router, "/rest/widgets/42?verbose=", Some("reader")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "custom");
        assert_eq!(body["path"], json!(["verbose"]));
    }

    #[tokio::test]
    async fn test_widget_success() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, body) = call(router, "/rest/widgets/42?verbose=yes", Some("reader")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "data": { "id": "42", "verbose": "yes", "owner": "acme" } })
        );
    }

    #[tokio::test]
    async fn test_handler_without_bindings_gets_request_and_response() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, body) = call(router, "/rest/widgets", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "args": 2, "path": "/rest/widgets" } }));
    }

    #[tokio::test]
    async fn test_same_path_different_methods_share_a_path() {
        let mut registry = widget_registry();
        registry
            .route::<WidgetController>("delete_widget")
            .delete("/:id")
            .skip_auth()
            .handler(|_: Arc<WidgetController>, _: HandlerArgs| async {
                HandlerResult::Ok(Reply::empty())
            });

        let router = register(&registry, &container()).unwrap();
        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/rest/widgets/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_controller_without_routes_mounts_nothing() {
        let mut registry = Registry::new();
        registry.get_controller_metadata::<EmptyController>();

        let router = register(&registry, &Container::new()).unwrap();
        let (status, _) = call(router, "/rest", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_base_path_is_an_error() {
        let mut registry = Registry::new();
        registry
            .route::<WidgetController>("raw")
            .get("/")
            .handler(WidgetController::raw);

        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingBasePath { .. }));
        assert!(err.controller().ends_with("WidgetController"));
    }

    #[test]
    fn test_invalid_route_path_is_an_error() {
        let mut registry = Registry::new();
        registry
            .controller::<WidgetController>()
            .rest_controller("/widgets")
            .route("raw", |route| route.get("raw").handler(WidgetController::raw));

        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidRoutePath { .. }));
    }

    #[test]
    fn test_missing_declaration_and_handler_are_errors() {
        let mut registry = Registry::new();
        registry
            .controller::<WidgetController>()
            .rest_controller("/widgets")
            .route("raw", |route| route.req(0));
        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingRouteDeclaration { .. }));

        registry.route::<WidgetController>("raw").get("/");
        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingHandler { .. }));
    }

    #[test]
    fn test_conflicting_declaration_is_an_error() {
        let mut registry = widget_registry();
        registry.route::<WidgetController>("raw").post("/other");

        let err = register(&registry, &container()).unwrap_err();
        match err {
            RegistrationError::ConflictingDeclaration {
                first_method,
                second_method,
                second_path,
                ..
            } => {
                assert_eq!(first_method, HttpMethod::Get);
                assert_eq!(second_method, HttpMethod::Post);
                assert_eq!(second_path, "/other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identical_redeclaration_registers() {
        let mut registry = widget_registry();
        registry.route::<WidgetController>("raw").get("/");
        assert!(register(&registry, &container()).is_ok());
    }

    #[test]
    fn test_duplicate_mount_is_an_error() {
        let mut registry = widget_registry();
        registry
            .route::<WidgetController>("raw_again")
            .get("//")
            .handler(WidgetController::raw);

        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::DuplicateMount { method: HttpMethod::Get, ref path, .. }
                if path == "/rest/widgets"
        ));
    }

    #[test]
    fn test_unresolvable_controller_is_an_error() {
        let err = register(&widget_registry(), &Container::new()).unwrap_err();
        assert!(matches!(err, RegistrationError::Container { .. }));
    }

    #[test]
    fn test_param_name_clash_is_an_error() {
        let mut registry = widget_registry();
        registry
            .route::<WidgetController>("delete_widget")
            .delete("/:widgetId")
            .handler(WidgetController::raw);

        let err = register(&registry, &container()).unwrap_err();
        match err {
            RegistrationError::RouteConflict {
                handler, path, source, ..
            } => {
                assert_eq!(handler, "delete_widget");
                assert_eq!(path, "/rest/widgets/:widgetId");
                assert!(matches!(source, matchit::InsertError::Conflict { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unnamed_param_is_an_error() {
        let mut registry = Registry::new();
        registry
            .controller::<WidgetController>()
            .rest_controller("/widgets")
            .route("unnamed", |route| route.get("/:").handler(WidgetController::raw));

        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::RouteConflict {
                source: matchit::InsertError::UnnamedParam,
                ..
            }
        ));
        assert!(err.controller().ends_with("WidgetController"));
    }

    #[test]
    fn test_zero_rate_limit_is_an_error() {
        let mut registry = widget_registry();
        registry
            .route::<WidgetController>("raw")
            .rate_limit(RateLimit::new(0, 10));

        let err = register(&registry, &container()).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidRateLimit {
                source: RouteError::ZeroRateLimitWindow,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_path_param_is_bad_request() {
        let router = register(&widget_registry(), &container()).unwrap();
        let (status, body) = call(router, "/rest/widgets/%FF?verbose=yes", Some("reader")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    /// 记录 handler 被调用的次数
    #[derive(Default)]
    struct GadgetController {
        calls: AtomicUsize,
    }

    #[derive(Deserialize, Validate)]
    struct NewGadget {
        #[garde(length(min = 2))]
        name: String,
    }

    impl GadgetController {
        async fn create(self: Arc<Self>, mut args: HandlerArgs) -> HandlerResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gadget: NewGadget = args.take(0)?;
            Reply::json(&json!({ "name": gadget.name }))
        }

        async fn ping(self: Arc<Self>, _args: HandlerArgs) -> HandlerResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::empty())
        }
    }

    fn gadget_setup() -> (Registry, Container) {
        let mut registry = Registry::new();
        registry
            .controller::<GadgetController>()
            .rest_controller("/gadgets")
            .route("create", |route| {
                route
                    .post("/")
                    .skip_auth()
                    .body(0, validated::<NewGadget>())
                    .handler(GadgetController::create)
            })
            .route("ping", |route| {
                route
                    .get("/ping")
                    .skip_auth()
                    .rate_limit(RateLimit::new(60_000, 1))
                    .handler(GadgetController::ping)
            });

        let container = Container::new();
        container.provide(GadgetController::default());
        (registry, container)
    }

    fn gadget_calls(container: &Container) -> usize {
        container
            .resolve::<GadgetController>()
            .unwrap()
            .calls
            .load(Ordering::SeqCst)
    }

    async fn post_gadget(router: Router, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rest/gadgets")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn small_body_config() -> RoutingConfig {
        RoutingConfig {
            body_limit_bytes: 64,
            ..RoutingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let (registry, container) = gadget_setup();
        let router = register_with(&registry, &container, small_body_config()).unwrap();

        let (status, body) = post_gadget(router, r#"{"name":"bolt"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "name": "bolt" } }));
        assert_eq!(gadget_calls(&container), 1);
    }

    #[tokio::test]
    async fn test_rejected_body_skips_handler() {
        let (registry, container) = gadget_setup();
        let router = register_with(&registry, &container, small_body_config()).unwrap();

        let (status, body) = post_gadget(router, r#"{"name":"b"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "custom");
        assert_eq!(body["path"], json!(["name"]));
        assert_eq!(gadget_calls(&container), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_skips_handler() {
        let (registry, container) = gadget_setup();
        let router = register_with(&registry, &container, small_body_config()).unwrap();

        let (status, body) = post_gadget(router, r#"{"name": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "error", "message": "Invalid JSON body" }));
        assert_eq!(gadget_calls(&container), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_skips_handler() {
        let (registry, container) = gadget_setup();
        let router = register_with(&registry, &container, small_body_config()).unwrap();

        let oversized = format!(r#"{{"name":"{}"}}"#, "x".repeat(128));
        let (status, body) = post_gadget(router, &oversized).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request body is unreadable or too large");
        assert_eq!(gadget_calls(&container), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_applies_in_production() {
        let (registry, container) = gadget_setup();
        let config = RoutingConfig {
            production: true,
            ..RoutingConfig::default()
        };
        let router = register_with(&registry, &container, config).unwrap();
        let ping = || Request::builder().uri("/rest/gadgets/ping").body(Body::empty()).unwrap();

        let first = router.clone().oneshot(ping()).await.unwrap();
        assert_eq!(first.status(), StatusCode::NO_CONTENT);

        let second = router.oneshot(ping()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(RETRY_AFTER));
        assert_eq!(gadget_calls(&container), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_off_outside_production() {
        let (registry, container) = gadget_setup();
        let router = register(&registry, &container).unwrap();
        let ping = || Request::builder().uri("/rest/gadgets/ping").body(Body::empty()).unwrap();

        for _ in 0..3 {
            let response = router.clone().oneshot(ping()).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        assert_eq!(gadget_calls(&container), 3);
    }
}
