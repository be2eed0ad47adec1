//! Restwire - 声明式路由注册与请求分发
//!
//! 控制器在 `Registry` 上声明 base path、路由、参数绑定、许可证 / 权限范围要求
//! 和中间件；启动时 `Registrar` 校验全部声明，从 `Container` 解析控制器单例，
//! 按固定顺序组装处理链并挂载到 `axum::Router`
//!
//! 领域层 (domain/):
//! - route: HTTP 方法、路径、参数绑定、权限范围、限流等值对象
//! - schema: body / query 校验 schema
//! - identity: 已认证用户
//!
//! 应用层 (application/):
//! - Ports: AuthService, LicenseService, ScopeChecker
//! - Container: 控制器单例容器
//! - RegistrationError: 启动期配置错误
//!
//! 基础设施层 (infrastructure/):
//! - Routing: 元数据仓库、声明 API、中间件组装、参数解析、注册器
//! - HTTP: 请求上下文、错误翻译、统一响应、服务器
//! - Memory: 固定窗口限流计数
//! - Adapters: bearer token 认证、静态许可证、授权范围检查

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{Container, RegistrationError};
pub use config::{load_config, AppConfig};
pub use infrastructure::routing::{Registrar, Registry, RoutingConfig};
