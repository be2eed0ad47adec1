//! Domain Layer - 领域层
//!
//! - Route Context: 路由声明的值对象（方法、路径、限流、权限范围、参数绑定）
//! - Schema: 请求参数校验契约
//! - Identity: 已认证用户

pub mod identity;
pub mod route;
pub mod schema;

pub use identity::AuthenticatedUser;
pub use route::{
    join_paths, validate_path, AccessScope, ArgBinding, ArgKind, HttpMethod, RateLimit, RouteError,
};
pub use schema::{deserialized, validated, Deserialized, Schema, Validated, ValidationIssue};
