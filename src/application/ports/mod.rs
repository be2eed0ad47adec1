//! Ports - 路由核心依赖的外部协作者接口
//!
//! 具体实现在 infrastructure/adapters 层

pub mod auth;
pub mod license;
pub mod scope;

pub use auth::{AuthError, AuthService};
pub use license::LicenseService;
pub use scope::{ScopeChecker, ScopeError};
