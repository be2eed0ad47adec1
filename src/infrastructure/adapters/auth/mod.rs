//! Auth Adapters
//!
//! 认证、许可证与权限范围端口的参考实现

mod grant_scope_checker;
mod static_license;
mod token_auth;

pub use grant_scope_checker::{GrantScopeChecker, PROJECT_ID_PARAM};
pub use static_license::StaticLicense;
pub use token_auth::BearerTokenAuth;
