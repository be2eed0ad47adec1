//! 应用层
//!
//! 包含：
//! - ports: 认证、许可证、权限范围检查等外部协作者接口
//! - container: 单例依赖容器
//! - error: 注册期（配置）错误定义

pub mod container;
pub mod error;
pub mod ports;

pub use container::{Container, ContainerError, Instance};
pub use error::RegistrationError;
pub use ports::{AuthError, AuthService, LicenseService, ScopeChecker, ScopeError};
