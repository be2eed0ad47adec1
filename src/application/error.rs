//! 注册期错误定义
//!
//! 这些都是配置错误：在启动阶段出现，必须中止启动并指出出问题的控制器

use thiserror::Error;

use super::container::ContainerError;
use crate::domain::{HttpMethod, RouteError};

/// 路由注册错误
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// 控制器声明了路由，但没有声明 base path
    #[error("controller {controller} is missing a rest controller declaration (base path)")]
    MissingBasePath { controller: &'static str },

    #[error("controller {controller} has an invalid base path: {source}")]
    InvalidBasePath {
        controller: &'static str,
        #[source]
        source: RouteError,
    },

    #[error("route {controller}::{handler} has no HTTP method/path declaration")]
    MissingRouteDeclaration {
        controller: &'static str,
        handler: String,
    },

    #[error("route {controller}::{handler} has an invalid path: {source}")]
    InvalidRoutePath {
        controller: &'static str,
        handler: String,
        #[source]
        source: RouteError,
    },

    #[error("route {controller}::{handler} has no handler function")]
    MissingHandler {
        controller: &'static str,
        handler: String,
    },

    /// 同一个 handler 被声明了两个不同的方法/路径
    #[error(
        "route {controller}::{handler} is declared more than once: \
         {first_method} {first_path} vs {second_method} {second_path}"
    )]
    ConflictingDeclaration {
        controller: &'static str,
        handler: String,
        first_method: HttpMethod,
        first_path: String,
        second_method: HttpMethod,
        second_path: String,
    },

    #[error("route {controller}::{handler} has an invalid rate limit: {source}")]
    InvalidRateLimit {
        controller: &'static str,
        handler: String,
        #[source]
        source: RouteError,
    },

    #[error("{method} {path} is mounted twice (second by {controller}::{handler})")]
    DuplicateMount {
        controller: &'static str,
        handler: String,
        method: HttpMethod,
        path: String,
    },

    /// 路径模式非法，或与已挂载的路径在同一位置使用了不同的参数名
    #[error("route {controller}::{handler} cannot be mounted at {path}: {source}")]
    RouteConflict {
        controller: &'static str,
        handler: String,
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("failed to resolve controller {controller}: {source}")]
    Container {
        controller: &'static str,
        #[source]
        source: ContainerError,
    },

    #[error("controller {controller} resolved to an instance of another type")]
    InstanceMismatch { controller: &'static str },
}

impl RegistrationError {
    /// 出错的控制器
    pub fn controller(&self) -> &'static str {
        match self {
            RegistrationError::MissingBasePath { controller }
            | RegistrationError::InvalidBasePath { controller, .. }
            | RegistrationError::MissingRouteDeclaration { controller, .. }
            | RegistrationError::InvalidRoutePath { controller, .. }
            | RegistrationError::MissingHandler { controller, .. }
            | RegistrationError::ConflictingDeclaration { controller, .. }
            | RegistrationError::InvalidRateLimit { controller, .. }
            | RegistrationError::DuplicateMount { controller, .. }
            | RegistrationError::RouteConflict { controller, .. }
            | RegistrationError::Container { controller, .. }
            | RegistrationError::InstanceMismatch { controller } => controller,
        }
    }
}
