//! Route Context - Value Objects

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::RouteError;

/// 路由支持的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// 限流配置：`window_ms` 时间窗口内最多 `limit` 次请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub window_ms: u64,
    pub limit: u64,
}

impl RateLimit {
    pub fn new(window_ms: u64, limit: u64) -> Self {
        Self { window_ms, limit }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// 窗口为 0 时计数永远被重置，上限为 0 时拒绝全部请求
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.window_ms == 0 {
            return Err(RouteError::ZeroRateLimitWindow);
        }
        if self.limit == 0 {
            return Err(RouteError::ZeroRateLimit);
        }
        Ok(())
    }
}

/// 权限范围要求
///
/// `global_only = true` 时只接受全局授权，不考虑项目级授权
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessScope {
    pub scope: String,
    pub global_only: bool,
}

impl AccessScope {
    pub fn global(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            global_only: true,
        }
    }

    pub fn project(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            global_only: false,
        }
    }
}

/// 校验路由/控制器路径：非空且以 `/` 开头
pub fn validate_path(path: &str) -> Result<(), RouteError> {
    if path.is_empty() {
        return Err(RouteError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash(path.to_string()));
    }
    Ok(())
}

/// 拼接路径片段
///
/// 结果以 `/` 开头，重复的分隔符被折叠，末尾的分隔符被去掉；
/// 全部为空时返回 `/`
pub fn join_paths<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::from("/");
    for segment in segments {
        for part in segment.split('/').filter(|p| !p.is_empty()) {
            if !joined.ends_with('/') {
                joined.push('/');
            }
            joined.push_str(part);
        }
    }
    joined
}
