//! Configuration Types
//!
//! 定义所有配置结构体

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 全局路由前缀
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// 运行模式，production 下才启用限流
    #[serde(default)]
    pub mode: RunMode,

    /// 守卫配置
    #[serde(default)]
    pub guards: GuardsConfig,

    /// 许可证配置
    #[serde(default)]
    pub license: LicenseConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 路由前缀配置
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// REST 控制器的全局前缀
    #[serde(default = "default_rest_prefix")]
    pub rest: String,
}

fn default_rest_prefix() -> String {
    "rest".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            rest: default_rest_prefix(),
        }
    }
}

/// 运行模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => write!(f, "development"),
            RunMode::Production => write!(f, "production"),
        }
    }
}

/// 守卫配置
#[derive(Debug, Clone, Deserialize)]
pub struct GuardsConfig {
    /// 认证与权限范围检查的超时（毫秒）
    #[serde(default = "default_guard_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_guard_timeout_ms() -> u64 {
    10_000
}

impl Default for GuardsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_guard_timeout_ms(),
        }
    }
}

impl GuardsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 许可证配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseConfig {
    /// 已开通的特性
    #[serde(default)]
    pub features: Vec<String>,
}

/// 认证配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// 静态 bearer token 列表
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// 单个 bearer token 及其代表的用户
#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub global_scopes: Vec<String>,
    /// project id -> scopes
    #[serde(default)]
    pub project_scopes: HashMap<String, Vec<String>>,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token", &"***")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("global_scopes", &self.global_scopes)
            .field("project_scopes", &self.project_scopes)
            .finish()
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
