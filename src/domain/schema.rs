//! Validation Schemas
//!
//! 请求体/查询参数的校验契约：`safe_parse` 成功时返回已解析的强类型值，
//! 失败时返回结构化错误列表（调用方只取第一条）

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// 一条结构化的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub path: Vec<String>,
}

impl ValidationIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// 校验 schema
///
/// 解析结果以 `Box<dyn Any + Send>` 形式交给参数解析器，
/// handler 侧再按声明的类型取出
pub trait Schema: Send + Sync + 'static {
    /// schema 名称，包含校验方式和目标类型，用于日志、调试输出和绑定比较
    fn name(&self) -> &'static str;

    fn safe_parse(&self, input: &Value) -> Result<Box<dyn Any + Send>, Vec<ValidationIssue>>;
}

/// 仅做 serde 反序列化的 schema
pub struct Deserialized<T>(PhantomData<fn() -> T>);

/// serde 反序列化 + garde 规则校验的 schema
pub struct Validated<T>(PhantomData<fn() -> T>);

/// 构造 `Validated<T>` schema
pub fn validated<T>() -> Arc<dyn Schema>
where
    T: DeserializeOwned + garde::Validate + Send + 'static,
    T::Context: Default,
{
    Arc::new(Validated::<T>(PhantomData))
}

/// 构造 `Deserialized<T>` schema
pub fn deserialized<T>() -> Arc<dyn Schema>
where
    T: DeserializeOwned + Send + 'static,
{
    Arc::new(Deserialized::<T>(PhantomData))
}

fn decode<T: DeserializeOwned>(input: &Value) -> Result<T, Vec<ValidationIssue>> {
    T::deserialize(input)
        .map_err(|e| vec![ValidationIssue::new("invalid_type", e.to_string(), Vec::new())])
}

impl<T> Schema for Deserialized<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn safe_parse(&self, input: &Value) -> Result<Box<dyn Any + Send>, Vec<ValidationIssue>> {
        let value: T = decode(input)?;
        Ok(Box::new(value))
    }
}

impl<T> Schema for Validated<T>
where
    T: DeserializeOwned + garde::Validate + Send + 'static,
    T::Context: Default,
{
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn safe_parse(&self, input: &Value) -> Result<Box<dyn Any + Send>, Vec<ValidationIssue>> {
        let value: T = decode(input)?;
        value.validate().map_err(|report| {
            report
                .iter()
                .map(|(path, error)| {
                    let path = path.to_string();
                    let path = if path.is_empty() {
                        Vec::new()
                    } else {
                        path.split('.').map(str::to_string).collect()
                    };
                    ValidationIssue::new("custom", error.message().to_string(), path)
                })
                .collect::<Vec<_>>()
        })?;
        Ok(Box::new(value))
    }
}
