//! Argument Resolver
//!
//! 按声明的绑定规则从请求中逐个取出 handler 参数；
//! body / query 校验失败时返回 400 和第一条校验错误，handler 不会被调用

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::domain::{ArgBinding, ArgKind, ValidationIssue};
use crate::infrastructure::http::{ApiError, RequestContext, ResponseWriter};

/// 已解析的单个参数
pub enum ArgValue {
    /// 原始请求
    Request(Arc<RequestContext>),
    /// 原始响应
    Response(ResponseWriter),
    /// 未声明绑定的位置：原始请求/响应对
    Raw(Arc<RequestContext>, ResponseWriter),
    /// 路径参数，不存在时为 None
    Param(Option<String>),
    /// 校验通过的 body / query
    Parsed(Box<dyn Any + Send>),
}

impl ArgValue {
    fn describe(&self) -> &'static str {
        match self {
            ArgValue::Request(_) => "request",
            ArgValue::Response(_) => "response",
            ArgValue::Raw(..) => "raw request/response",
            ArgValue::Param(_) => "path parameter",
            ArgValue::Parsed(_) => "parsed value",
        }
    }
}

/// 传给 handler 的参数列表，下标与声明的参数位置一致
pub struct HandlerArgs {
    values: Vec<Option<ArgValue>>,
}

impl HandlerArgs {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn kind_at(&self, index: usize) -> Option<&'static str> {
        self.values.get(index)?.as_ref().map(ArgValue::describe)
    }

    fn slot(&self, index: usize) -> Result<&ArgValue, ApiError> {
        self.values
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                ApiError::internal(format!("handler argument {} is not available", index))
            })
    }

    fn mismatch(index: usize, expected: &str, found: &ArgValue) -> ApiError {
        ApiError::internal(format!(
            "handler argument {} is a {}, not a {}",
            index,
            found.describe(),
            expected
        ))
    }

    /// 原始请求
    pub fn request(&self, index: usize) -> Result<Arc<RequestContext>, ApiError> {
        match self.slot(index)? {
            ArgValue::Request(req) | ArgValue::Raw(req, _) => Ok(req.clone()),
            other => Err(Self::mismatch(index, "request", other)),
        }
    }

    /// 原始响应
    pub fn response(&self, index: usize) -> Result<ResponseWriter, ApiError> {
        match self.slot(index)? {
            ArgValue::Response(res) | ArgValue::Raw(_, res) => Ok(res.clone()),
            other => Err(Self::mismatch(index, "response", other)),
        }
    }

    /// 路径参数
    pub fn param(&self, index: usize) -> Result<Option<String>, ApiError> {
        match self.slot(index)? {
            ArgValue::Param(value) => Ok(value.clone()),
            other => Err(Self::mismatch(index, "path parameter", other)),
        }
    }

    /// 取出校验后的强类型值（只能取一次）
    pub fn take<T: Any + Send>(&mut self, index: usize) -> Result<T, ApiError> {
        match self.values.get_mut(index).and_then(Option::take) {
            Some(ArgValue::Parsed(value)) => match value.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(value) => {
                    self.values[index] = Some(ArgValue::Parsed(value));
                    Err(ApiError::internal(format!(
                        "handler argument {} is not a {}",
                        index,
                        type_name::<T>()
                    )))
                }
            },
            Some(other) => {
                let err = Self::mismatch(index, "parsed value", &other);
                self.values[index] = Some(other);
                Err(err)
            }
            None => Err(ApiError::internal(format!(
                "handler argument {} is not available",
                index
            ))),
        }
    }
}

/// 一条路由的参数解析器，注册时构建
#[derive(Clone, Debug, Default)]
pub struct ArgResolver {
    bindings: Vec<Option<ArgBinding>>,
}

impl ArgResolver {
    pub fn new(bindings: Vec<Option<ArgBinding>>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> impl Iterator<Item = Option<ArgKind>> + '_ {
        self.bindings.iter().map(|b| b.as_ref().map(ArgBinding::kind))
    }

    /// 为当前请求构建参数列表
    ///
    /// 没有声明任何绑定时，handler 收到原始请求和响应两个参数
    pub fn resolve(&self, ctx: &Arc<RequestContext>) -> Result<HandlerArgs, ApiError> {
        let writer = ctx.response().clone();
        if self.bindings.is_empty() {
            return Ok(HandlerArgs::new(vec![
                ArgValue::Request(ctx.clone()),
                ArgValue::Response(writer),
            ]));
        }

        let mut values = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let value = match binding {
                None => ArgValue::Raw(ctx.clone(), writer.clone()),
                Some(ArgBinding::Req) => ArgValue::Request(ctx.clone()),
                Some(ArgBinding::Res) => ArgValue::Response(writer.clone()),
                Some(ArgBinding::Param(key)) => ArgValue::Param(ctx.param(key).map(str::to_string)),
                Some(ArgBinding::Body(schema)) => {
                    let input = ctx.body_value()?;
                    ArgValue::Parsed(schema.safe_parse(&input).map_err(first_issue)?)
                }
                Some(ArgBinding::Query(schema)) => {
                    let input = ctx.query_value();
                    ArgValue::Parsed(schema.safe_parse(&input).map_err(first_issue)?)
                }
            };
            values.push(value);
        }
        Ok(HandlerArgs::new(values))
    }
}

fn first_issue(issues: Vec<ValidationIssue>) -> ApiError {
    match issues.into_iter().next() {
        Some(issue) => ApiError::Validation(issue),
        None => ApiError::Validation(ValidationIssue::new("custom", "Invalid input", Vec::new())),
    }
}
