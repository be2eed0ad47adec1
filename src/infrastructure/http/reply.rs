//! Response Sender
//!
//! 通用响应发送器：把 handler 的返回值序列化为 HTTP 响应，
//! handler 错误在这里统一翻译，不会被吞掉

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};

use super::context::ResponseWriter;
use super::error::ApiError;

/// handler 返回值
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 包装为 `{"data": ...}` 返回
    Json(Value),
    /// 原样返回的字节流
    Bytes {
        content_type: Option<HeaderValue>,
        body: Bytes,
    },
    /// 204 No Content
    Empty,
}

impl Reply {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Reply::Json)
            .map_err(|e| ApiError::internal(format!("failed to serialize response: {}", e)))
    }

    pub fn bytes(body: impl Into<Bytes>) -> Self {
        Reply::Bytes {
            content_type: None,
            body: body.into(),
        }
    }

    pub fn bytes_with_type(body: impl Into<Bytes>, content_type: &'static str) -> Self {
        Reply::Bytes {
            content_type: Some(HeaderValue::from_static(content_type)),
            body: body.into(),
        }
    }

    pub fn empty() -> Self {
        Reply::Empty
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

/// 发送 handler 结果
///
/// handler 已经通过 `ResponseWriter` 写完响应时直接使用它；
/// 否则按返回值构造响应，并带上 handler 设置的状态码和响应头
pub fn send(result: Result<Reply, ApiError>, writer: &ResponseWriter) -> Response {
    if writer.is_finished() {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Handler failed after writing its own response");
        }
        return writer.take_response();
    }

    let reply = match result {
        Ok(reply) => reply,
        Err(e) => return e.into_response(),
    };

    let mut response = match reply {
        Reply::Json(data) => Json(json!({ "data": data })).into_response(),
        Reply::Bytes { content_type, body } => {
            let mut response = Response::new(Body::from(body));
            if let Some(content_type) = content_type {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            response
        }
        Reply::Empty => StatusCode::NO_CONTENT.into_response(),
    };

    writer.merge_headers_into(&mut response);
    if let Some(status) = writer.status() {
        *response.status_mut() = status;
    }
    response
}
