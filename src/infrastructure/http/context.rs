//! Request Context
//!
//! 每个请求独立构建的上下文：守卫可以修改它（写入用户、扩展数据），
//! handler 通过 `req` 绑定拿到只读快照，通过 `res` 绑定拿到 `ResponseWriter`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{
        header::CONTENT_TYPE, request::Parts, Extensions, HeaderMap, HeaderName, HeaderValue,
        Method, StatusCode, Uri,
    },
    response::Response,
};
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::AuthenticatedUser;

/// 请求上下文
pub struct RequestContext {
    request_id: Uuid,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    user: Option<AuthenticatedUser>,
    extensions: Extensions,
    response: ResponseWriter,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            uri,
            headers: HeaderMap::new(),
            params: HashMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            user: None,
            extensions: Extensions::new(),
            response: ResponseWriter::default(),
        }
    }

    /// 从 axum 拆出的请求部件构建
    pub fn from_parts(parts: Parts, params: HashMap<String, String>, body: Bytes) -> Self {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut ctx = Self::new(parts.method, parts.uri);
        ctx.headers = parts.headers;
        ctx.params = params;
        ctx.body = body;
        ctx.remote_addr = remote_addr;
        ctx
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// 路径参数（已 percent-decode）
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// 请求体 JSON；空请求体视为 `{}`
    pub fn body_value(&self) -> Result<Value, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::debug!(request_id = %self.request_id, error = %e, "Undecodable request body");
            ApiError::bad_request("Invalid JSON body")
        })
    }

    /// 查询串解析为 JSON 对象；重复的 key 合并为数组，值保持字符串
    pub fn query_value(&self) -> Value {
        let mut map = Map::new();
        let query = self.uri.query().unwrap_or_default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = Value::String(value.into_owned());
            match map.get_mut(&*key) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key.into_owned(), value);
                }
            }
        }
        Value::Object(map)
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// 限流用的调用方标识
    pub fn caller_key(&self) -> String {
        self.remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: AuthenticatedUser) {
        self.user = Some(user);
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }
}

#[derive(Default)]
struct ResponseDraft {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

/// handler 可直接写入的原始响应
///
/// 写入了 body（`send` / `json` / `end`）即视为已完成，
/// 通用响应发送器不会再覆盖它
#[derive(Clone, Default)]
pub struct ResponseWriter {
    inner: Arc<Mutex<ResponseDraft>>,
}

impl ResponseWriter {
    pub fn set_status(&self, status: StatusCode) {
        self.inner.lock().status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.inner.lock().status
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.inner.lock().headers.insert(name, value);
    }

    /// 按字符串设置响应头，非法的名称或值返回 500
    pub fn insert_header(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let name = HeaderName::try_from(name)
            .map_err(|e| ApiError::internal(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| ApiError::internal(format!("invalid header value: {}", e)))?;
        self.set_header(name, value);
        Ok(())
    }

    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        self.inner.lock().headers.get(name).cloned()
    }

    pub fn send(&self, body: impl Into<Bytes>) {
        self.inner.lock().body = Some(body.into());
    }

    pub fn json<T: Serialize>(&self, value: &T) -> Result<(), ApiError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| ApiError::internal(format!("failed to serialize response: {}", e)))?;
        let mut draft = self.inner.lock();
        draft
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        draft.body = Some(Bytes::from(body));
        Ok(())
    }

    pub fn end(&self) {
        let mut draft = self.inner.lock();
        if draft.body.is_none() {
            draft.body = Some(Bytes::new());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().body.is_some()
    }

    /// 把 handler 写入的响应头合并到发送器构造的响应上
    pub(crate) fn merge_headers_into(&self, response: &mut Response) {
        let draft = self.inner.lock();
        for (name, value) in draft.headers.iter() {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }

    /// 取出 handler 自己写好的响应；未设置状态码时为 200
    pub(crate) fn take_response(&self) -> Response {
        let mut draft = self.inner.lock();
        let mut response = Response::new(Body::from(draft.body.take().unwrap_or_default()));
        *response.status_mut() = draft.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = std::mem::take(&mut draft.headers);
        response
    }
}
