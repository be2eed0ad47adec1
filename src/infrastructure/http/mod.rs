//! HTTP Layer
//!
//! 请求上下文、错误翻译、统一响应发送与服务器启动

pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod reply;
pub mod server;

pub use context::{RequestContext, ResponseWriter};
pub use error::{
    ApiError, ErrorResponse, LICENSE_MISSING_MESSAGE, MISSING_SCOPE_MESSAGE,
    TOO_MANY_REQUESTS_MESSAGE,
};
pub use handlers::HealthController;
pub use reply::Reply;
pub use server::{HttpServer, ServerConfig};
