//! Health Controller
//!
//! 健康检查端点，不需要认证

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::infrastructure::http::Reply;
use crate::infrastructure::routing::{HandlerArgs, HandlerResult, Registry};

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

pub struct HealthController {
    started: Instant,
}

impl Default for HealthController {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthController {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// 声明 `GET /health`
    pub fn declare(registry: &mut Registry) {
        registry
            .controller::<Self>()
            .rest_controller("/health")
            .route("health", |route| route.get("/").skip_auth().handler(Self::health));
    }

    async fn health(self: Arc<Self>, _args: HandlerArgs) -> HandlerResult {
        Reply::json(&HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: self.started.elapsed().as_secs(),
        })
    }
}
