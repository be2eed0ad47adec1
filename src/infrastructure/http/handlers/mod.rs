//! HTTP Handlers
//!
//! 内置控制器

mod health;

pub use health::{HealthController, HealthResponse};
