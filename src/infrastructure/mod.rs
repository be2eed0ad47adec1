//! Infrastructure Layer - 基础设施层
//!
//! 路由框架、HTTP 适配与端口的具体实现

pub mod adapters;
pub mod http;
pub mod memory;
pub mod routing;
