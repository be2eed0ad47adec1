//! Declarative Routing
//!
//! 声明（annotations / registry）→ 校验与挂载（registrar）→ 每条路由的处理链（composer）

pub mod annotations;
pub mod composer;
pub mod guards;
pub mod metadata;
pub mod middleware;
pub mod registrar;
pub mod registry;
pub mod resolver;

pub use annotations::{ControllerDecl, RouteDecl};
pub use composer::{compose, ComposeOptions, GuardServices, RouteChain};
pub use guards::{AuthGuard, LicenseGuard, RateLimitGuard, ScopeGuard};
pub use metadata::{
    BoundHandler, ControllerMetadata, EndpointConflict, HandlerResult, RouteMetadata, RouteOptions,
};
pub use middleware::{named, ControllerMiddleware, Flow, Middleware, Named};
pub use registrar::{Registrar, RoutingConfig};
pub use registry::Registry;
pub use resolver::{ArgResolver, ArgValue, HandlerArgs};
