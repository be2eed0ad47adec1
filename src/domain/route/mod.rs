//! Route Context - 路由声明相关的值对象

mod binding;
mod errors;
mod value_objects;

pub use binding::{ArgBinding, ArgKind};
pub use errors::RouteError;
pub use value_objects::{join_paths, validate_path, AccessScope, HttpMethod, RateLimit};
