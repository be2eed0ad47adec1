//! Route Context - Argument Bindings

use std::fmt;
use std::sync::Arc;

use crate::domain::schema::Schema;

/// 绑定类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Req,
    Res,
    Body,
    Query,
    Param,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgKind::Req => "req",
            ArgKind::Res => "res",
            ArgKind::Body => "body",
            ArgKind::Query => "query",
            ArgKind::Param => "param",
        }
    }
}

/// handler 参数绑定规则
///
/// `Body` / `Query` 直接携带校验 schema
#[derive(Clone)]
pub enum ArgBinding {
    Req,
    Res,
    Body(Arc<dyn Schema>),
    Query(Arc<dyn Schema>),
    Param(String),
}

impl ArgBinding {
    pub fn param(key: impl Into<String>) -> Self {
        ArgBinding::Param(key.into())
    }

    pub fn body(schema: Arc<dyn Schema>) -> Self {
        ArgBinding::Body(schema)
    }

    pub fn query(schema: Arc<dyn Schema>) -> Self {
        ArgBinding::Query(schema)
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            ArgBinding::Req => ArgKind::Req,
            ArgBinding::Res => ArgKind::Res,
            ArgBinding::Body(_) => ArgKind::Body,
            ArgBinding::Query(_) => ArgKind::Query,
            ArgBinding::Param(_) => ArgKind::Param,
        }
    }
}

/// body / query 按 schema 名称比较，名称里带有校验方式
impl PartialEq for ArgBinding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgBinding::Req, ArgBinding::Req) | (ArgBinding::Res, ArgBinding::Res) => true,
            (ArgBinding::Body(a), ArgBinding::Body(b))
            | (ArgBinding::Query(a), ArgBinding::Query(b)) => a.name() == b.name(),
            (ArgBinding::Param(a), ArgBinding::Param(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ArgBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgBinding::Req => f.write_str("Req"),
            ArgBinding::Res => f.write_str("Res"),
            ArgBinding::Body(schema) => f.debug_tuple("Body").field(&schema.name()).finish(),
            ArgBinding::Query(schema) => f.debug_tuple("Query").field(&schema.name()).finish(),
            ArgBinding::Param(key) => f.debug_tuple("Param").field(key).finish(),
        }
    }
}
