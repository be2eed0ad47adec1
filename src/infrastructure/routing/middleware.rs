//! Route Middleware
//!
//! 路由链上的中间件：要么放行（`Ok(())`），要么直接给出响应终止请求（`Err(response)`）

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use crate::infrastructure::http::RequestContext;

/// 中间件执行结果
pub type Flow = Result<(), Response>;

/// 路由级中间件
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// 链路描述和日志里使用的名称
    fn name(&self) -> &str {
        "middleware"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow;
}

#[async_trait]
impl<F> Middleware for F
where
    F: Fn(&mut RequestContext) -> Flow + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        self(ctx)
    }
}

/// 控制器级中间件，注册时绑定到控制器实例
#[async_trait]
pub trait ControllerMiddleware<C>: Send + Sync + 'static
where
    C: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "controller-middleware"
    }

    async fn handle(&self, controller: &C, ctx: &mut RequestContext) -> Flow;
}

#[async_trait]
impl<C, F> ControllerMiddleware<C> for F
where
    C: Send + Sync + 'static,
    F: Fn(&C, &mut RequestContext) -> Flow + Send + Sync + 'static,
{
    async fn handle(&self, controller: &C, ctx: &mut RequestContext) -> Flow {
        self(controller, ctx)
    }
}

/// 给中间件起名字
pub struct Named<M> {
    name: String,
    inner: M,
}

pub fn named<M>(name: impl Into<String>, inner: M) -> Named<M> {
    Named {
        name: name.into(),
        inner,
    }
}

#[async_trait]
impl<M: Middleware> Middleware for Named<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        Middleware::handle(&self.inner, ctx).await
    }
}

#[async_trait]
impl<C, M> ControllerMiddleware<C> for Named<M>
where
    C: Send + Sync + 'static,
    M: ControllerMiddleware<C>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, controller: &C, ctx: &mut RequestContext) -> Flow {
        ControllerMiddleware::handle(&self.inner, controller, ctx).await
    }
}

/// 已绑定控制器实例的控制器级中间件
pub(crate) struct BoundMiddleware<C: Send + Sync + 'static> {
    controller: Arc<C>,
    inner: Arc<dyn ControllerMiddleware<C>>,
}

impl<C: Send + Sync + 'static> BoundMiddleware<C> {
    pub(crate) fn new(controller: Arc<C>, inner: Arc<dyn ControllerMiddleware<C>>) -> Self {
        Self { controller, inner }
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> Middleware for BoundMiddleware<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        self.inner.handle(&self.controller, ctx).await
    }
}
