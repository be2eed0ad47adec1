//! Metadata Store
//!
//! 以控制器类型为键保存声明元数据。同一控制器 / 同一 handler 多次获取
//! 得到的是同一份记录，各处声明互不依赖、可以任意顺序执行

use std::any::{type_name, TypeId};

use indexmap::IndexMap;

use super::annotations::{ControllerDecl, RouteDecl};
use super::metadata::{ControllerMetadata, RouteMetadata};
use crate::application::{Container, ContainerError, Instance};

/// 控制器元数据仓库，按首次声明的顺序保存
#[derive(Debug, Default)]
pub struct Registry {
    controllers: IndexMap<TypeId, ControllerMetadata>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取控制器元数据，不存在时创建空记录
    pub fn get_controller_metadata<C>(&mut self) -> &mut ControllerMetadata
    where
        C: Send + Sync + 'static,
    {
        self.controllers
            .entry(TypeId::of::<C>())
            .or_insert_with(|| ControllerMetadata::new(type_name::<C>(), resolve_instance::<C>))
    }

    /// 获取 handler 的路由元数据，必要时连同控制器记录一起创建
    pub fn get_route<C>(&mut self, handler_name: &str) -> &mut RouteMetadata
    where
        C: Send + Sync + 'static,
    {
        self.get_controller_metadata::<C>().route_mut(handler_name)
    }

    /// 控制器级声明入口
    pub fn controller<C>(&mut self) -> ControllerDecl<'_, C>
    where
        C: Send + Sync + 'static,
    {
        ControllerDecl::new(self.get_controller_metadata::<C>())
    }

    /// 单个 handler 的声明入口
    pub fn route<C>(&mut self, handler_name: &str) -> RouteDecl<'_, C>
    where
        C: Send + Sync + 'static,
    {
        RouteDecl::new(self.get_route::<C>(handler_name))
    }

    /// 已声明控制器的只读视图
    pub fn metadata<C>(&self) -> Option<&ControllerMetadata>
    where
        C: Send + Sync + 'static,
    {
        self.controllers.get(&TypeId::of::<C>())
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerMetadata> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

fn resolve_instance<C>(container: &Container) -> Result<Instance, ContainerError>
where
    C: Send + Sync + 'static,
{
    container.resolve::<C>().map(|controller| controller as Instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArgBinding, HttpMethod};

    struct Widgets;
    struct Gadgets;

    #[test]
    fn test_controller_metadata_is_created_once() {
        let mut registry = Registry::new();
        registry.get_controller_metadata::<Widgets>().base_path = Some("/widgets".into());

        let metadata = registry.get_controller_metadata::<Widgets>();
        assert_eq!(metadata.base_path(), "/widgets");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_new_controller_is_empty() {
        let mut registry = Registry::new();
        let metadata = registry.get_controller_metadata::<Widgets>();

        assert!(!metadata.has_base_path());
        assert_eq!(metadata.base_path(), "/");
        assert_eq!(metadata.middleware_count(), 0);
        assert_eq!(metadata.routes().count(), 0);
        assert!(metadata.name().ends_with("Widgets"));
    }

    #[test]
    fn test_route_writes_accumulate() {
        let mut registry = Registry::new();
        registry
            .get_route::<Widgets>("get_widget")
            .set_endpoint(HttpMethod::Get, "/:id".into());
        registry
            .get_route::<Widgets>("get_widget")
            .set_arg(0, ArgBinding::param("id"));

        let route = registry
            .metadata::<Widgets>()
            .and_then(|m| m.route("get_widget"))
            .expect("route should exist");
        assert_eq!(route.method(), Some(HttpMethod::Get));
        assert_eq!(route.path(), Some("/:id"));
        assert_eq!(route.args(), &[Some(ArgBinding::param("id"))]);
    }

    #[test]
    fn test_controllers_are_keyed_by_type() {
        let mut registry = Registry::new();
        registry.get_route::<Widgets>("list");
        registry.get_route::<Gadgets>("list");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.metadata::<Widgets>().map(|m| m.routes().count()), Some(1));
        assert!(registry.metadata::<String>().is_none());
    }
}
