//! Dependency Container
//!
//! 按类型注册工厂，`resolve` 时惰性创建并缓存单例；
//! 同一类型在整个进程生命周期内只有一个实例

use std::any::{type_name, Any, TypeId};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;

/// 类型擦除后的实例
pub type Instance = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn(&Container) -> Result<Instance, ContainerError> + Send + Sync>;

/// 容器错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("no provider registered for {0}")]
    NotRegistered(&'static str),

    #[error("circular dependency while resolving {0}")]
    Cycle(&'static str),

    #[error("failed to construct {type_name}: {reason}")]
    Construction {
        type_name: &'static str,
        reason: String,
    },
}

impl ContainerError {
    /// 工厂内部构造失败时使用
    pub fn construction<T>(reason: impl Into<String>) -> Self {
        Self::Construction {
            type_name: type_name::<T>(),
            reason: reason.into(),
        }
    }
}

/// 单例依赖容器
#[derive(Default)]
pub struct Container {
    factories: DashMap<TypeId, Factory>,
    instances: DashMap<TypeId, Instance>,
    /// 正在构造中的类型，按线程区分；同一线程内重入才算循环依赖
    resolving: Mutex<HashSet<(ThreadId, TypeId)>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工厂；工厂可以通过传入的容器解析自身依赖
    pub fn register<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |container| {
            factory(container).map(|value| Arc::new(value) as Instance)
        });
        self.factories.insert(TypeId::of::<T>(), factory);
    }

    /// 直接放入已构造好的实例
    pub fn provide<T>(&self, instance: T)
    where
        T: Send + Sync + 'static,
    {
        self.instances.insert(TypeId::of::<T>(), Arc::new(instance));
    }

    /// 是否能解析该类型
    pub fn contains<T: 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.instances.contains_key(&id) || self.factories.contains_key(&id)
    }

    /// 解析单例
    pub fn resolve<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.resolve_instance(TypeId::of::<T>(), type_name::<T>())?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::construction::<T>("instance has an unexpected type"))
    }

    fn resolve_instance(&self, id: TypeId, name: &'static str) -> Result<Instance, ContainerError> {
        if let Some(instance) = self.instances.get(&id) {
            return Ok(instance.value().clone());
        }

        // 先克隆工厂再调用，避免持有分片锁时重入
        let factory = self
            .factories
            .get(&id)
            .map(|f| f.value().clone())
            .ok_or(ContainerError::NotRegistered(name))?;

        let key = (thread::current().id(), id);
        if !self.resolving.lock().insert(key) {
            return Err(ContainerError::Cycle(name));
        }

        let built = factory(self);
        self.resolving.lock().remove(&key);
        let built = built?;

        let instance = self.instances.entry(id).or_insert(built).value().clone();
        tracing::debug!(type_name = name, "Singleton constructed");
        Ok(instance)
    }
}
