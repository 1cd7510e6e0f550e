//! 服务描述符
//!
//! 一条注册记录：请求类型、构造来源、生命周期以及单例缓存槽。
//! 描述符只属于创建它的作用域，除缓存槽外不可变。

use di_abstractions::{Caster, ConstructorInspector, ErasedBuild, Instance, ProducibleType};
use di_common::{ConstructorSelection, Lifetime, TypeInfo};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 构造来源
#[derive(Clone)]
pub(crate) enum Source {
    /// 通过构造函数创建
    Type {
        producible: ProducibleType,
        cast: Caster,
    },
    /// 通过工厂创建
    Factory { build: ErasedBuild, cast: Caster },
    /// 预构建实例，由调用者拥有，容器不释放
    Instance(Instance),
    /// 开放泛型定义，解析时特化
    OpenGeneric { definition: TypeInfo },
}

impl Source {
    fn kind(&self) -> SourceKind {
        match self {
            Self::Type { .. } => SourceKind::Type,
            Self::Factory { .. } => SourceKind::Factory,
            Self::Instance(_) => SourceKind::Instance,
            Self::OpenGeneric { .. } => SourceKind::OpenGeneric,
        }
    }
}

/// 构造来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// 构造函数
    Type,
    /// 工厂
    Factory,
    /// 预构建实例
    Instance,
    /// 开放泛型定义
    OpenGeneric,
}

/// 已注册服务的诊断信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// 请求类型
    pub requested: TypeInfo,
    /// 可构造类型
    pub producible: TypeInfo,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 构造来源
    pub source: SourceKind,
}

pub(crate) struct Descriptor {
    pub requested: TypeInfo,
    pub producible: TypeInfo,
    pub lifetime: Lifetime,
    pub source: Source,
    pub selection: ConstructorSelection,
    cache: OnceCell<Instance>,
}

impl Descriptor {
    pub fn new(
        requested: TypeInfo,
        producible: TypeInfo,
        lifetime: Lifetime,
        source: Source,
        selection: ConstructorSelection,
    ) -> Self {
        Self {
            requested,
            producible,
            lifetime,
            source,
            selection,
            cache: OnceCell::new(),
        }
    }

    pub fn of_type(
        requested: TypeInfo,
        producible: ProducibleType,
        cast: Caster,
        lifetime: Lifetime,
        selection: ConstructorSelection,
    ) -> Self {
        Self::new(
            requested,
            producible.producible(),
            lifetime,
            Source::Type { producible, cast },
            selection,
        )
    }

    /// 是否为 (请求类型, 可构造类型) 相同的注册
    pub fn same_pair(&self, other: &Self) -> bool {
        self.requested == other.requested && self.producible == other.producible
    }

    /// 描述符身份，用于循环依赖检测和特化缓存
    pub fn identity(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.source, Source::Instance(_))
    }

    pub fn cache(&self) -> &OnceCell<Instance> {
        &self.cache
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            requested: self.requested,
            producible: self.producible,
            lifetime: self.lifetime,
            source: self.source.kind(),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("requested", &self.requested.name)
            .field("producible", &self.producible.name)
            .field("lifetime", &self.lifetime)
            .field("source", &self.source.kind())
            .field("cached", &self.cache.get().is_some())
            .finish()
    }
}
