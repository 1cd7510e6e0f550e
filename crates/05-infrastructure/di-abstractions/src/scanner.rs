//! 组件元数据与扫描器抽象接口
//!
//! 声明式扫描器把类型元数据转换为注册条目，容器只把它当作纯数据源。
//! `#[component(singleton, requested = dyn Logger)]` 会为类型生成
//! [`Registrable`]，[`ModuleManifest`] 把一组这样的类型收集成一个扫描器。

use crate::factory::{Injectable, ProducibleType};
use crate::provides::{cast_to, Caster, Provides};
use di_common::{Lifetime, RegistrationError, RegistrationResult, TypeInfo};
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::debug;

/// 接口视图：可构造类型可以赋值给的一个请求类型
#[derive(Debug, Clone, Copy)]
pub struct InterfaceCast {
    /// 请求类型
    pub requested: TypeInfo,
    /// 具体对象到请求类型视图的转换
    pub cast: Caster,
}

impl InterfaceCast {
    /// `I` 作为 `R` 的视图
    pub fn of<I, R>() -> Self
    where
        I: Provides<R>,
        R: ?Sized + Send + Sync + 'static,
    {
        Self {
            requested: TypeInfo::of::<R>(),
            cast: cast_to::<I, R>,
        }
    }
}

/// 组件元数据：一条 `(可构造类型, 生命周期, 请求类型?)` 注册条目
#[derive(Debug, Clone)]
pub struct ComponentMetadata {
    /// 可构造类型
    pub producible: ProducibleType,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 请求类型，`None` 表示注册为自身
    pub requested: Option<TypeInfo>,
    /// 可构造类型提供的接口视图（总是包含自身）
    pub interfaces: Vec<InterfaceCast>,
}

impl ComponentMetadata {
    /// 创建元数据构建器
    pub fn builder<I: Injectable>(lifetime: Lifetime) -> ComponentMetadataBuilder<I> {
        ComponentMetadataBuilder {
            metadata: Self {
                producible: ProducibleType::of::<I>(),
                lifetime,
                requested: None,
                interfaces: vec![InterfaceCast::of::<I, I>()],
            },
            _marker: PhantomData,
        }
    }

    /// 不经编译期检查地设置请求类型
    ///
    /// 接口表中没有对应视图时，注册会返回 `NotAssignable`。
    pub fn with_requested_type(mut self, requested: TypeInfo) -> Self {
        self.requested = Some(requested);
        self
    }

    /// 实际注册使用的请求类型
    pub fn requested_type(&self) -> TypeInfo {
        self.requested.unwrap_or_else(|| self.producible.type_info())
    }

    /// 查找到请求类型的转换
    pub fn cast_for(&self, requested: &TypeInfo) -> Option<Caster> {
        self.interfaces
            .iter()
            .find(|interface| interface.requested == *requested)
            .map(|interface| interface.cast)
    }
}

/// [`ComponentMetadata`] 的类型化构建器
pub struct ComponentMetadataBuilder<I> {
    metadata: ComponentMetadata,
    _marker: PhantomData<fn() -> I>,
}

impl<I: Injectable> ComponentMetadataBuilder<I> {
    /// 设置请求类型
    pub fn requested<R>(mut self) -> Self
    where
        I: Provides<R>,
        R: ?Sized + Send + Sync + 'static,
    {
        self.metadata.requested = Some(TypeInfo::of::<R>());
        self.interface::<R>()
    }

    /// 添加接口视图
    pub fn interface<R>(mut self) -> Self
    where
        I: Provides<R>,
        R: ?Sized + Send + Sync + 'static,
    {
        let cast = InterfaceCast::of::<I, R>();
        if self.metadata.cast_for(&cast.requested).is_none() {
            self.metadata.interfaces.push(cast);
        }
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentMetadata {
        self.metadata
    }
}

/// 携带声明式注册元数据的类型
pub trait Registrable: Injectable {
    /// 类型的注册元数据
    fn component_metadata() -> ComponentMetadata;
}

/// 元数据扫描器 trait
pub trait MetadataScanner: Send + Sync {
    /// 扫描器名称
    fn name(&self) -> &str;

    /// 产出注册条目
    fn scan(&self) -> RegistrationResult<Vec<ComponentMetadata>>;
}

/// 模块清单
///
/// 显式列出一个模块中带注册元数据的类型。
///
/// ```rust,ignore
/// let manifest = ModuleManifest::new("storage")
///     .with::<FileStore>()
///     .with::<StoreMetrics>();
/// builder.scan_and_register(&manifest)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleManifest {
    name: String,
    entries: Vec<ComponentMetadata>,
}

impl ModuleManifest {
    /// 创建空清单
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// 添加带注册元数据的类型
    pub fn with<T: Registrable>(self) -> Self {
        self.with_metadata(T::component_metadata())
    }

    /// 添加一条元数据
    pub fn with_metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.entries.push(metadata);
        self
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataScanner for ModuleManifest {
    fn name(&self) -> &str {
        &self.name
    }

    fn scan(&self) -> RegistrationResult<Vec<ComponentMetadata>> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let key = (entry.producible.type_info(), entry.requested_type());
            if !seen.insert(key) {
                return Err(RegistrationError::ScanFailed {
                    scanner: self.name.clone(),
                    message: format!(
                        "组件 {} -> {} 在清单中重复出现",
                        key.1, key.0
                    ),
                });
            }
        }

        debug!("模块清单 {} 产出 {} 个注册条目", self.name, self.entries.len());
        Ok(self.entries.clone())
    }
}
