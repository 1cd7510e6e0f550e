//! 容器构建器
//!
//! 构建器是作用域封闭前的可变暂存区，负责全部注册期校验，并且只能构建一次。

use crate::container::DiContainer;
use crate::descriptor::{Descriptor, Source};
use crate::scope::{LiveScope, ScopeTree};
use di_abstractions::{
    cast_to, Built, Component, ComponentMetadata, ConstructorInspector, DependencyResolver,
    Injectable, Instance, MetadataScanner, ProducibleType, Provides,
};
use di_common::{
    BuilderOptions, ConstructorSelection, Lifetime, RegistrationError, RegistrationResult,
    ResolveResult, SecondRegistration, TypeInfo,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 容器构建器
///
/// ```rust
/// use di_impl::DiContainerBuilder;
/// use di_common::Lifetime;
/// use std::sync::Arc;
///
/// let mut builder = DiContainerBuilder::new();
/// builder.register_instance(Arc::new(String::from("app")), Lifetime::Singleton)?;
/// let container = builder.build()?;
///
/// assert_eq!(container.resolve::<String>()?.as_str(), "app");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DiContainerBuilder {
    descriptors: Vec<Arc<Descriptor>>,
    parent: Option<DiContainer>,
    options: BuilderOptions,
    built: bool,
}

impl DiContainerBuilder {
    /// 创建根作用域构建器
    pub fn new() -> Self {
        Self::with_options(BuilderOptions::default())
    }

    /// 使用指定策略创建根作用域构建器
    pub fn with_options(options: BuilderOptions) -> Self {
        Self {
            descriptors: Vec::new(),
            parent: None,
            options,
            built: false,
        }
    }

    pub(crate) fn child_of(parent: DiContainer, options: BuilderOptions) -> Self {
        Self {
            descriptors: Vec::new(),
            parent: Some(parent),
            options,
            built: false,
        }
    }

    /// 构建策略
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// 是否已经构建
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// 已暂存的注册数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 注册 `I` 作为 `R` 的实现
    pub fn register<R, I>(&mut self, lifetime: Lifetime) -> RegistrationResult<&mut Self>
    where
        R: ?Sized + Send + Sync + 'static,
        I: Injectable + Provides<R>,
    {
        self.ensure_not_built()?;
        let producible = ProducibleType::of::<I>();
        validate_producible(&producible, lifetime, &self.options)?;

        let descriptor = Descriptor::of_type(
            TypeInfo::of::<R>(),
            producible,
            cast_to::<I, R>,
            lifetime,
            self.options.constructor_selection,
        );
        self.insert(descriptor)
    }

    /// 把 `I` 注册为自身
    pub fn register_type<I: Injectable>(
        &mut self,
        lifetime: Lifetime,
    ) -> RegistrationResult<&mut Self> {
        self.register::<I, I>(lifetime)
    }

    /// 通过工厂注册 `I` 作为 `R` 的实现
    ///
    /// 工厂在解析上下文中执行，可以继续解析自己的依赖。
    pub fn register_factory<R, I, F>(
        &mut self,
        lifetime: Lifetime,
        factory: F,
    ) -> RegistrationResult<&mut Self>
    where
        R: ?Sized + Send + Sync + 'static,
        I: Component + Provides<R>,
        F: Fn(&mut dyn DependencyResolver) -> ResolveResult<I> + Send + Sync + 'static,
    {
        self.ensure_not_built()?;
        ensure_transient_tracked(
            TypeInfo::of::<I>(),
            I::disposal_kind().is_disposable(),
            lifetime,
            &self.options,
        )?;

        let source = Source::Factory {
            build: Arc::new(move |resolver: &mut dyn DependencyResolver| {
                factory(resolver).map(|value| Built::from_component(Arc::new(value)))
            }),
            cast: cast_to::<I, R>,
        };
        let descriptor = Descriptor::new(
            TypeInfo::of::<R>(),
            TypeInfo::of::<I>(),
            lifetime,
            source,
            self.options.constructor_selection,
        );
        self.insert(descriptor)
    }

    /// 通过工厂把 `I` 注册为自身
    pub fn register_type_factory<I, F>(
        &mut self,
        lifetime: Lifetime,
        factory: F,
    ) -> RegistrationResult<&mut Self>
    where
        I: Component,
        F: Fn(&mut dyn DependencyResolver) -> ResolveResult<I> + Send + Sync + 'static,
    {
        self.register_factory::<I, I, F>(lifetime, factory)
    }

    /// 注册预构建实例
    ///
    /// 实例由调用者拥有，容器不会释放它。值类型只能通过这种方式提供。
    pub fn register_instance<I>(
        &mut self,
        instance: Arc<I>,
        lifetime: Lifetime,
    ) -> RegistrationResult<&mut Self>
    where
        I: Send + Sync + 'static,
    {
        self.register_instance_as::<I, I>(instance, lifetime)
    }

    /// 注册预构建实例作为 `R`
    pub fn register_instance_as<R, I>(
        &mut self,
        instance: Arc<I>,
        lifetime: Lifetime,
    ) -> RegistrationResult<&mut Self>
    where
        R: ?Sized + Send + Sync + 'static,
        I: Provides<R>,
    {
        self.ensure_not_built()?;

        let view: Arc<R> = <I as Provides<R>>::provide(instance);
        let instance: Instance = Arc::new(view);
        let descriptor = Descriptor::new(
            TypeInfo::of::<R>(),
            TypeInfo::of::<I>(),
            lifetime,
            Source::Instance(instance),
            self.options.constructor_selection,
        );
        self.insert(descriptor)
    }

    /// 注册开放泛型定义
    ///
    /// 解析 `G: ClosedGeneric<Definition = D>` 时，定义被特化为 `G`。
    pub fn register_open_generic<D>(
        &mut self,
        lifetime: Lifetime,
    ) -> RegistrationResult<&mut Self>
    where
        D: ?Sized + 'static,
    {
        self.ensure_not_built()?;

        let definition = TypeInfo::of::<D>();
        let descriptor = Descriptor::new(
            definition,
            definition,
            lifetime,
            Source::OpenGeneric { definition },
            self.options.constructor_selection,
        );
        self.insert(descriptor)
    }

    /// 按元数据批量注册
    ///
    /// 遇到第一个错误即返回，之前的条目保持已注册。
    pub fn register_from_metadata(
        &mut self,
        entries: impl IntoIterator<Item = ComponentMetadata>,
    ) -> RegistrationResult<&mut Self> {
        for entry in entries {
            self.register_metadata(entry)?;
        }
        Ok(self)
    }

    /// 注册一条元数据
    pub fn register_metadata(
        &mut self,
        metadata: ComponentMetadata,
    ) -> RegistrationResult<&mut Self> {
        self.ensure_not_built()?;
        validate_producible(&metadata.producible, metadata.lifetime, &self.options)?;

        let requested = metadata.requested_type();
        let cast = metadata
            .cast_for(&requested)
            .ok_or_else(|| RegistrationError::NotAssignable {
                producible: metadata.producible.producible().name.to_string(),
                requested: requested.name.to_string(),
            })?;

        let descriptor = Descriptor::of_type(
            requested,
            metadata.producible,
            cast,
            metadata.lifetime,
            self.options.constructor_selection,
        );
        self.insert(descriptor)
    }

    /// 从扫描器读取元数据并注册，返回注册条目数量
    pub fn scan_and_register(
        &mut self,
        scanner: &dyn MetadataScanner,
    ) -> RegistrationResult<usize> {
        self.ensure_not_built()?;

        let entries = scanner.scan()?;
        let count = entries.len();
        self.register_from_metadata(entries)?;

        info!("扫描器 {} 注册了 {} 个组件", scanner.name(), count);
        Ok(count)
    }

    /// 封闭构建器并创建作用域
    pub fn build(&mut self) -> RegistrationResult<DiContainer> {
        self.ensure_not_built()?;

        let (tree, parent) = match &self.parent {
            Some(parent) if parent.is_disposed() => {
                return Err(RegistrationError::ParentScopeDisposed)
            }
            Some(parent) => (parent.tree(), Some(parent.id())),
            None => (Arc::new(ScopeTree::new()), None),
        };

        self.built = true;
        let descriptors = std::mem::take(&mut self.descriptors);
        let count = descriptors.len();
        let id = tree.insert(LiveScope::new(parent, descriptors, self.options));

        match parent {
            Some(parent) => info!(
                "构建子作用域 {} (父作用域 {})，注册了 {} 个服务",
                id, parent, count
            ),
            None => info!("构建根作用域 {}，注册了 {} 个服务", id, count),
        }
        Ok(DiContainer::new(tree, id, parent))
    }

    fn ensure_not_built(&self) -> RegistrationResult<()> {
        if self.built {
            return Err(RegistrationError::AlreadyBuilt);
        }
        Ok(())
    }

    /// 按重复注册策略加入描述符
    fn insert(&mut self, descriptor: Descriptor) -> RegistrationResult<&mut Self> {
        let existing = self
            .descriptors
            .iter()
            .position(|registered| registered.same_pair(&descriptor));

        match (existing, self.options.second_registration) {
            (None, _) => {
                debug!(
                    "注册服务: {} -> {} ({})",
                    descriptor.requested.short_name(),
                    descriptor.producible.short_name(),
                    descriptor.lifetime
                );
                self.descriptors.push(Arc::new(descriptor));
            }
            (Some(_), SecondRegistration::Throw) => {
                return Err(RegistrationError::Duplicate {
                    requested: descriptor.requested.name.to_string(),
                    producible: descriptor.producible.name.to_string(),
                });
            }
            (Some(_), SecondRegistration::Ignore) => {
                warn!(
                    "忽略重复注册: {} -> {}",
                    descriptor.requested.short_name(),
                    descriptor.producible.short_name()
                );
            }
            (Some(index), SecondRegistration::Rewrite) => {
                debug!(
                    "覆盖注册: {} -> {} ({})",
                    descriptor.requested.short_name(),
                    descriptor.producible.short_name(),
                    descriptor.lifetime
                );
                self.descriptors[index] = Arc::new(descriptor);
            }
        }

        Ok(self)
    }
}

impl Default for DiContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 校验可构造类型：非抽象、严格模式下恰好一个构造函数、瞬时可释放服务需要显式跟踪
pub(crate) fn validate_producible(
    producible: &ProducibleType,
    lifetime: Lifetime,
    options: &BuilderOptions,
) -> RegistrationResult<()> {
    let type_info = producible.producible();
    let count = producible.constructors().len();

    if count == 0 {
        return Err(RegistrationError::AbstractType {
            type_name: type_info.name.to_string(),
        });
    }

    if options.constructor_selection == ConstructorSelection::Strict && count != 1 {
        return Err(RegistrationError::AmbiguousConstructors {
            type_name: type_info.name.to_string(),
            count,
        });
    }

    ensure_transient_tracked(
        type_info,
        producible.disposal_kind().is_disposable(),
        lifetime,
        options,
    )
}

fn ensure_transient_tracked(
    type_info: TypeInfo,
    disposable: bool,
    lifetime: Lifetime,
    options: &BuilderOptions,
) -> RegistrationResult<()> {
    if lifetime == Lifetime::Transient && disposable && !options.tracks_transient_disposables() {
        return Err(RegistrationError::TransientDisposable {
            type_name: type_info.name.to_string(),
        });
    }
    Ok(())
}
