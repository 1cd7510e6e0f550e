//! 解析上下文
//!
//! 一次顶层解析对应一个上下文。上下文记录当前作用域、当前策略以及正在构造的
//! 描述符链，构造函数和工厂通过它（作为 [`DependencyResolver`]）解析依赖。

use crate::descriptor::{Descriptor, Source};
use crate::disposer::dispose_blocking;
use crate::scope::{ScopeId, ScopeTree};
use crate::selection::select_constructor;
use crate::strategy::{delegate, find, find_all, Lookup};
use di_abstractions::{Dependency, DependencyResolver, Instance, ServiceRequest};
use di_common::{Lifetime, ResolveError, ResolveResult, ResolveStrategy, TypeInfo};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub(crate) struct ResolveContext<'t> {
    tree: &'t ScopeTree,
    scope: ScopeId,
    strategy: ResolveStrategy,
    chain: Vec<Arc<Descriptor>>,
}

impl<'t> ResolveContext<'t> {
    pub fn new(tree: &'t ScopeTree, scope: ScopeId, strategy: ResolveStrategy) -> Self {
        Self {
            tree,
            scope,
            strategy,
            chain: Vec::new(),
        }
    }

    /// 在另一个作用域和策略下执行，结束后恢复
    fn within<T>(
        &mut self,
        scope: ScopeId,
        strategy: ResolveStrategy,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = (self.scope, self.strategy);
        self.scope = scope;
        self.strategy = strategy;
        let result = f(self);
        (self.scope, self.strategy) = saved;
        result
    }

    /// 添加描述符到构造链
    fn push_descriptor(&mut self, descriptor: &Arc<Descriptor>) -> ResolveResult<()> {
        if self.chain.iter().any(|entry| Arc::ptr_eq(entry, descriptor)) {
            let dependency_chain = self
                .chain
                .iter()
                .chain(std::iter::once(descriptor))
                .map(|entry| entry.producible.short_name())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ResolveError::CircularDependency { dependency_chain });
        }

        self.chain.push(Arc::clone(descriptor));
        Ok(())
    }

    /// 从构造链中移除最后一个描述符
    fn pop_descriptor(&mut self) {
        self.chain.pop();
    }

    pub fn resolve(&mut self, request: &ServiceRequest) -> ResolveResult<Instance> {
        let (scope, strategy) = delegate(self.tree, self.scope, self.strategy)?;
        if self.strategy == ResolveStrategy::NonLocal {
            return self.within(scope, strategy, |ctx| ctx.resolve(request));
        }

        let type_info = &request.type_info;
        let lookup = find(self.tree, scope, request, strategy)?;

        // 值类型只能由预构建实例提供
        let invalid_target = || ResolveError::InvalidResolutionTarget {
            type_name: type_info.name.to_string(),
        };

        match lookup {
            Lookup::NotFound if type_info.value_like => Err(invalid_target()),
            Lookup::NotFound => Err(ResolveError::not_found(type_info)),
            Lookup::Ambiguous { count } => Err(ResolveError::AmbiguousRegistration {
                type_name: type_info.name.to_string(),
                count,
            }),
            Lookup::Unique { descriptor, .. }
                if type_info.value_like && !descriptor.is_instance() =>
            {
                Err(invalid_target())
            }
            Lookup::Unique { descriptor, owner } => {
                debug!(
                    "解析服务: {} -> {} ({}, {})",
                    type_info.short_name(),
                    descriptor.producible.short_name(),
                    descriptor.lifetime,
                    owner
                );
                self.materialize(&descriptor, owner)
            }
        }
    }

    pub fn resolve_all(&mut self, type_info: &TypeInfo) -> ResolveResult<Vec<Instance>> {
        let (scope, strategy) = delegate(self.tree, self.scope, self.strategy)?;
        self.within(scope, strategy, |ctx| -> ResolveResult<Vec<Instance>> {
            let found = find_all(ctx.tree, scope, type_info, strategy)?;
            debug!(
                "解析全部服务: {}，共 {} 个 ({})",
                type_info.short_name(),
                found.len(),
                strategy
            );
            found
                .iter()
                .map(|(descriptor, owner)| ctx.materialize(descriptor, *owner))
                .collect()
        })
    }

    /// 获取或创建描述符对应的实例
    ///
    /// 单例在拥有描述符的作用域中构造并缓存；瞬时服务在当前作用域中构造。
    fn materialize(
        &mut self,
        descriptor: &Arc<Descriptor>,
        owner: ScopeId,
    ) -> ResolveResult<Instance> {
        match &descriptor.source {
            Source::Instance(instance) => return Ok(Arc::clone(instance)),
            Source::OpenGeneric { .. } => {
                return Err(ResolveError::not_found(&descriptor.requested))
            }
            Source::Type { .. } | Source::Factory { .. } => {}
        }

        match descriptor.lifetime {
            Lifetime::Singleton => {
                if let Some(instance) = descriptor.cache().get() {
                    trace!("命中单例缓存: {}", descriptor.producible.short_name());
                    return Ok(Arc::clone(instance));
                }

                self.push_descriptor(descriptor)?;
                let strategy = self.strategy;
                let result = descriptor
                    .cache()
                    .get_or_try_init(|| {
                        self.within(owner, strategy, |ctx| ctx.construct(descriptor))
                    })
                    .map(Arc::clone);
                self.pop_descriptor();
                result
            }
            Lifetime::Transient => {
                self.push_descriptor(descriptor)?;
                let result = self.construct(descriptor);
                self.pop_descriptor();
                result
            }
        }
    }

    /// 在当前作用域中构造实例，并把可释放实例记录到当前作用域的释放器
    fn construct(&mut self, descriptor: &Arc<Descriptor>) -> ResolveResult<Instance> {
        let scope = self.tree.live(self.scope)?;

        let (built, cast) = match &descriptor.source {
            Source::Type { producible, cast } => {
                let constructor =
                    select_constructor(producible, descriptor.selection, |dependency| {
                        self.can_resolve(dependency)
                    })?;
                trace!(
                    "调用构造函数: {}::{}",
                    descriptor.producible.short_name(),
                    constructor.name
                );
                (constructor.invoke(self)?, *cast)
            }
            Source::Factory { build, cast } => (build(self)?, *cast),
            Source::Instance(_) | Source::OpenGeneric { .. } => {
                return Err(ResolveError::not_found(&descriptor.requested))
            }
        };

        let instance = cast(built.object).ok_or_else(|| ResolveError::TypeMismatch {
            type_name: descriptor.requested.name.to_string(),
        })?;

        if let Some(disposal) = built.disposal {
            let rejected = scope.disposer.lock().record(disposal);
            if let Err(orphan) = rejected {
                warn!(
                    "作用域 {} 在构造 {} 期间被释放，立即释放新实例",
                    self.scope,
                    descriptor.producible.short_name()
                );
                dispose_blocking(vec![orphan]);
                return Err(ResolveError::ContainerDisposed);
            }
        }

        Ok(instance)
    }
}

impl DependencyResolver for ResolveContext<'_> {
    fn resolve_request(&mut self, request: &ServiceRequest) -> ResolveResult<Instance> {
        self.resolve(request)
    }

    fn resolve_all_instances(&mut self, type_info: &TypeInfo) -> ResolveResult<Vec<Instance>> {
        self.resolve_all(type_info)
    }

    fn can_resolve(&self, dependency: &Dependency) -> bool {
        if dependency.is_sequence() {
            return true;
        }

        let request = ServiceRequest::new(dependency.type_info);
        let value_like = dependency.type_info.value_like;
        match find(self.tree, self.scope, &request, self.strategy) {
            Ok(Lookup::Unique { descriptor, .. }) => !value_like || descriptor.is_instance(),
            Ok(Lookup::Ambiguous { .. }) => true,
            Ok(Lookup::NotFound) | Err(_) => false,
        }
    }
}
