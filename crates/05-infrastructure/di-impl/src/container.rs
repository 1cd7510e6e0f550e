//! 作用域容器
//!
//! [`DiContainer`] 是指向作用域树中一个作用域的句柄，克隆成本很低。
//! 作用域的注册表在构建后不可变，只有单例缓存和释放器会继续变化。

use crate::builder::DiContainerBuilder;
use crate::context::ResolveContext;
use crate::descriptor::ServiceInfo;
use crate::disposer::{dispose_all, dispose_blocking};
use crate::scope::{LiveScope, ScopeId, ScopeTree};
use crate::strategy::{find, Lookup};
use di_abstractions::{typed, ClosedGeneric, Disposal, Instance, ServiceRequest};
use di_common::{BuilderOptions, ResolveResult, ResolveStrategy, TypeInfo};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// 依赖注入容器（作用域）
#[derive(Clone)]
pub struct DiContainer {
    tree: Arc<ScopeTree>,
    id: ScopeId,
    parent: Option<ScopeId>,
}

impl DiContainer {
    pub(crate) fn new(tree: Arc<ScopeTree>, id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self { tree, id, parent }
    }

    pub(crate) fn tree(&self) -> Arc<ScopeTree> {
        Arc::clone(&self.tree)
    }

    /// 作用域标识
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// 以 `Any` 策略解析服务
    pub fn resolve<R>(&self) -> ResolveResult<Arc<R>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        self.resolve_with::<R>(ResolveStrategy::Any)
    }

    /// 以指定策略解析服务
    pub fn resolve_with<R>(&self, strategy: ResolveStrategy) -> ResolveResult<Arc<R>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let request = ServiceRequest::of::<R>();
        let instance = self.resolve_request(&request, strategy)?;
        typed::<R>(&instance, &request.type_info)
    }

    /// 以 `Any` 策略解析所有匹配的服务
    pub fn resolve_many<R>(&self) -> ResolveResult<Vec<Arc<R>>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        self.resolve_many_with::<R>(ResolveStrategy::Any)
    }

    /// 以指定策略解析所有匹配的服务
    pub fn resolve_many_with<R>(&self, strategy: ResolveStrategy) -> ResolveResult<Vec<Arc<R>>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<R>();
        self.tree.live(self.id)?;

        let mut context = ResolveContext::new(&self.tree, self.id, strategy);
        context
            .resolve_all(&type_info)?
            .iter()
            .map(|instance| typed::<R>(instance, &type_info))
            .collect()
    }

    /// 以 `Any` 策略解析闭合泛型服务
    pub fn resolve_generic<G: ClosedGeneric>(&self) -> ResolveResult<Arc<G>> {
        self.resolve_generic_with::<G>(ResolveStrategy::Any)
    }

    /// 以指定策略解析闭合泛型服务
    pub fn resolve_generic_with<G: ClosedGeneric>(
        &self,
        strategy: ResolveStrategy,
    ) -> ResolveResult<Arc<G>> {
        let request = ServiceRequest::generic::<G>();
        let instance = self.resolve_request(&request, strategy)?;
        typed::<G>(&instance, &request.type_info)
    }

    fn resolve_request(
        &self,
        request: &ServiceRequest,
        strategy: ResolveStrategy,
    ) -> ResolveResult<Instance> {
        self.tree.live(self.id)?;
        ResolveContext::new(&self.tree, self.id, strategy).resolve(request)
    }

    /// 检查服务是否可以在作用域链上找到（`Any` 策略）
    pub fn is_registered<R: ?Sized + 'static>(&self) -> bool {
        self.is_registered_by_type_info(&TypeInfo::of::<R>(), ResolveStrategy::Any)
    }

    /// 按类型信息和策略检查服务是否已注册，容器释放后总是返回 `false`
    pub fn is_registered_by_type_info(
        &self,
        type_info: &TypeInfo,
        strategy: ResolveStrategy,
    ) -> bool {
        let request = ServiceRequest::new(*type_info);
        matches!(
            find(&self.tree, self.id, &request, strategy),
            Ok(Lookup::Unique { .. } | Lookup::Ambiguous { .. })
        )
    }

    /// 创建子作用域构建器，继承当前作用域的构建策略
    pub fn create_child_builder(&self) -> ResolveResult<DiContainerBuilder> {
        let options = self.tree.live(self.id)?.options;
        Ok(DiContainerBuilder::child_of(self.clone(), options))
    }

    /// 使用指定策略创建子作用域构建器
    pub fn create_child_builder_with(
        &self,
        options: BuilderOptions,
    ) -> ResolveResult<DiContainerBuilder> {
        self.tree.live(self.id)?;
        Ok(DiContainerBuilder::child_of(self.clone(), options))
    }

    /// 当前作用域的注册信息
    pub fn registered_services(&self) -> Vec<ServiceInfo> {
        self.tree
            .live(self.id)
            .map(|scope| {
                scope
                    .descriptors
                    .iter()
                    .map(|descriptor| descriptor.info())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 是否有父作用域
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// 是否已经释放
    pub fn is_disposed(&self) -> bool {
        self.tree.is_disposed(self.id)
    }

    /// 释放作用域
    ///
    /// 按记录的逆序释放本作用域创建的实例，父作用域和子作用域不受影响。
    /// 第二次调用返回 `ContainerDisposed`。异步释放契约会在当前线程上阻塞执行，
    /// 在异步运行时中应使用 [`DiContainer::dispose_async`]。
    pub fn dispose(&self) -> ResolveResult<()> {
        let disposals = self.retire()?;
        dispose_blocking(disposals);
        Ok(())
    }

    /// 异步释放作用域
    pub async fn dispose_async(&self) -> ResolveResult<()> {
        let disposals = self.retire()?;
        dispose_all(disposals).await;
        Ok(())
    }

    fn retire(&self) -> ResolveResult<Vec<Disposal>> {
        let scope: Arc<LiveScope> = self.tree.retire(self.id)?;
        let disposals = scope.disposer.lock().drain();
        info!("释放作用域 {}，共 {} 个可释放实例", self.id, disposals.len());
        Ok(disposals)
    }
}

impl fmt::Debug for DiContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiContainer")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
