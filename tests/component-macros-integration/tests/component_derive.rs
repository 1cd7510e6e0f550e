//! `#[derive(Component)]` 派生宏的集成测试

use component_macros::{Component, Injectable};
use di_abstractions::{
    ClosedGeneric, Component, Dispose, DisposalKind, Provides, Registrable,
};
use di_common::{BuilderOptions, Lifetime, ResolveError, TransientDisposables};
use di_impl::DiContainerBuilder;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;

pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Component, Injectable)]
#[component(transient, dispose, provides(dyn Cache))]
pub struct MemoryCache {
    #[inject(default)]
    entries: Mutex<Vec<(String, String)>>,
    #[inject(default)]
    disposed: Mutex<bool>,
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl Dispose for MemoryCache {
    fn dispose(&self) {
        *self.disposed.lock() = true;
    }
}

#[derive(Component, Injectable)]
pub struct Repository<T: Send + Sync + 'static> {
    cache: Arc<dyn Cache>,
    #[inject(default)]
    _marker: PhantomData<fn() -> T>,
}

/// `Repository<_>` 的开放定义标记
pub struct RepositoryDefinition;

impl<T: Send + Sync + 'static> ClosedGeneric for Repository<T> {
    type Definition = RepositoryDefinition;
}

pub struct Order;
pub struct Invoice;

fn assert_provides<R: ?Sized + Send + Sync + 'static, I: Provides<R>>() {}

#[test]
fn test_derive_generates_component_and_views() {
    assert_eq!(MemoryCache::disposal_kind(), DisposalKind::Sync);
    assert_provides::<dyn Cache, MemoryCache>();

    let metadata = MemoryCache::component_metadata();
    assert_eq!(metadata.lifetime, Lifetime::Transient);
    assert_eq!(metadata.interfaces.len(), 2);
}

#[test]
fn test_transient_disposable_needs_tracking_policy() {
    let mut builder = DiContainerBuilder::new();
    let result = builder.register_metadata(MemoryCache::component_metadata());
    assert!(result.is_err());

    let options =
        BuilderOptions::default().with_transient_disposables(TransientDisposables::TrackAndDispose);
    let mut builder = DiContainerBuilder::with_options(options);
    builder
        .register::<dyn Cache, MemoryCache>(Lifetime::Transient)
        .unwrap();
    let container = builder.build().unwrap();

    let cache = container.resolve::<dyn Cache>().unwrap();
    assert_eq!(cache.get("missing"), None);
    container.dispose().unwrap();
}

#[test]
fn test_derived_generic_component_closes_open_definition() {
    let options =
        BuilderOptions::default().with_transient_disposables(TransientDisposables::TrackAndDispose);
    let mut builder = DiContainerBuilder::with_options(options);
    builder
        .register::<dyn Cache, MemoryCache>(Lifetime::Singleton)
        .unwrap()
        .register_open_generic::<RepositoryDefinition>(Lifetime::Singleton)
        .unwrap();
    let container = builder.build().unwrap();

    let orders = container.resolve_generic::<Repository<Order>>().unwrap();
    let orders_again = container.resolve_generic::<Repository<Order>>().unwrap();
    let invoices = container.resolve_generic::<Repository<Invoice>>().unwrap();

    assert!(Arc::ptr_eq(&orders, &orders_again));
    assert!(Arc::ptr_eq(&orders.cache, &invoices.cache));
    assert!(matches!(
        container.resolve::<Repository<Order>>(),
        Err(ResolveError::ServiceNotFound { .. })
    ));
}
