//! 作用域释放集成测试


use common::{disposal_log, AsyncSession, Child, DisposalLog, GrandParent, Parent};
use di_common::{
    BuilderOptions, Lifetime, RegistrationError, ResolveError, ResolveStrategy,
    TransientDisposables,
};
use di_abstractions::{Component, Disposal, DisposalKind, Dispose};
use di_impl::{DiContainer, DiContainerBuilder};
use parking_lot::Mutex;
use std::sync::Arc;

fn register_family(builder: &mut DiContainerBuilder, log: &DisposalLog) {
    builder
        .register_instance::<Mutex<Vec<&'static str>>>(Arc::clone(log), Lifetime::Singleton)
        .unwrap()
        .register_type::<Child>(Lifetime::Singleton)
        .unwrap()
        .register_type::<Parent>(Lifetime::Singleton)
        .unwrap()
        .register_type::<GrandParent>(Lifetime::Singleton)
        .unwrap();
}

fn family_container(log: &DisposalLog) -> DiContainer {
    let mut builder = DiContainerBuilder::new();
    register_family(&mut builder, log);
    builder.build().unwrap()
}

#[test]
fn test_disposal_runs_in_reverse_construction_order() {
    let log = disposal_log();
    let container = family_container(&log);

    container.resolve::<GrandParent>().unwrap();
    container.dispose().unwrap();

    assert_eq!(*log.lock(), vec!["GrandParent", "Parent", "Child"]);
}

#[test]
fn test_unresolved_services_are_not_disposed() {
    let log = disposal_log();
    let container = family_container(&log);

    container.resolve::<Child>().unwrap();
    container.dispose().unwrap();

    assert_eq!(*log.lock(), vec!["Child"]);
}

#[test]
fn test_dispose_twice_reports_container_disposed() {
    let log = disposal_log();
    let container = family_container(&log);
    container.resolve::<GrandParent>().unwrap();

    container.dispose().unwrap();
    assert!(matches!(
        container.dispose(),
        Err(ResolveError::ContainerDisposed)
    ));
    // 第二次释放不会再次调用释放契约
    assert_eq!(log.lock().len(), 3);
}

#[test]
fn test_resolve_after_dispose_fails() {
    let log = disposal_log();
    let container = family_container(&log);
    container.dispose().unwrap();

    assert!(container.is_disposed());
    assert!(matches!(
        container.resolve::<Child>(),
        Err(ResolveError::ContainerDisposed)
    ));
    assert!(matches!(
        container.resolve_many::<Child>(),
        Err(ResolveError::ContainerDisposed)
    ));
    assert!(matches!(
        container.create_child_builder(),
        Err(ResolveError::ContainerDisposed)
    ));
}

#[test]
fn test_child_disposal_leaves_parent_untouched() {
    let log = disposal_log();
    let root = family_container(&log);
    let root_child = root.resolve::<Child>().unwrap();

    let options =
        BuilderOptions::new().with_transient_disposables(TransientDisposables::TrackAndDispose);
    let mut child_builder = root.create_child_builder_with(options).unwrap();
    child_builder
        .register_type::<Child>(Lifetime::Transient)
        .unwrap();
    let scope = child_builder.build().unwrap();

    let local_child = scope.resolve::<Child>().unwrap();
    assert!(!Arc::ptr_eq(&root_child, &local_child));

    scope.dispose().unwrap();
    assert_eq!(*log.lock(), vec!["Child"]);
    assert!(!root.is_disposed());

    let again = root.resolve::<Child>().unwrap();
    assert!(Arc::ptr_eq(&root_child, &again));

    root.dispose().unwrap();
    assert_eq!(*log.lock(), vec!["Child", "Child"]);
}

#[test]
fn test_singleton_resolved_from_child_belongs_to_owner_scope() {
    let log = disposal_log();
    let root = family_container(&log);
    let scope = root.create_child_builder().unwrap().build().unwrap();

    scope.resolve::<Parent>().unwrap();
    scope.dispose().unwrap();
    assert!(log.lock().is_empty());

    root.dispose().unwrap();
    assert_eq!(*log.lock(), vec!["Parent", "Child"]);
}

#[test]
fn test_transient_disposables_tracked_per_resolution() {
    let log = disposal_log();
    let options =
        BuilderOptions::new().with_transient_disposables(TransientDisposables::TrackAndDispose);
    let mut builder = DiContainerBuilder::with_options(options);
    builder
        .register_instance::<Mutex<Vec<&'static str>>>(Arc::clone(&log), Lifetime::Singleton)
        .unwrap()
        .register_type::<Child>(Lifetime::Transient)
        .unwrap();
    let container = builder.build().unwrap();

    container.resolve::<Child>().unwrap();
    container.resolve::<Child>().unwrap();
    container.dispose().unwrap();

    assert_eq!(*log.lock(), vec!["Child", "Child"]);
}

#[test]
fn test_prebuilt_instances_are_never_disposed() {
    let log = disposal_log();
    let mut seed = DiContainerBuilder::new();
    register_family(&mut seed, &log);
    let seeded = seed.build().unwrap();
    let child = seeded.resolve::<Child>().unwrap();

    let mut builder = DiContainerBuilder::new();
    builder
        .register_instance(Arc::clone(&child), Lifetime::Singleton)
        .unwrap();
    let container = builder.build().unwrap();
    assert!(Arc::ptr_eq(&child, &container.resolve::<Child>().unwrap()));

    container.dispose().unwrap();
    assert!(log.lock().is_empty());
}

#[test]
fn test_parent_disposal_does_not_cascade() {
    let log = disposal_log();
    let root = family_container(&log);
    let mut child_builder = root.create_child_builder().unwrap();
    child_builder
        .register_instance(Arc::new(String::from("local")), Lifetime::Singleton)
        .unwrap();
    let scope = child_builder.build().unwrap();

    root.dispose().unwrap();

    assert!(!scope.is_disposed());
    assert_eq!(
        scope
            .resolve_with::<String>(ResolveStrategy::Local)
            .unwrap()
            .as_str(),
        "local"
    );
    // 向上查找会遇到已释放的父作用域
    assert!(matches!(
        scope.resolve::<Child>(),
        Err(ResolveError::ContainerDisposed)
    ));
    scope.dispose().unwrap();
}

#[test]
fn test_building_child_of_disposed_parent_fails() {
    let log = disposal_log();
    let root = family_container(&log);
    let mut child_builder = root.create_child_builder().unwrap();

    root.dispose().unwrap();

    assert!(matches!(
        child_builder.build(),
        Err(RegistrationError::ParentScopeDisposed)
    ));
}

#[tokio::test]
async fn test_async_disposal_awaits_async_contracts() {
    let log = disposal_log();
    let mut builder = DiContainerBuilder::new();
    register_family(&mut builder, &log);
    builder
        .register_type::<AsyncSession>(Lifetime::Singleton)
        .unwrap();
    let container = builder.build().unwrap();

    container.resolve::<Child>().unwrap();
    container.resolve::<AsyncSession>().unwrap();
    container.dispose_async().await.unwrap();

    assert_eq!(*log.lock(), vec!["AsyncSession", "Child"]);
    assert!(matches!(
        container.dispose_async().await,
        Err(ResolveError::ContainerDisposed)
    ));
}

#[test]
fn test_sync_dispose_runs_async_contracts_to_completion() {
    let log = disposal_log();
    let mut builder = DiContainerBuilder::new();
    register_family(&mut builder, &log);
    builder
        .register_type::<AsyncSession>(Lifetime::Singleton)
        .unwrap();
    let container = builder.build().unwrap();

    container.resolve::<AsyncSession>().unwrap();
    container.dispose().unwrap();

    assert_eq!(*log.lock(), vec!["AsyncSession"]);
}

#[test]
fn test_disposed_child_handle_stays_disposed_after_slot_reuse() {
    let log = disposal_log();
    let root = family_container(&log);
    let first = root.create_child_builder().unwrap().build().unwrap();
    first.dispose().unwrap();

    let second = root.create_child_builder().unwrap().build().unwrap();

    assert!(first.is_disposed());
    assert!(!second.is_disposed());
    assert!(matches!(
        first.resolve::<Child>(),
        Err(ResolveError::ContainerDisposed)
    ));
    assert!(matches!(
        first.dispose(),
        Err(ResolveError::ContainerDisposed)
    ));
    second.resolve::<Child>().unwrap();
}

/// 构造完成前所在作用域就被释放的租约
struct Lease {
    log: DisposalLog,
}

impl Dispose for Lease {
    fn dispose(&self) {
        self.log.lock().push("Lease");
    }
}

impl Component for Lease {
    fn disposal_kind() -> DisposalKind {
        DisposalKind::Sync
    }

    fn disposal(self: Arc<Self>) -> Option<Disposal> {
        Some(Disposal::sync(self))
    }
}

#[test]
fn test_instance_built_after_scope_disposal_is_released_immediately() {
    let log = disposal_log();
    let handle: Arc<Mutex<Option<DiContainer>>> = Arc::new(Mutex::new(None));

    let mut builder = DiContainerBuilder::new();
    let factory_log = Arc::clone(&log);
    let factory_handle = Arc::clone(&handle);
    builder
        .register_type_factory(Lifetime::Singleton, move |_| {
            // 构造过程中释放自己所在的作用域
            let pending = factory_handle.lock().take();
            if let Some(container) = pending {
                container.dispose()?;
            }
            Ok(Lease {
                log: Arc::clone(&factory_log),
            })
        })
        .unwrap();
    let container = builder.build().unwrap();
    *handle.lock() = Some(container.clone());

    assert!(matches!(
        container.resolve::<Lease>(),
        Err(ResolveError::ContainerDisposed)
    ));
    assert!(container.is_disposed());
    assert_eq!(*log.lock(), vec!["Lease"]);
}
