//! 启发式构造函数选择与开放泛型集成测试


use common::{ConsoleLogger, ErrorLogger};
use di_abstractions::{
    provides, ClosedGeneric, Component, Constructor, Dependency, Injectable,
};
use di_common::{BuilderOptions, ConstructorSelection, Lifetime, ResolveError};
use di_impl::{DiContainer, DiContainerBuilder};
use std::marker::PhantomData;
use std::sync::Arc;

pub trait Directory: Send + Sync {}

pub struct TempDirectory;

impl Directory for TempDirectory {}

impl Component for TempDirectory {}

impl Injectable for TempDirectory {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new", Vec::new(), |_| Ok(TempDirectory))]
    }
}

provides!(TempDirectory => dyn Directory);

/// 三个构造函数：无参、依赖日志、依赖目录
pub struct Report {
    constructor: &'static str,
}

impl Component for Report {}

impl Injectable for Report {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new("new", Vec::new(), |_| Ok(Report { constructor: "new" })),
            Constructor::new(
                "with_logger",
                vec![Dependency::of::<dyn ErrorLogger>()],
                |resolver| {
                    resolver.resolve::<dyn ErrorLogger>()?;
                    Ok(Report {
                        constructor: "with_logger",
                    })
                },
            ),
            Constructor::new(
                "with_directory",
                vec![Dependency::of::<dyn Directory>()],
                |resolver| {
                    resolver.resolve::<dyn Directory>()?;
                    Ok(Report {
                        constructor: "with_directory",
                    })
                },
            ),
        ]
    }
}

fn heuristic_container(register: impl FnOnce(&mut DiContainerBuilder)) -> DiContainer {
    let mut builder = DiContainerBuilder::with_options(
        BuilderOptions::new()
            .with_constructor_selection(ConstructorSelection::MostSatisfiableParameters),
    );
    builder.register_type::<Report>(Lifetime::Transient).unwrap();
    register(&mut builder);
    builder.build().unwrap()
}

#[test]
fn test_satisfiable_constructor_with_most_parameters_wins() {
    let container = heuristic_container(|builder| {
        builder
            .register::<dyn ErrorLogger, ConsoleLogger>(Lifetime::Singleton)
            .unwrap();
    });

    assert_eq!(container.resolve::<Report>().unwrap().constructor, "with_logger");
}

#[test]
fn test_falls_back_to_parameterless_constructor() {
    let container = heuristic_container(|_| {});

    assert_eq!(container.resolve::<Report>().unwrap().constructor, "new");
}

#[test]
fn test_tie_in_highest_satisfiable_tier_is_ambiguous() {
    let container = heuristic_container(|builder| {
        builder
            .register::<dyn ErrorLogger, ConsoleLogger>(Lifetime::Singleton)
            .unwrap()
            .register::<dyn Directory, TempDirectory>(Lifetime::Singleton)
            .unwrap();
    });

    assert!(matches!(
        container.resolve::<Report>(),
        Err(ResolveError::AmbiguousConstructor { arity: 1, .. })
    ));
}

#[test]
fn test_satisfiability_follows_scope_chain() {
    let mut root_builder = DiContainerBuilder::new();
    root_builder
        .register::<dyn Directory, TempDirectory>(Lifetime::Singleton)
        .unwrap();
    let root = root_builder.build().unwrap();

    let mut child_builder = root
        .create_child_builder_with(
            BuilderOptions::new()
                .with_constructor_selection(ConstructorSelection::MostSatisfiableParameters),
        )
        .unwrap();
    child_builder
        .register_type::<Report>(Lifetime::Transient)
        .unwrap();
    let child = child_builder.build().unwrap();

    assert_eq!(child.resolve::<Report>().unwrap().constructor, "with_directory");
}

pub struct RepositoryDefinition;

pub struct Repository<T> {
    pub logger: Arc<dyn ErrorLogger>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Component for Repository<T> {}

impl<T: 'static> Injectable for Repository<T> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(
            "new",
            vec![Dependency::of::<dyn ErrorLogger>()],
            |resolver| {
                Ok(Repository {
                    logger: resolver.resolve::<dyn ErrorLogger>()?,
                    _marker: PhantomData,
                })
            },
        )]
    }
}

impl<T: 'static> ClosedGeneric for Repository<T> {
    type Definition = RepositoryDefinition;
}

struct Order;
struct Invoice;

fn generic_root(lifetime: Lifetime) -> DiContainer {
    let mut builder = DiContainerBuilder::new();
    builder
        .register::<dyn ErrorLogger, ConsoleLogger>(Lifetime::Singleton)
        .unwrap()
        .register_open_generic::<RepositoryDefinition>(lifetime)
        .unwrap();
    builder.build().unwrap()
}

#[test]
fn test_open_generic_singleton_per_closed_type() {
    let container = generic_root(Lifetime::Singleton);

    let orders = container.resolve_generic::<Repository<Order>>().unwrap();
    let orders_again = container.resolve_generic::<Repository<Order>>().unwrap();
    let invoices = container.resolve_generic::<Repository<Invoice>>().unwrap();

    assert!(Arc::ptr_eq(&orders, &orders_again));
    assert_ne!(
        Arc::as_ptr(&orders).cast::<()>(),
        Arc::as_ptr(&invoices).cast::<()>()
    );
    assert!(Arc::ptr_eq(&orders.logger, &invoices.logger));
}

#[test]
fn test_open_generic_transient_builds_each_time() {
    let container = generic_root(Lifetime::Transient);

    let first = container.resolve_generic::<Repository<Order>>().unwrap();
    let second = container.resolve_generic::<Repository<Order>>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_exact_registration_wins_over_open_generic() {
    let root = generic_root(Lifetime::Singleton);
    let mut child_builder = root.create_child_builder().unwrap();
    child_builder
        .register_type::<Repository<Order>>(Lifetime::Singleton)
        .unwrap();
    let child = child_builder.build().unwrap();

    let from_child = child.resolve_generic::<Repository<Order>>().unwrap();
    let from_root = root.resolve_generic::<Repository<Order>>().unwrap();

    assert!(!Arc::ptr_eq(&from_child, &from_root));
    // 精确注册同样可以按普通类型解析
    assert!(Arc::ptr_eq(&from_child, &child.resolve::<Repository<Order>>().unwrap()));
}

#[test]
fn test_open_generic_from_child_scope_is_owned_by_root() {
    let root = generic_root(Lifetime::Singleton);
    let child = root.create_child_builder().unwrap().build().unwrap();

    let from_child = child.resolve_generic::<Repository<Invoice>>().unwrap();
    let from_root = root.resolve_generic::<Repository<Invoice>>().unwrap();

    assert!(Arc::ptr_eq(&from_child, &from_root));
}
