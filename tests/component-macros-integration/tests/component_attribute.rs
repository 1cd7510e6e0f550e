//! `#[component]` 属性宏与 `#[derive(Injectable)]` 的集成测试

use async_trait::async_trait;
use component_macros::{component, Injectable};
use di_abstractions::{
    AsyncDispose, Component, ConstructorInspector, Dispose, DisposalKind, Injectable,
    MetadataScanner, ModuleManifest, ProducibleType, Registrable,
};
use di_common::{Lifetime, TypeInfo};
use di_impl::DiContainerBuilder;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn lines(&self) -> Vec<String>;
}

pub trait Exporter: Send + Sync {
    fn format(&self) -> &'static str;
}

#[component(singleton, dispose, requested = dyn Logger)]
#[derive(Injectable)]
pub struct MemoryLogger {
    #[inject(default)]
    lines: Mutex<Vec<String>>,
    #[inject(default)]
    closed: AtomicBool,
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Dispose for MemoryLogger {
    fn dispose(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[component(transient, provides(dyn Exporter), requested = dyn Exporter)]
#[derive(Injectable)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> &'static str {
        "csv"
    }
}

#[component(transient, provides(dyn Exporter), requested = dyn Exporter)]
#[derive(Injectable)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> &'static str {
        "json"
    }
}

#[component(singleton)]
#[derive(Injectable)]
pub struct ReportService {
    logger: Arc<dyn Logger>,
    exporters: Vec<Arc<dyn Exporter>>,
}

impl ReportService {
    pub fn publish(&self) -> Vec<&'static str> {
        let formats: Vec<&'static str> = self.exporters.iter().map(|e| e.format()).collect();
        self.logger.log(&format!("published {}", formats.len()));
        formats
    }
}

#[component(dispose_async)]
#[derive(Injectable)]
pub struct Session {
    #[inject(default)]
    flushed: AtomicUsize,
}

#[async_trait]
impl AsyncDispose for Session {
    async fn dispose_async(&self) {
        self.flushed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_component_trait_implementation() {
    assert_eq!(MemoryLogger::disposal_kind(), DisposalKind::Sync);
    assert_eq!(Session::disposal_kind(), DisposalKind::Async);
    assert_eq!(CsvExporter::disposal_kind(), DisposalKind::None);
    assert_eq!(MemoryLogger::constructors().len(), 1);
}

#[test]
fn test_injectable_lists_field_dependencies() {
    let producible = ProducibleType::of::<ReportService>();
    let constructors = producible.constructors();

    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].name, "new");
    assert_eq!(constructors[0].arity(), 2);
    assert_eq!(constructors[0].parameters[0].type_info, TypeInfo::of::<dyn Logger>());
    assert!(constructors[0].parameters[1].is_sequence());
    assert_eq!(ProducibleType::of::<MemoryLogger>().constructors()[0].arity(), 0);
}

#[test]
fn test_registrable_metadata() {
    let metadata = MemoryLogger::component_metadata();

    assert_eq!(metadata.lifetime, Lifetime::Singleton);
    assert_eq!(metadata.requested_type(), TypeInfo::of::<dyn Logger>());
    assert!(metadata.cast_for(&TypeInfo::of::<dyn Logger>()).is_some());

    let metadata = ReportService::component_metadata();
    assert_eq!(metadata.requested_type(), TypeInfo::of::<ReportService>());
}

#[test]
fn test_manifest_registration_resolves_graph() {
    let manifest = ModuleManifest::new("reporting")
        .with::<MemoryLogger>()
        .with::<CsvExporter>()
        .with::<JsonExporter>()
        .with::<ReportService>();
    assert_eq!(manifest.scan().unwrap().len(), 4);

    let mut builder = DiContainerBuilder::new();
    assert_eq!(builder.scan_and_register(&manifest).unwrap(), 4);
    let container = builder.build().unwrap();

    let service = container.resolve::<ReportService>().unwrap();
    let mut formats = service.publish();
    formats.sort_unstable();
    assert_eq!(formats, vec!["csv", "json"]);

    let logger = container.resolve::<dyn Logger>().unwrap();
    assert_eq!(logger.lines(), vec!["published 2".to_string()]);

    container.dispose().unwrap();
}

#[test]
fn test_generated_disposal_runs_on_scope_dispose() {
    let mut builder = DiContainerBuilder::new();
    builder.register_type::<MemoryLogger>(Lifetime::Singleton).unwrap();
    let container = builder.build().unwrap();

    let logger = container.resolve::<MemoryLogger>().unwrap();
    assert!(!logger.closed.load(Ordering::SeqCst));

    container.dispose().unwrap();
    assert!(logger.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_generated_async_disposal() {
    let mut builder = DiContainerBuilder::new();
    builder.register_type::<Session>(Lifetime::Singleton).unwrap();
    let container = builder.build().unwrap();

    let session = container.resolve::<Session>().unwrap();
    container.dispose_async().await.unwrap();

    assert_eq!(session.flushed.load(Ordering::SeqCst), 1);
}
