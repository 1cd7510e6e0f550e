//! 组合运行时简化示例
//!
//! 根作用域通过模块清单注册仓储、缓存和用户服务；每个请求创建一个子作用域，
//! 在子作用域中注册请求上下文和审计记录，请求结束时异步释放子作用域。

use async_trait::async_trait;
use component_macros::{component, Injectable};
use di_abstractions::{AsyncDispose, Dispose, ModuleManifest};
use di_common::BuilderOptions;
use di_impl::{DiContainer, DiContainerBuilder};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 宿主应用的构建器配置
const COMPOSITION_OPTIONS: &str = r#"
constructor_selection = "strict"
transient_disposables = "reject"
second_registration = "throw"
"#;

// 示例：用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

// 示例：Repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Option<User>;
    async fn save(&self, user: User);
}

/// 内存用户仓储
#[component(singleton, provides(dyn UserRepository), requested = dyn UserRepository)]
#[derive(Injectable)]
pub struct MemoryUserRepository {
    #[inject(default)]
    users: Mutex<HashMap<u64, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: u64) -> Option<User> {
        self.users.lock().get(&id).cloned()
    }

    async fn save(&self, user: User) {
        self.users.lock().insert(user.id, user);
    }
}

/// 以 JSON 文本缓存用户，作用域释放时清空
#[component(singleton, dispose)]
#[derive(Injectable)]
pub struct UserCache {
    #[inject(default)]
    entries: Mutex<HashMap<String, String>>,
}

impl UserCache {
    fn get_user(&self, key: &str) -> Option<User> {
        self.entries
            .lock()
            .get(key)
            .and_then(|json| serde_json::from_str(json).ok())
    }

    fn set_user(&self, key: &str, user: &User) -> serde_json::Result<()> {
        let json = serde_json::to_string(user)?;
        self.entries.lock().insert(key.to_string(), json);
        Ok(())
    }
}

impl Dispose for UserCache {
    fn dispose(&self) {
        let mut entries = self.entries.lock();
        info!("清空用户缓存，共 {} 条", entries.len());
        entries.clear();
    }
}

/// 当前请求的上下文，由请求作用域以预构建实例提供
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: u64,
}

/// 请求级审计记录，请求作用域释放时输出
#[component(dispose_async)]
#[derive(Injectable)]
pub struct AuditTrail {
    request: Arc<RequestContext>,
    #[inject(default)]
    entries: Mutex<Vec<String>>,
}

impl AuditTrail {
    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }
}

#[async_trait]
impl AsyncDispose for AuditTrail {
    async fn dispose_async(&self) {
        let entries = std::mem::take(&mut *self.entries.lock());
        info!(
            "请求 {} 结束，审计记录: {:?}",
            self.request.request_id, entries
        );
    }
}

/// 用户服务
///
/// 瞬时服务在解析它的作用域中构造，因此可以依赖请求作用域中的审计记录。
#[component(transient)]
#[derive(Injectable)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    cache: Arc<UserCache>,
    audit: Arc<AuditTrail>,
}

impl UserService {
    pub async fn get_user(&self, id: u64) -> Option<User> {
        // 先尝试从缓存获取
        let cache_key = format!("user:{}", id);
        if let Some(user) = self.cache.get_user(&cache_key) {
            self.audit.record(format!("缓存命中 {}", cache_key));
            return Some(user);
        }

        let user = self.repository.find_by_id(id).await?;
        if let Err(e) = self.cache.set_user(&cache_key, &user) {
            debug!("缓存用户失败: {}", e);
        }
        self.audit.record(format!("从仓储加载 {}", cache_key));
        Some(user)
    }
}

/// 构建根作用域
fn compose_root() -> anyhow::Result<DiContainer> {
    let options = BuilderOptions::from_toml_str(COMPOSITION_OPTIONS)?;
    let manifest = ModuleManifest::new("users")
        .with::<MemoryUserRepository>()
        .with::<UserCache>()
        .with::<UserService>();

    let mut builder = DiContainerBuilder::with_options(options);
    let count = builder.scan_and_register(&manifest)?;
    info!("根作用域注册了 {} 个组件", count);
    Ok(builder.build()?)
}

/// 在独立的子作用域中处理一个请求
async fn handle_request(root: &DiContainer, request_id: u64, user_id: u64) -> anyhow::Result<()> {
    let mut builder = root.create_child_builder()?;
    builder
        .register_instance(
            Arc::new(RequestContext { request_id }),
            di_common::Lifetime::Singleton,
        )?
        .register_type::<AuditTrail>(di_common::Lifetime::Singleton)?;
    let scope = builder.build()?;

    let service = scope.resolve::<UserService>()?;
    match service.get_user(user_id).await {
        Some(user) => println!("请求 {}: 找到用户 {} <{}>", request_id, user.name, user.email),
        None => println!("请求 {}: 用户 {} 不存在", request_id, user_id),
    }

    scope.dispose_async().await?;
    Ok(())
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let root = compose_root()?;

    let repository = root.resolve::<dyn UserRepository>()?;
    repository
        .save(User {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        })
        .await;

    println!("=== 请求作用域示例 ===");
    handle_request(&root, 1, 1).await?;
    handle_request(&root, 2, 1).await?;
    handle_request(&root, 3, 42).await?;

    root.dispose_async().await?;
    Ok(())
}
