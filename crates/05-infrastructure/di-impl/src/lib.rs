//! # 依赖注入具体实现
//!
//! 提供作用域容器、容器构建器以及解析和释放的具体实现。
//!
//! - [`DiContainerBuilder`] - 注册并校验服务，构建一个作用域
//! - [`DiContainer`] - 作用域：按 Local / NonLocal / Any 策略解析服务，释放时按逆序释放实例
//!
//! ```rust
//! use di_abstractions::{provides, Component, Constructor, Injectable};
//! use di_common::Lifetime;
//! use di_impl::DiContainerBuilder;
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! pub struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! impl Component for FixedClock {}
//!
//! impl Injectable for FixedClock {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new("new", Vec::new(), |_| Ok(FixedClock))]
//!     }
//! }
//!
//! provides!(FixedClock => dyn Clock);
//!
//! let mut builder = DiContainerBuilder::new();
//! builder.register::<dyn Clock, FixedClock>(Lifetime::Singleton)?;
//! let container = builder.build()?;
//!
//! assert_eq!(container.resolve::<dyn Clock>()?.now(), 42);
//! container.dispose()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod container;
mod context;
mod descriptor;
mod disposer;
mod scope;
mod selection;
mod strategy;

pub use builder::DiContainerBuilder;
pub use container::DiContainer;
pub use descriptor::{ServiceInfo, SourceKind};
pub use scope::ScopeId;
