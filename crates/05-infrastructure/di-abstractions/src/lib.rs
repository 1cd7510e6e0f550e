//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组合运行时与组件之间的能力接口。
//!
//! ## 核心接口
//!
//! - [`Component`] - 组件基础 trait 与释放契约（[`Dispose`] / [`AsyncDispose`]）
//! - [`Provides`] - 可赋值关系（具体类型可以作为哪些请求类型交出）
//! - [`Injectable`] / [`ConstructorInspector`] - 构造函数检查能力
//! - [`DependencyResolver`] - 构造过程中的依赖解析接口
//! - [`MetadataScanner`] - 声明式元数据扫描器接口
//! - [`ClosedGeneric`] - 开放泛型的闭合类型

pub mod component;
pub mod factory;
pub mod generic;
pub mod provides;
pub mod resolver;
pub mod scanner;

pub use component::*;
pub use factory::*;
pub use generic::*;
pub use provides::*;
pub use resolver::*;
pub use scanner::*;

pub use di_common::{Lifetime, ResolveError, ResolveResult, ResolveStrategy, TypeInfo};
