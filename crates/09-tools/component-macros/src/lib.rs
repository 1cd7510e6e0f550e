//! # Component Macros
//!
//! 这个 crate 提供了满足构造检查能力的过程宏：为组件生成释放契约、
//! 接口视图、声明式注册元数据以及构造函数列表。
//!
//! ## 核心宏
//!
//! - [`component`] - 组件属性宏
//! - [`Component`](derive@Component) - 组件派生宏（与属性宏参数相同）
//! - [`Injectable`](derive@Injectable) - 按字段生成构造函数
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{component, Injectable};
//! use std::sync::Arc;
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//!
//! #[component(singleton, dispose, requested = dyn Logger)]
//! #[derive(Injectable)]
//! pub struct FileLogger {
//!     #[inject(default)]
//!     lines: parking_lot::Mutex<Vec<String>>,
//! }
//! ```
//!
//! 生成的代码引用 `::di_abstractions`，使用方需要直接依赖该 crate。

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod injectable;
mod utils;

// Re-exports are not allowed in proc-macro crates

/// 组件属性宏
///
/// 为结构体实现 `Component`，并按参数生成 `Provides` 和 `Registrable` 实现。
///
/// # 参数
///
/// - `singleton` / `transient` - 声明式注册的生命周期，声明后生成 `Registrable`
/// - `dispose` - 组件实现了 `Dispose`，由作用域释放
/// - `dispose_async` - 组件实现了 `AsyncDispose`，由作用域释放
/// - `provides(dyn A, dyn B)` - 组件可以作为这些请求类型交出
/// - `requested = dyn A` - 声明式注册使用的请求类型
///
/// 使用 `singleton` / `transient` 时组件还需要实现 `Injectable`。
///
/// # 示例
///
/// ```rust,ignore
/// #[component(transient, provides(dyn Handler))]
/// #[derive(Injectable)]
/// pub struct PingHandler;
/// ```
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(args, input)
}

/// 组件派生宏
///
/// 参数写在 `#[component(...)]` 辅助属性中，含义与 [`macro@component`] 相同。
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Component, Injectable)]
/// #[component(singleton, dispose, provides(dyn Cache))]
/// pub struct MemoryCache;
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
}

/// 构造函数派生宏
///
/// 生成唯一的构造函数 `new`：
///
/// - `Arc<T>` 字段 - 解析单个 `T`
/// - `Vec<Arc<T>>` 字段 - 解析所有 `T`（总是可满足）
/// - `#[inject(default)]` 字段 - 使用 `Default::default()`
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// pub struct ReportService {
///     logger: Arc<dyn Logger>,
///     exporters: Vec<Arc<dyn Exporter>>,
///     #[inject(default)]
///     title: String,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
}
