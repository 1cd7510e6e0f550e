//! # DI Common
//!
//! 组合运行时的公共类型：类型信息、生命周期、解析策略、构建器选项和错误分类。
//!
//! ## 核心类型
//!
//! - [`TypeInfo`] - 服务键的类型信息
//! - [`Lifetime`] - 单例或瞬时
//! - [`ResolveStrategy`] - Local / NonLocal / Any
//! - [`BuilderOptions`] - 构建器策略
//! - [`RegistrationError`] / [`ResolveError`] - 错误分类

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
