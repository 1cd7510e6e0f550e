//! 错误类型定义
//!
//! 所有错误都是编程或配置错误，同步返回给调用者，不做重试。

use crate::metadata::TypeInfo;
use thiserror::Error;

/// 注册错误类型
///
/// 在注册阶段立即返回，不会推迟到解析阶段。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("容器已经构建，不能再注册或重复构建")]
    AlreadyBuilt,

    #[error("重复注册: {requested} -> {producible}")]
    Duplicate {
        requested: String,
        producible: String,
    },

    #[error("类型 {type_name} 没有可用的实现（抽象类型必须提供工厂）")]
    AbstractType { type_name: String },

    #[error("类型 {producible} 不能赋值给 {requested}")]
    NotAssignable {
        producible: String,
        requested: String,
    },

    #[error("类型 {type_name} 有 {count} 个构造函数，严格模式下只允许一个")]
    AmbiguousConstructors { type_name: String, count: usize },

    #[error("禁止注册瞬时可释放服务: {type_name}")]
    TransientDisposable { type_name: String },

    #[error("父作用域已经释放")]
    ParentScopeDisposed,

    #[error("组件扫描失败: {scanner}, 原因: {message}")]
    ScanFailed { scanner: String, message: String },
}

/// 解析错误类型
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("服务未找到: {type_name}")]
    ServiceNotFound { type_name: String },

    #[error("服务 {type_name} 在同一作用域内有 {count} 个注册，请使用 resolve_many")]
    AmbiguousRegistration { type_name: String, count: usize },

    #[error("类型 {type_name} 有多个参数数量为 {arity} 的可满足构造函数")]
    AmbiguousConstructor { type_name: String, arity: usize },

    #[error("当前作用域没有父作用域")]
    NoParentScope,

    #[error("容器已经释放")]
    ContainerDisposed,

    #[error("值类型 {type_name} 只能通过预构建实例注册来提供")]
    InvalidResolutionTarget { type_name: String },

    #[error("检测到循环依赖: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ConstructionFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("实例类型不匹配: {type_name}")]
    TypeMismatch { type_name: String },

    #[error("注册无效: {0}")]
    Registration(#[from] RegistrationError),
}

impl ResolveError {
    /// 创建服务未找到错误
    pub fn not_found(type_info: &TypeInfo) -> Self {
        Self::ServiceNotFound {
            type_name: type_info.name.to_string(),
        }
    }

    /// 创建组件创建失败错误
    pub fn construction_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置解析失败 ({format}): {message}")]
    ParseError {
        format: &'static str,
        message: String,
    },
}

/// 结果类型别名
pub type RegistrationResult<T> = Result<T, RegistrationError>;
pub type ResolveResult<T> = Result<T, ResolveError>;
