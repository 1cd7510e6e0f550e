//! 构造能力抽象
//!
//! 没有运行时反射时，可构造类型通过 [`Injectable`] 声明自己的构造函数列表，
//! 一般由 `#[derive(Injectable)]` 生成。容器只通过 [`ConstructorInspector`]
//! 读取类型擦除后的构造函数。

use crate::component::{Component, Disposal, DisposalKind};
use crate::resolver::{Dependency, DependencyResolver};
use di_common::{ResolveResult, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 构造函数体
pub type BuildFn<T> = fn(&mut dyn DependencyResolver) -> ResolveResult<T>;

/// 类型擦除的构造过程，工厂注册也使用此形式
pub type ErasedBuild =
    Arc<dyn Fn(&mut dyn DependencyResolver) -> ResolveResult<Built> + Send + Sync>;

/// 一个公开构造函数
pub struct Constructor<T> {
    /// 构造函数名称，用于日志和错误信息
    pub name: &'static str,
    /// 参数列表
    pub parameters: Vec<Dependency>,
    /// 构造函数体
    pub build: BuildFn<T>,
}

impl<T> Constructor<T> {
    /// 创建构造函数描述
    pub fn new(name: &'static str, parameters: Vec<Dependency>, build: BuildFn<T>) -> Self {
        Self {
            name,
            parameters,
            build,
        }
    }

    /// 参数数量
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// 可由容器构造的类型
pub trait Injectable: Component + Sized {
    /// 公开构造函数列表，空列表表示抽象类型（只能通过工厂注册）
    fn constructors() -> Vec<Constructor<Self>>;
}

/// 构造结果：具体对象及其释放句柄
pub struct Built {
    /// 具体对象（`Arc<I>` 的类型擦除形式）
    pub object: Arc<dyn Any + Send + Sync>,
    /// 释放句柄，组件没有释放契约时为 `None`
    pub disposal: Option<Disposal>,
}

impl Built {
    /// 包装一个组件实例
    pub fn from_component<T: Component>(component: Arc<T>) -> Self {
        let disposal = Arc::clone(&component).disposal();
        Self {
            object: component,
            disposal,
        }
    }
}

impl fmt::Debug for Built {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Built")
            .field("disposal", &self.disposal)
            .finish_non_exhaustive()
    }
}

/// 类型擦除的构造函数
#[derive(Clone)]
pub struct ErasedConstructor {
    /// 构造函数名称
    pub name: &'static str,
    /// 参数列表
    pub parameters: Vec<Dependency>,
    build: ErasedBuild,
}

impl ErasedConstructor {
    /// 擦除具体构造函数
    pub fn erase<T: Component>(constructor: Constructor<T>) -> Self {
        let build = constructor.build;
        Self {
            name: constructor.name,
            parameters: constructor.parameters,
            build: Arc::new(move |resolver: &mut dyn DependencyResolver| {
                build(resolver).map(|value| Built::from_component(Arc::new(value)))
            }),
        }
    }

    /// 参数数量
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// 执行构造
    pub fn invoke(&self, resolver: &mut dyn DependencyResolver) -> ResolveResult<Built> {
        (self.build)(resolver)
    }
}

impl fmt::Debug for ErasedConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedConstructor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 构造函数检查能力
pub trait ConstructorInspector {
    /// 可构造类型
    fn producible(&self) -> TypeInfo;

    /// 可构造类型静态声明的释放契约
    fn disposal_kind(&self) -> DisposalKind;

    /// 公开构造函数
    fn constructors(&self) -> Vec<ErasedConstructor>;

    /// 是否为抽象类型
    fn is_abstract(&self) -> bool {
        self.constructors().is_empty()
    }
}

/// 可构造类型的类型擦除描述
#[derive(Debug, Clone, Copy)]
pub struct ProducibleType {
    type_info: TypeInfo,
    disposal_kind: DisposalKind,
    constructors: fn() -> Vec<ErasedConstructor>,
}

impl ProducibleType {
    /// 描述可构造类型 `I`
    pub fn of<I: Injectable>() -> Self {
        Self {
            type_info: TypeInfo::of::<I>(),
            disposal_kind: I::disposal_kind(),
            constructors: erased_constructors::<I>,
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }
}

impl ConstructorInspector for ProducibleType {
    fn producible(&self) -> TypeInfo {
        self.type_info
    }

    fn disposal_kind(&self) -> DisposalKind {
        self.disposal_kind
    }

    fn constructors(&self) -> Vec<ErasedConstructor> {
        (self.constructors)()
    }
}

fn erased_constructors<I: Injectable>() -> Vec<ErasedConstructor> {
    I::constructors()
        .into_iter()
        .map(ErasedConstructor::erase)
        .collect()
}
