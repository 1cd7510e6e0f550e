//! 开放泛型
//!
//! Rust 没有运行时泛型定义，开放定义用一个标记类型表示：
//! `register_open_generic::<D>()` 注册定义，闭合类型 `G` 通过
//! `ClosedGeneric<Definition = D>` 声明自己属于该定义。解析 `G` 时，
//! 如果命中的作用域只有开放定义，容器用 [`GenericClosing`] 把定义特化为 `G`。

use crate::factory::{Injectable, ProducibleType};
use crate::provides::{cast_to, Caster};
use di_common::TypeInfo;

/// 开放泛型定义的闭合类型
///
/// ```rust
/// use di_abstractions::{ClosedGeneric, Component, Constructor, Injectable};
/// use std::marker::PhantomData;
///
/// pub struct Repository<T>(PhantomData<fn() -> T>);
///
/// /// `Repository<_>` 的开放定义标记
/// pub struct RepositoryDefinition;
///
/// impl<T: 'static> Component for Repository<T> {}
///
/// impl<T: 'static> Injectable for Repository<T> {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new("new", Vec::new(), |_| Ok(Repository(PhantomData)))]
///     }
/// }
///
/// impl<T: 'static> ClosedGeneric for Repository<T> {
///     type Definition = RepositoryDefinition;
/// }
/// ```
pub trait ClosedGeneric: Injectable {
    /// 开放定义标记类型
    type Definition: ?Sized + 'static;
}

/// 从开放定义特化到闭合类型所需的信息
#[derive(Debug, Clone, Copy)]
pub struct GenericClosing {
    /// 开放定义标记
    pub definition: TypeInfo,
    /// 闭合类型
    pub closed: TypeInfo,
    /// 闭合类型的构造信息
    pub producible: ProducibleType,
    /// 闭合类型到自身视图的转换
    pub cast: Caster,
}

impl GenericClosing {
    /// 为闭合类型创建特化信息
    pub fn of<G: ClosedGeneric>() -> Self {
        Self {
            definition: TypeInfo::of::<G::Definition>(),
            closed: TypeInfo::of::<G>(),
            producible: ProducibleType::of::<G>(),
            cast: cast_to::<G, G>,
        }
    }
}
