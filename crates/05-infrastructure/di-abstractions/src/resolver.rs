//! 依赖解析抽象接口
//!
//! 构造函数和工厂通过 [`DependencyResolver`] 解析自己的依赖，
//! 解析在同一个解析上下文中进行（相同策略、相同的循环依赖检测链）。

use crate::generic::{ClosedGeneric, GenericClosing};
use crate::provides::{downcast_instance, Instance};
use di_common::{ResolveError, ResolveResult, TypeInfo};
use std::sync::Arc;

/// 依赖形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// 单个实例
    Single,
    /// 实例序列，总是可满足（空序列也是合法结果）
    Sequence,
}

/// 构造函数参数描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// 依赖的请求类型
    pub type_info: TypeInfo,
    /// 依赖形态
    pub kind: DependencyKind,
}

impl Dependency {
    /// 单实例依赖
    pub fn of<R: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<R>(),
            kind: DependencyKind::Single,
        }
    }

    /// 序列依赖，由多实例解析满足
    pub fn many<R: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<R>(),
            kind: DependencyKind::Sequence,
        }
    }

    /// 是否为序列依赖
    pub fn is_sequence(&self) -> bool {
        self.kind == DependencyKind::Sequence
    }
}

/// 单实例解析请求
#[derive(Debug, Clone, Copy)]
pub struct ServiceRequest {
    /// 请求类型
    pub type_info: TypeInfo,
    /// 请求闭合泛型时，描述如何从开放定义特化
    pub closing: Option<GenericClosing>,
}

impl ServiceRequest {
    /// 按类型信息创建请求
    pub fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            closing: None,
        }
    }

    /// 按类型创建请求
    pub fn of<R: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<R>())
    }

    /// 创建闭合泛型请求
    pub fn generic<G: ClosedGeneric>() -> Self {
        let closing = GenericClosing::of::<G>();
        Self {
            type_info: closing.closed,
            closing: Some(closing),
        }
    }
}

/// 依赖解析器 trait
///
/// 容器在构造组件时把当前解析上下文以 `&mut dyn DependencyResolver`
/// 的形式交给构造函数或工厂。
pub trait DependencyResolver {
    /// 解析单个实例
    fn resolve_request(&mut self, request: &ServiceRequest) -> ResolveResult<Instance>;

    /// 解析所有匹配的实例
    fn resolve_all_instances(&mut self, type_info: &TypeInfo) -> ResolveResult<Vec<Instance>>;

    /// 检查依赖是否可满足
    fn can_resolve(&self, dependency: &Dependency) -> bool;

    /// 按类型信息解析单个实例
    fn resolve_instance(&mut self, type_info: &TypeInfo) -> ResolveResult<Instance> {
        self.resolve_request(&ServiceRequest::new(*type_info))
    }
}

impl<'a> dyn DependencyResolver + 'a {
    /// 解析指定类型的服务
    pub fn resolve<R>(&mut self) -> ResolveResult<Arc<R>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<R>();
        let instance = self.resolve_instance(&type_info)?;
        typed::<R>(&instance, &type_info)
    }

    /// 解析指定类型的所有服务
    pub fn resolve_many<R>(&mut self) -> ResolveResult<Vec<Arc<R>>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<R>();
        self.resolve_all_instances(&type_info)?
            .iter()
            .map(|instance| typed::<R>(instance, &type_info))
            .collect()
    }

    /// 解析闭合泛型服务
    pub fn resolve_generic<G: ClosedGeneric>(&mut self) -> ResolveResult<Arc<G>> {
        let request = ServiceRequest::generic::<G>();
        let instance = self.resolve_request(&request)?;
        typed::<G>(&instance, &request.type_info)
    }
}

/// 把类型擦除的实例还原为请求类型
pub fn typed<R>(instance: &Instance, type_info: &TypeInfo) -> ResolveResult<Arc<R>>
where
    R: ?Sized + Send + Sync + 'static,
{
    downcast_instance::<R>(instance).ok_or_else(|| ResolveError::TypeMismatch {
        type_name: type_info.name.to_string(),
    })
}
