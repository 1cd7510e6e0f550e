//! 组件与释放契约
//!
//! 由容器构造的具体类型都实现 [`Component`]，通过它向容器报告自己的释放契约。

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// 同步释放契约
///
/// 实例以共享方式持有，实现者需要自行用内部可变性记录释放状态。
pub trait Dispose: Send + Sync {
    /// 释放实例持有的资源
    fn dispose(&self);
}

/// 异步释放契约
#[async_trait]
pub trait AsyncDispose: Send + Sync {
    /// 异步释放实例持有的资源
    async fn dispose_async(&self);
}

/// 释放契约类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisposalKind {
    /// 不需要释放
    #[default]
    None,
    /// 同步释放
    Sync,
    /// 异步释放
    Async,
}

impl DisposalKind {
    /// 是否实现了任意一种释放契约
    pub fn is_disposable(self) -> bool {
        self != Self::None
    }
}

/// 组件基础 trait
///
/// 容器构造、缓存和释放的具体类型都必须实现此 trait。默认实现表示
/// 组件没有释放契约；`#[derive(Component)]` 会根据 `dispose` / `dispose_async`
/// 属性生成对应实现。
pub trait Component: Send + Sync + 'static {
    /// 静态声明的释放契约，注册阶段据此校验
    fn disposal_kind() -> DisposalKind
    where
        Self: Sized,
    {
        DisposalKind::None
    }

    /// 获取实例的释放句柄
    fn disposal(self: Arc<Self>) -> Option<Disposal> {
        None
    }
}

/// 释放句柄
#[derive(Clone)]
pub enum DisposalHandle {
    /// 同步释放
    Sync(Arc<dyn Dispose>),
    /// 异步释放
    Async(Arc<dyn AsyncDispose>),
}

/// 一个待释放的实例
///
/// 以实例地址作为身份，同一实例在释放器中只记录一次。
#[derive(Clone)]
pub struct Disposal {
    identity: usize,
    type_name: &'static str,
    handle: DisposalHandle,
}

impl Disposal {
    /// 包装同步释放的实例
    pub fn sync<T: Dispose + 'static>(instance: Arc<T>) -> Self {
        Self {
            identity: Arc::as_ptr(&instance).cast::<()>() as usize,
            type_name: std::any::type_name::<T>(),
            handle: DisposalHandle::Sync(instance),
        }
    }

    /// 包装异步释放的实例
    pub fn asynchronous<T: AsyncDispose + 'static>(instance: Arc<T>) -> Self {
        Self {
            identity: Arc::as_ptr(&instance).cast::<()>() as usize,
            type_name: std::any::type_name::<T>(),
            handle: DisposalHandle::Async(instance),
        }
    }

    /// 实例身份
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// 实例的具体类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 释放契约类型
    pub fn kind(&self) -> DisposalKind {
        match self.handle {
            DisposalHandle::Sync(_) => DisposalKind::Sync,
            DisposalHandle::Async(_) => DisposalKind::Async,
        }
    }

    /// 释放句柄
    pub fn handle(&self) -> &DisposalHandle {
        &self.handle
    }
}

impl fmt::Debug for Disposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposal")
            .field("identity", &format_args!("{:#x}", self.identity))
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}
