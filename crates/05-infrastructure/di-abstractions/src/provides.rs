//! 接口提供关系
//!
//! `I: Provides<R>` 表示具体类型 `I` 的实例可以作为请求类型 `R` 交给调用者，
//! 相当于“可赋值”关系。每个类型都提供它自身；trait 对象视图通过
//! [`provides!`](crate::provides) 宏或 `#[component(provides(...))]` 声明。

use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的实例
///
/// 内部保存的是请求类型的视图 `Arc<R>`，因此同一个单例的多次解析
/// 得到的 `Arc<R>` 指向同一地址。
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 把类型擦除的具体对象（`Arc<I>`）转换为请求类型视图的函数
pub type Caster = fn(Arc<dyn Any + Send + Sync>) -> Option<Instance>;

/// 接口提供 trait
pub trait Provides<R: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    /// 转换为请求类型视图
    fn provide(self: Arc<Self>) -> Arc<R>;
}

impl<T: Send + Sync + 'static> Provides<T> for T {
    fn provide(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// 声明具体类型提供的 trait 对象视图
///
/// ```rust
/// use di_abstractions::provides;
///
/// pub trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// pub struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, message: &str) {
///         println!("{message}");
///     }
/// }
///
/// provides!(ConsoleLogger => dyn Logger);
/// ```
#[macro_export]
macro_rules! provides {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::Provides<$interface> for $implementation {
                fn provide(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}

/// 生成 `I -> R` 的转换函数，作为 [`Caster`] 使用
pub fn cast_to<I, R>(object: Arc<dyn Any + Send + Sync>) -> Option<Instance>
where
    I: Provides<R>,
    R: ?Sized + Send + Sync + 'static,
{
    let concrete = object.downcast::<I>().ok()?;
    let view: Arc<R> = <I as Provides<R>>::provide(concrete);
    let instance: Instance = Arc::new(view);
    Some(instance)
}

/// 从类型擦除的实例中取出请求类型视图
pub fn downcast_instance<R>(instance: &Instance) -> Option<Arc<R>>
where
    R: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<R>>().cloned()
}
