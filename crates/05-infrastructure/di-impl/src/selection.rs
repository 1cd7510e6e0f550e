//! 构造函数选择
//!
//! 严格模式下可构造类型恰好有一个构造函数。启发式模式按参数数量从多到少
//! 分层，取第一个恰好有一个可满足构造函数的层；同层有多个可满足的构造函数
//! 是歧义错误。

use di_abstractions::{ConstructorInspector, Dependency, ErasedConstructor};
use di_common::{ConstructorSelection, RegistrationError, ResolveError, ResolveResult};
use std::cmp::Reverse;

pub(crate) fn select_constructor(
    inspector: &dyn ConstructorInspector,
    selection: ConstructorSelection,
    can_resolve: impl Fn(&Dependency) -> bool,
) -> ResolveResult<ErasedConstructor> {
    let type_name = inspector.producible().name.to_string();
    let mut constructors = inspector.constructors();

    if selection == ConstructorSelection::Strict {
        return match constructors.len() {
            1 => Ok(constructors.remove(0)),
            0 => Err(RegistrationError::AbstractType { type_name }.into()),
            count => Err(RegistrationError::AmbiguousConstructors { type_name, count }.into()),
        };
    }

    constructors.sort_by_key(|constructor| Reverse(constructor.arity()));
    let mut remaining = constructors.into_iter().peekable();

    while let Some(first) = remaining.next() {
        let arity = first.arity();
        let mut tier = vec![first];
        while let Some(next) = remaining.next_if(|constructor| constructor.arity() == arity) {
            tier.push(next);
        }

        let mut satisfiable: Vec<ErasedConstructor> = tier
            .into_iter()
            .filter(|constructor| constructor.parameters.iter().all(&can_resolve))
            .collect();

        match satisfiable.len() {
            0 => continue,
            1 => return Ok(satisfiable.remove(0)),
            _ => return Err(ResolveError::AmbiguousConstructor { type_name, arity }),
        }
    }

    Err(ResolveError::ServiceNotFound { type_name })
}
