//! 解析策略分发
//!
//! 在作用域链上按 Local / NonLocal / Any 查找描述符。查找结果是
//! [`Lookup`] 标签值，由调用边界转换为具体错误。

use crate::builder::validate_producible;
use crate::descriptor::{Descriptor, Source};
use crate::scope::{LiveScope, ScopeId, ScopeTree};
use di_abstractions::{GenericClosing, ServiceRequest};
use di_common::{ResolveError, ResolveResult, ResolveStrategy, TypeInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 单个作用域内的查找结果
#[derive(Debug)]
pub(crate) enum Lookup {
    NotFound,
    Unique {
        descriptor: Arc<Descriptor>,
        owner: ScopeId,
    },
    Ambiguous {
        count: usize,
    },
}

/// NonLocal 委托给父作用域并以 Any 继续，其余策略保持不变
pub(crate) fn delegate(
    tree: &ScopeTree,
    scope: ScopeId,
    strategy: ResolveStrategy,
) -> ResolveResult<(ScopeId, ResolveStrategy)> {
    let live = tree.live(scope)?;
    match strategy {
        ResolveStrategy::NonLocal => {
            let parent = live.parent.ok_or(ResolveError::NoParentScope)?;
            Ok((parent, ResolveStrategy::Any))
        }
        other => Ok((scope, other)),
    }
}

/// 查找单实例解析的描述符
///
/// Any 从当前作用域开始向上，第一个有匹配的作用域决定结果，不同作用域的匹配不合并。
pub(crate) fn find(
    tree: &ScopeTree,
    scope: ScopeId,
    request: &ServiceRequest,
    strategy: ResolveStrategy,
) -> ResolveResult<Lookup> {
    let (mut current, strategy) = delegate(tree, scope, strategy)?;

    loop {
        let live = tree.live(current)?;
        let mut matches = local_matches(&live, request)?;

        match matches.len() {
            0 => match live.parent {
                Some(parent) if strategy == ResolveStrategy::Any => current = parent,
                _ => return Ok(Lookup::NotFound),
            },
            1 => {
                return Ok(Lookup::Unique {
                    descriptor: matches.remove(0),
                    owner: current,
                })
            }
            count => return Ok(Lookup::Ambiguous { count }),
        }
    }
}

/// 查找多实例解析的描述符
///
/// Any 合并当前作用域与祖先作用域的结果，祖先中与本地可构造类型相同的条目被遮蔽。
pub(crate) fn find_all(
    tree: &ScopeTree,
    scope: ScopeId,
    type_info: &TypeInfo,
    strategy: ResolveStrategy,
) -> ResolveResult<Vec<(Arc<Descriptor>, ScopeId)>> {
    let (scope, strategy) = delegate(tree, scope, strategy)?;
    let live = tree.live(scope)?;

    let mut found: Vec<(Arc<Descriptor>, ScopeId)> = live
        .descriptors
        .iter()
        .filter(|descriptor| exact_match(descriptor, type_info))
        .map(|descriptor| (Arc::clone(descriptor), scope))
        .collect();

    if strategy == ResolveStrategy::Local {
        return Ok(found);
    }

    if let Some(parent) = live.parent {
        let local_types: HashSet<TypeInfo> = found
            .iter()
            .map(|(descriptor, _)| descriptor.producible)
            .collect();
        let inherited = find_all(tree, parent, type_info, ResolveStrategy::Any)?;
        found.extend(
            inherited
                .into_iter()
                .filter(|(descriptor, _)| !local_types.contains(&descriptor.producible)),
        );
    }

    Ok(found)
}

fn exact_match(descriptor: &Descriptor, type_info: &TypeInfo) -> bool {
    descriptor.requested == *type_info && !matches!(descriptor.source, Source::OpenGeneric { .. })
}

/// 当前作用域内的匹配；请求闭合泛型且没有精确注册时，特化开放定义
fn local_matches(
    scope: &LiveScope,
    request: &ServiceRequest,
) -> ResolveResult<Vec<Arc<Descriptor>>> {
    let exact: Vec<Arc<Descriptor>> = scope
        .descriptors
        .iter()
        .filter(|descriptor| exact_match(descriptor, &request.type_info))
        .cloned()
        .collect();

    let Some(closing) = &request.closing else {
        return Ok(exact);
    };
    if !exact.is_empty() {
        return Ok(exact);
    }

    scope
        .descriptors
        .iter()
        .filter(|descriptor| {
            matches!(&descriptor.source, Source::OpenGeneric { definition } if *definition == closing.definition)
        })
        .map(|open| specialize(scope, open, closing))
        .collect()
}

fn specialize(
    scope: &LiveScope,
    open: &Arc<Descriptor>,
    closing: &GenericClosing,
) -> ResolveResult<Arc<Descriptor>> {
    let key = (open.identity(), closing.closed.id);
    if let Some(closed) = scope.closed.get(&key) {
        return Ok(Arc::clone(closed.value()));
    }

    validate_producible(&closing.producible, open.lifetime, &scope.options)?;

    let entry = scope.closed.entry(key).or_insert_with(|| {
        debug!(
            "特化开放泛型: {} -> {}",
            closing.definition.short_name(),
            closing.closed.short_name()
        );
        Arc::new(Descriptor::of_type(
            closing.closed,
            closing.producible,
            closing.cast,
            open.lifetime,
            open.selection,
        ))
    });
    Ok(Arc::clone(entry.value()))
}
