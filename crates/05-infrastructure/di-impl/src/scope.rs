//! 作用域树
//!
//! 同一棵树上的所有作用域保存在一个 arena 中，作用域只通过 [`ScopeId`]
//! 知道自己的父作用域。释放时槽位被清空并提升代数，之后可以被新作用域复用；
//! 持有旧代数的句柄总是得到 `ContainerDisposed`。

use crate::descriptor::Descriptor;
use crate::disposer::Disposer;
use dashmap::DashMap;
use di_common::{BuilderOptions, ResolveError, ResolveResult};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// 作用域标识：槽位序号加代数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    slot: usize,
    generation: u64,
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}.{}", self.slot, self.generation)
    }
}

/// 未释放作用域的状态
pub(crate) struct LiveScope {
    pub parent: Option<ScopeId>,
    pub descriptors: Vec<Arc<Descriptor>>,
    pub options: BuilderOptions,
    pub disposer: Mutex<Disposer>,
    /// 开放泛型特化缓存：(开放描述符, 闭合类型) -> 特化描述符
    pub closed: DashMap<(usize, TypeId), Arc<Descriptor>>,
}

impl LiveScope {
    pub fn new(
        parent: Option<ScopeId>,
        descriptors: Vec<Arc<Descriptor>>,
        options: BuilderOptions,
    ) -> Self {
        Self {
            parent,
            descriptors,
            options,
            disposer: Mutex::new(Disposer::new()),
            closed: DashMap::new(),
        }
    }
}

struct ScopeSlot {
    generation: u64,
    scope: Option<Arc<LiveScope>>,
}

#[derive(Default)]
struct Slots {
    entries: Vec<ScopeSlot>,
    free: Vec<usize>,
}

#[derive(Default)]
pub(crate) struct ScopeTree {
    slots: RwLock<Slots>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 放入新作用域，优先复用已释放的槽位
    pub fn insert(&self, scope: LiveScope) -> ScopeId {
        let mut slots = self.slots.write();
        let scope = Some(Arc::new(scope));

        if let Some(slot) = slots.free.pop() {
            let entry = &mut slots.entries[slot];
            entry.scope = scope;
            return ScopeId {
                slot,
                generation: entry.generation,
            };
        }

        slots.entries.push(ScopeSlot {
            generation: 0,
            scope,
        });
        ScopeId {
            slot: slots.entries.len() - 1,
            generation: 0,
        }
    }

    /// 获取未释放的作用域
    pub fn live(&self, id: ScopeId) -> ResolveResult<Arc<LiveScope>> {
        match self.slots.read().entries.get(id.slot) {
            Some(ScopeSlot {
                generation,
                scope: Some(scope),
            }) if *generation == id.generation => Ok(Arc::clone(scope)),
            _ => Err(ResolveError::ContainerDisposed),
        }
    }

    pub fn is_disposed(&self, id: ScopeId) -> bool {
        self.live(id).is_err()
    }

    /// 清空槽位并回收，返回原来的作用域；第二次调用返回 `ContainerDisposed`
    pub fn retire(&self, id: ScopeId) -> ResolveResult<Arc<LiveScope>> {
        let mut slots = self.slots.write();
        let entry = slots
            .entries
            .get_mut(id.slot)
            .filter(|entry| entry.generation == id.generation)
            .ok_or(ResolveError::ContainerDisposed)?;
        let scope = entry.scope.take().ok_or(ResolveError::ContainerDisposed)?;

        entry.generation += 1;
        slots.free.push(id.slot);
        Ok(scope)
    }

    /// arena 中的槽位数量（包括等待复用的空槽）
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.read().entries.len()
    }
}
