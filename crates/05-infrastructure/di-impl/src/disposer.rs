//! 作用域释放器
//!
//! 按记录顺序保存作用域创建的可释放实例，释放时从最后记录的开始。
//! 依赖总是先于使用它的组件构造完成并被记录，所以逆序释放保证
//! 组件先于它的依赖被释放。

use di_abstractions::{Disposal, DisposalHandle};
use std::collections::HashSet;
use tracing::{trace, warn};

#[derive(Debug, Default)]
pub(crate) struct Disposer {
    entries: Vec<Disposal>,
    seen: HashSet<usize>,
    closed: bool,
}

impl Disposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个可释放实例，同一实例只记录一次
    ///
    /// 释放器已经被取空时不再接收，实例原样返回给调用者。
    pub fn record(&mut self, disposal: Disposal) -> Result<bool, Disposal> {
        if self.closed {
            return Err(disposal);
        }
        if !self.seen.insert(disposal.identity()) {
            return Ok(false);
        }

        trace!("记录可释放实例: {}", disposal.type_name());
        self.entries.push(disposal);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 取出全部实例，按释放顺序（最后记录的在前）排列
    pub fn drain(&mut self) -> Vec<Disposal> {
        self.closed = true;
        self.seen.clear();
        let mut entries = std::mem::take(&mut self.entries);
        entries.reverse();
        entries
    }
}

/// 同步释放，异步释放契约在当前线程上阻塞执行
pub(crate) fn dispose_blocking(disposals: Vec<Disposal>) {
    for disposal in disposals {
        match disposal.handle() {
            DisposalHandle::Sync(handle) => handle.dispose(),
            DisposalHandle::Async(handle) => {
                warn!(
                    "同步释放作用域时阻塞等待异步释放: {}，建议使用 dispose_async",
                    disposal.type_name()
                );
                futures::executor::block_on(handle.dispose_async());
            }
        }
    }
}

/// 异步释放
pub(crate) async fn dispose_all(disposals: Vec<Disposal>) {
    for disposal in disposals {
        match disposal.handle() {
            DisposalHandle::Sync(handle) => handle.dispose(),
            DisposalHandle::Async(handle) => handle.dispose_async().await,
        }
    }
}
