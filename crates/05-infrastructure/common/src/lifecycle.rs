//! 服务生命周期与解析策略

use serde::{Deserialize, Serialize};
use std::fmt;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// 单例模式 - 在拥有该注册的作用域内只创建一个实例
    Singleton,
    /// 瞬时模式 - 每次请求都创建新实例
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Transient => f.write_str("transient"),
        }
    }
}

/// 解析策略
///
/// 决定一次解析可以查询作用域链的哪一部分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStrategy {
    /// 只查询当前作用域
    Local,
    /// 只查询祖先作用域（委托给父作用域，并以 `Any` 继续）
    NonLocal,
    /// 先查询当前作用域，再沿父链向上查找第一个有匹配的作用域
    #[default]
    Any,
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::NonLocal => f.write_str("non_local"),
            Self::Any => f.write_str("any"),
        }
    }
}
