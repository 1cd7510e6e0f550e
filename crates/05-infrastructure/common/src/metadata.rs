//! 元数据定义
//!
//! 提供服务键使用的类型信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 身份由 `TypeId` 决定，类型名称只用于日志和错误信息。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: &'static str,
    /// 是否为值类型（标量与字符串），值类型只能通过预构建实例提供
    pub value_like: bool,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let id = TypeId::of::<T>();
        Self {
            id,
            name: std::any::type_name::<T>(),
            value_like: is_value_like(id),
        }
    }

    /// 获取简短的类型名称（去掉每一段路径的模块前缀）
    ///
    /// `alloc::sync::Arc<dyn app::Logger>` 会得到 `Arc<dyn Logger>`。
    pub fn short_name(&self) -> String {
        let mut short = String::with_capacity(self.name.len());
        let mut segment = String::new();

        for ch in self.name.chars() {
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                segment.push(ch);
            } else {
                short.push_str(segment.rsplit("::").next().unwrap_or(""));
                segment.clear();
                short.push(ch);
            }
        }
        short.push_str(segment.rsplit("::").next().unwrap_or(""));

        short
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn is_value_like(id: TypeId) -> bool {
    [
        TypeId::of::<()>(),
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
    ]
    .contains(&id)
}
