//! 宏工具函数

use syn::{Field, GenericArgument, PathArguments, Result, Type};

/// 如果类型的最后一段路径名为 `wrapper`，提取它的第一个泛型参数
pub fn extract_generic_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// `Arc<T>` 中的 `T`
pub fn arc_inner_type(ty: &Type) -> Option<&Type> {
    extract_generic_type(ty, "Arc")
}

/// `Vec<Arc<T>>` 中的 `T`
pub fn vec_arc_inner_type(ty: &Type) -> Option<&Type> {
    extract_generic_type(ty, "Vec").and_then(arc_inner_type)
}

/// 检查字段是否带有 `#[attr_name(flag)]`
pub fn field_has_flag(field: &Field, attr_name: &str, flag: &str) -> Result<bool> {
    let mut found = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(attr_name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(flag) {
                found = true;
                Ok(())
            } else {
                Err(meta.error(format!("未知的 {attr_name} 参数")))
            }
        })?;
    }

    Ok(found)
}
