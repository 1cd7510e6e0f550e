//! 构造函数生成宏实现
//!
//! 按字段生成唯一的构造函数：`Arc<T>` 字段解析单个服务，`Vec<Arc<T>>`
//! 字段解析全部服务，`#[inject(default)]` 字段使用 `Default`。

use crate::utils::{arc_inner_type, field_has_flag, vec_arc_inner_type};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{Data, DeriveInput, Field, Fields, Result};

/// 实现 #[derive(Injectable)] 宏
pub fn derive_injectable_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Injectable 只能用于结构体",
            ))
        }
    };

    let injections = fields
        .iter()
        .map(injection_for)
        .collect::<Result<Vec<_>>>()?;
    let dependencies = injections.iter().filter_map(|(dependency, _)| dependency.as_ref());
    let values = injections.iter().map(|(_, value)| value);

    let construct = match fields {
        Fields::Named(named) => {
            let idents = named.named.iter().map(|field| &field.ident);
            quote! { Self { #( #idents: #values, )* } }
        }
        Fields::Unnamed(_) => quote! { Self( #( #values, )* ) },
        Fields::Unit => quote! { Self },
    };

    let resolver = if fields.is_empty() {
        quote! { _resolver }
    } else {
        quote! { resolver }
    };

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #name #ty_generics #where_clause {
            fn constructors() -> ::std::vec::Vec<::di_abstractions::Constructor<Self>> {
                ::std::vec![::di_abstractions::Constructor::new(
                    "new",
                    ::std::vec![ #( #dependencies ),* ],
                    |#resolver| ::std::result::Result::Ok(#construct),
                )]
            }
        }
    })
}

/// 单个字段的依赖描述和取值表达式
fn injection_for(field: &Field) -> Result<(Option<TokenStream2>, TokenStream2)> {
    if field_has_flag(field, "inject", "default")? {
        return Ok((None, quote! { ::std::default::Default::default() }));
    }

    if let Some(inner) = vec_arc_inner_type(&field.ty) {
        return Ok((
            Some(quote! { ::di_abstractions::Dependency::many::<#inner>() }),
            quote! { resolver.resolve_many::<#inner>()? },
        ));
    }

    if let Some(inner) = arc_inner_type(&field.ty) {
        return Ok((
            Some(quote! { ::di_abstractions::Dependency::of::<#inner>() }),
            quote! { resolver.resolve::<#inner>()? },
        ));
    }

    Err(syn::Error::new_spanned(
        field.ty.to_token_stream(),
        "字段类型必须是 Arc<T> 或 Vec<Arc<T>>，其他字段请标注 #[inject(default)]",
    ))
}
