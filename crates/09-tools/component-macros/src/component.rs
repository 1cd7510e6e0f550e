//! 组件宏实现

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    meta::ParseNestedMeta, parenthesized, parse::Parse, parse_macro_input,
    punctuated::Punctuated, DeriveInput, Generics, Ident, ItemStruct, Result, Token, Type,
};

/// 组件配置参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 声明式注册的生命周期，`None` 表示不生成注册元数据
    pub lifetime: Option<ComponentLifetime>,
    /// 释放契约
    pub disposal: ComponentDisposal,
    /// 提供的接口视图
    pub provides: Vec<Type>,
    /// 声明式注册的请求类型
    pub requested: Option<Type>,
}

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentLifetime {
    Singleton,
    Transient,
}

/// 组件释放契约
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ComponentDisposal {
    #[default]
    None,
    Sync,
    Async,
}

impl ComponentArgs {
    /// 解析一个参数项
    fn parse_item(&mut self, meta: ParseNestedMeta<'_>) -> Result<()> {
        if meta.path.is_ident("singleton") {
            self.lifetime = Some(ComponentLifetime::Singleton);
        } else if meta.path.is_ident("transient") {
            self.lifetime = Some(ComponentLifetime::Transient);
        } else if meta.path.is_ident("dispose") {
            self.disposal = ComponentDisposal::Sync;
        } else if meta.path.is_ident("dispose_async") {
            self.disposal = ComponentDisposal::Async;
        } else if meta.path.is_ident("provides") {
            let content;
            parenthesized!(content in meta.input);
            let types: Punctuated<Type, Token![,]> =
                content.parse_terminated(Type::parse, Token![,])?;
            self.provides.extend(types);
        } else if meta.path.is_ident("requested") {
            self.requested = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error(
                "未知的组件参数，支持: singleton, transient, dispose, dispose_async, provides(..), requested = ..",
            ));
        }
        Ok(())
    }

    fn validate(&self, span: proc_macro2::Span) -> Result<()> {
        if self.requested.is_some() && self.lifetime.is_none() {
            return Err(syn::Error::new(
                span,
                "requested 需要同时声明生命周期 (singleton 或 transient)",
            ));
        }
        Ok(())
    }
}

/// 实现 #[component] 宏
pub fn component_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut component_args = ComponentArgs::default();
    let parser = syn::meta::parser(|meta| component_args.parse_item(meta));
    parse_macro_input!(args with parser);

    let input_struct = parse_macro_input!(input as ItemStruct);
    if let Err(e) = component_args.validate(input_struct.ident.span()) {
        return e.to_compile_error().into();
    }

    let generated = generate_impls(&input_struct.ident, &input_struct.generics, &component_args);

    let expanded = quote! {
        #input_struct

        #generated
    };

    TokenStream::from(expanded)
}

/// 实现 #[derive(Component)] 宏
pub fn derive_component_impl(input: DeriveInput) -> TokenStream {
    let mut component_args = ComponentArgs::default();

    for attr in &input.attrs {
        if attr.path().is_ident("component") {
            if let Err(e) = attr.parse_nested_meta(|meta| component_args.parse_item(meta)) {
                return e.to_compile_error().into();
            }
        }
    }

    if let Err(e) = component_args.validate(input.ident.span()) {
        return e.to_compile_error().into();
    }

    TokenStream::from(generate_impls(&input.ident, &input.generics, &component_args))
}

/// 生成 Component / Provides / Registrable 实现
fn generate_impls(name: &Ident, generics: &Generics, args: &ComponentArgs) -> TokenStream2 {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let disposal_methods = match args.disposal {
        ComponentDisposal::None => quote! {},
        ComponentDisposal::Sync => quote! {
            fn disposal_kind() -> ::di_abstractions::DisposalKind {
                ::di_abstractions::DisposalKind::Sync
            }

            fn disposal(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::option::Option<::di_abstractions::Disposal> {
                ::std::option::Option::Some(::di_abstractions::Disposal::sync(self))
            }
        },
        ComponentDisposal::Async => quote! {
            fn disposal_kind() -> ::di_abstractions::DisposalKind {
                ::di_abstractions::DisposalKind::Async
            }

            fn disposal(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::option::Option<::di_abstractions::Disposal> {
                ::std::option::Option::Some(::di_abstractions::Disposal::asynchronous(self))
            }
        },
    };

    // requested 类型如果没有出现在 provides 中，同样需要视图
    let mut views: Vec<&Type> = args.provides.iter().collect();
    if let Some(requested) = &args.requested {
        if !views.iter().any(|view| same_type(view, requested)) {
            views.push(requested);
        }
    }

    let provides_impls = views.iter().map(|view| {
        quote! {
            impl #impl_generics ::di_abstractions::Provides<#view> for #name #ty_generics #where_clause {
                fn provide(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#view> {
                    self
                }
            }
        }
    });

    let registrable_impl = args.lifetime.map(|lifetime| {
        let lifetime = match lifetime {
            ComponentLifetime::Singleton => quote! { ::di_abstractions::Lifetime::Singleton },
            ComponentLifetime::Transient => quote! { ::di_abstractions::Lifetime::Transient },
        };
        let interfaces = args.provides.iter();
        let requested = args
            .requested
            .as_ref()
            .map(|requested| quote! { .requested::<#requested>() });

        quote! {
            impl #impl_generics ::di_abstractions::Registrable for #name #ty_generics #where_clause {
                fn component_metadata() -> ::di_abstractions::ComponentMetadata {
                    ::di_abstractions::ComponentMetadata::builder::<Self>(#lifetime)
                        #( .interface::<#interfaces>() )*
                        #requested
                        .build()
                }
            }
        }
    });

    quote! {
        impl #impl_generics ::di_abstractions::Component for #name #ty_generics #where_clause {
            #disposal_methods
        }

        #( #provides_impls )*

        #registrable_impl
    }
}

fn same_type(left: &Type, right: &Type) -> bool {
    quote!(#left).to_string() == quote!(#right).to_string()
}
