use crate::utils::{AttrArgs, apply_derives, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, ItemStruct, Type, parse_macro_input};

/// 领域事件与集成事件共用的展开逻辑
#[derive(Clone, Copy)]
pub(crate) enum EventKind {
    Domain,
    Integration,
}

impl EventKind {
    fn attr_name(self) -> &'static str {
        match self {
            Self::Domain => "#[domain_event]",
            Self::Integration => "#[integration_event]",
        }
    }
}

/// #[domain_event] / #[integration_event] 宏实现
/// - 仅支持具名字段结构体
/// - 前置字段：`id: Uuid`, `occurred_on_utc: DateTime<Utc>`（若缺失）
/// - 合并派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 领域事件：生成 `new(<业务字段>)`（id 使用 UUID v7，时间取当前 UTC），实现 `DomainEvent`
/// - 集成事件：生成 `new(id, occurred_on_utc, <业务字段>)`，实现 `IntegrationEvent`
/// - 参数：`event_type = "..."`，默认使用类型名
pub(crate) fn expand(kind: EventKind, attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);

    match expand_struct(kind, args, input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_struct(
    kind: EventKind,
    args: AttrArgs,
    input: Item,
) -> syn::Result<proc_macro2::TokenStream> {
    args.allow_only(&["event_type"])?;

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return Err(syn::Error::new(
                other.span(),
                format!("{} can only be used on struct types", kind.attr_name()),
            ));
        }
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return Err(syn::Error::new(
                st.span(),
                format!("{} only supports named-field struct", kind.attr_name()),
            ));
        }
    };

    // 业务字段（构造函数参数），在注入公共字段之前记录
    let payload: Vec<(syn::Ident, Type)> = fields_named
        .named
        .iter()
        .filter_map(|f| f.ident.clone().map(|i| (i, f.ty.clone())))
        .filter(|(i, _)| i != "id" && i != "occurred_on_utc")
        .collect();

    let id_ty: Type = syn::parse_quote! { ::uuid::Uuid };
    let at_ty: Type = syn::parse_quote! { ::chrono::DateTime<::chrono::Utc> };
    let public: syn::Visibility = syn::parse_quote! { pub };
    ensure_leading_fields(
        fields_named,
        &[
            ("id", &id_ty, public.clone()),
            ("occurred_on_utc", &at_ty, public),
        ],
    );

    let required: Vec<syn::Path> = vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    apply_derives(&mut st.attrs, required);

    let out_struct = ItemStruct { ..st };
    let ident = &out_struct.ident;
    let event_type = match args.str_lit("event_type")? {
        Some(lit) => lit,
        None => syn::LitStr::new(&ident.to_string(), ident.span()),
    };
    let (impl_generics, ty_generics, where_clause) = out_struct.generics.split_for_impl();

    let params = payload.iter().map(|(i, t)| quote! { #i: #t });
    let names: Vec<_> = payload.iter().map(|(i, _)| i).collect();

    let tokens = match kind {
        EventKind::Domain => quote! {
            #out_struct

            impl #impl_generics #ident #ty_generics #where_clause {
                pub fn new(#(#params),*) -> Self {
                    Self {
                        id: ::uuid::Uuid::now_v7(),
                        occurred_on_utc: ::chrono::Utc::now(),
                        #(#names),*
                    }
                }
            }

            impl #impl_generics ::evently_domain::domain_event::DomainEvent for #ident #ty_generics #where_clause {
                fn event_id(&self) -> ::uuid::Uuid { self.id }

                fn occurred_on_utc(&self) -> ::chrono::DateTime<::chrono::Utc> {
                    self.occurred_on_utc
                }

                fn event_type(&self) -> &'static str { #event_type }

                fn as_any(&self) -> &dyn ::std::any::Any { self }
            }
        },
        EventKind::Integration => quote! {
            #out_struct

            impl #impl_generics #ident #ty_generics #where_clause {
                pub fn new(
                    id: ::uuid::Uuid,
                    occurred_on_utc: ::chrono::DateTime<::chrono::Utc>,
                    #(#params),*
                ) -> Self {
                    Self { id, occurred_on_utc, #(#names),* }
                }
            }

            impl #impl_generics ::evently_application::event_bus::IntegrationEvent for #ident #ty_generics #where_clause {
                const EVENT_TYPE: &'static str = #event_type;

                fn id(&self) -> ::uuid::Uuid { self.id }

                fn occurred_on_utc(&self) -> ::chrono::DateTime<::chrono::Utc> {
                    self.occurred_on_utc
                }
            }
        },
    };

    Ok(tokens)
}
