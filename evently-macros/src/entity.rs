use crate::utils::{AttrArgs, apply_derives, ensure_leading_fields, ensure_trailing_field, to_snake_case};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, ItemStruct, Type, parse_macro_input};

/// #[entity] 宏实现
/// - 若缺失则追加字段：`id: IdType`（置于最前）与 `domain_events: EventBuffer`（置于末尾，私有）
/// - 自动实现 `::evently_domain::entity::Entity`
/// - 生成模块私有的 `raise` 方法：只有实体自身的业务方法能够产生事件
/// - 支持参数：`#[entity(id = IdType, name = "...", debug = true|false)]`；
///   - `id` 默认 `String`
///   - `name` 默认类型名的 snake_case，用于日志
///   - `debug` 默认 `true`（派生 Debug）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);

    match expand_struct(args, input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_struct(args: AttrArgs, input: Item) -> syn::Result<proc_macro2::TokenStream> {
    args.allow_only(&["id", "name", "debug"])?;

    let mut st = match input {
        Item::Struct(s) => s,
        other => return Err(syn::Error::new(other.span(), "#[entity] only on struct")),
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return Err(syn::Error::new(
                st.span(),
                "#[entity] only supports named-field struct",
            ));
        }
    };

    let id_type: Type = args.ty("id")?.unwrap_or_else(|| syn::parse_quote! { String });
    let buffer_ty: Type = syn::parse_quote! { ::evently_domain::entity::EventBuffer };

    ensure_leading_fields(fields_named, &[("id", &id_type, syn::Visibility::Inherited)]);
    ensure_trailing_field(
        fields_named,
        "domain_events",
        &buffer_ty,
        syn::Visibility::Inherited,
    );

    let mut required: Vec<syn::Path> = vec![syn::parse_quote!(Clone)];
    if args.bool_lit("debug")?.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required);

    let out_struct = ItemStruct { ..st };
    let ident = &out_struct.ident;
    let type_name = match args.str_lit("name")? {
        Some(lit) => lit,
        None => syn::LitStr::new(&to_snake_case(&ident.to_string()), ident.span()),
    };
    let (impl_generics, ty_generics, where_clause) = out_struct.generics.split_for_impl();

    Ok(quote! {
        #out_struct

        impl #impl_generics ::evently_domain::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_type;

            const TYPE: &'static str = #type_name;

            fn id(&self) -> &Self::Id { &self.id }

            fn domain_events(&self) -> &::evently_domain::entity::EventBuffer {
                &self.domain_events
            }

            fn clear_domain_events(&mut self) {
                self.domain_events.clear();
            }
        }

        impl #impl_generics #ident #ty_generics #where_clause {
            #[allow(dead_code)]
            fn raise<E>(&mut self, event: E)
            where
                E: ::evently_domain::domain_event::DomainEvent,
            {
                self.domain_events.raise(event);
            }
        }
    })
}
