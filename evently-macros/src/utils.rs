use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Field, FieldsNamed, Ident, Result, Token, Type};

// 提取非 derive 属性与已有 derive 列表
pub(crate) fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.iter() {
        if attr.path().is_ident("derive") {
            if let Ok(list) =
                attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 合并默认与已有 derive（去重，优先保留 required）
pub(crate) fn merge_derives(existing: Vec<syn::Path>, required: Vec<syn::Path>) -> Attribute {
    let mut seen = std::collections::HashSet::<String>::new();
    let mut final_list: Vec<syn::Path> = Vec::new();
    for p in required.into_iter().chain(existing) {
        if seen.insert(derive_key(&p)) {
            final_list.push(p);
        }
    }
    syn::parse_quote!(#[derive(#(#final_list),*)])
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let ident = last.ident.to_string();
            match ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{ident}"),
                _ => ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

// 直接在 attrs 上应用默认派生合并
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);
    let merged = merge_derives(existing, required);
    *attrs = std::iter::once(merged).chain(retained).collect();
}

pub(crate) fn has_field_named(fields: &FieldsNamed, name: &str) -> bool {
    fields
        .named
        .iter()
        .any(|f| f.ident.as_ref().is_some_and(|i| i == name))
}

/// 确保具名字段结构体包含所需字段
/// - required: (字段名, 字段类型, 可见性) 列表，按给定顺序放在最前
/// - 已存在的同名字段会被复用并移动到最前；其余字段保持原始相对顺序
pub(crate) fn ensure_leading_fields(
    fields_named: &mut FieldsNamed,
    required: &[(&str, &Type, syn::Visibility)],
) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    for (name, ty, vis) in required.iter() {
        let existing = old_named
            .iter()
            .find(|f| f.ident.as_ref().is_some_and(|i| i == *name));
        match existing {
            Some(f) => new_named.push(f.clone()),
            None => {
                let ident = Ident::new(name, proc_macro2::Span::call_site());
                new_named.push(syn::parse_quote! { #vis #ident: #ty });
            }
        }
    }

    for f in old_named.into_iter() {
        let is_required = f
            .ident
            .as_ref()
            .is_some_and(|i| required.iter().any(|(n, _, _)| i == n));
        if !is_required {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}

/// 仅在缺失时于末尾追加字段
pub(crate) fn ensure_trailing_field(
    fields_named: &mut FieldsNamed,
    name: &str,
    ty: &Type,
    vis: syn::Visibility,
) {
    if has_field_named(fields_named, name) {
        return;
    }
    let ident = Ident::new(name, proc_macro2::Span::call_site());
    fields_named.named.push(syn::parse_quote! { #vis #ident: #ty });
}

/// 通用属性参数：`key = value, ...`
pub(crate) struct AttrArgs {
    pairs: Vec<(Ident, Expr)>,
}

impl Parse for AttrArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut pairs = Vec::new();
        if input.is_empty() {
            return Ok(Self { pairs });
        }

        let assigns: Punctuated<syn::ExprAssign, Token![,]> =
            Punctuated::parse_terminated(input)?;

        for assign in assigns {
            let key = match *assign.left {
                Expr::Path(p) if p.path.segments.len() == 1 => p.path.segments[0].ident.clone(),
                // `type` 是关键字，不能作为 Path 解析，这里不支持
                other => return Err(syn::Error::new(other.span(), "invalid attribute key")),
            };
            if pairs.iter().any(|(k, _): &(Ident, Expr)| *k == key) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("duplicate key '{key}' in attribute"),
                ));
            }
            pairs.push((key, *assign.right));
        }

        Ok(Self { pairs })
    }
}

impl AttrArgs {
    /// 校验仅包含允许的 key
    pub(crate) fn allow_only(&self, allowed: &[&str]) -> Result<()> {
        for (key, _) in &self.pairs {
            if !allowed.iter().any(|a| key == a) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown key '{key}'; expected one of: {}", allowed.join(", ")),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn ty(&self, key: &str) -> Result<Option<Type>> {
        match self.get(key) {
            Some(expr) => Ok(Some(syn::parse2(expr.to_token_stream())?)),
            None => Ok(None),
        }
    }

    pub(crate) fn str_lit(&self, key: &str) -> Result<Option<syn::LitStr>> {
        match self.get(key) {
            Some(Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            })) => Ok(Some(lit.clone())),
            Some(other) => Err(syn::Error::new(
                other.span(),
                format!("expected string literal for '{key}'"),
            )),
            None => Ok(None),
        }
    }

    pub(crate) fn bool_lit(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            Some(Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Bool(b),
                ..
            })) => Ok(Some(b.value())),
            Some(other) => Err(syn::Error::new(
                other.span(),
                format!("expected boolean literal for '{key}'"),
            )),
            None => Ok(None),
        }
    }

    fn get(&self, key: &str) -> Option<&Expr> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// 将 `UpperCamelCase` 转为 `snake_case`，用于默认的类型名
pub(crate) fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
