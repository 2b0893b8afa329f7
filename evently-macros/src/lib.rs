//! Evently 过程宏
//!
//! - `#[entity]`：为实体注入标识与事件缓冲区，并实现 `Entity`
//! - `#[entity_id]`：为 tuple struct 形式的 ID 生成常用 trait
//! - `#[domain_event]` / `#[integration_event]`：注入事件标识与发生时间并实现对应 trait
//! - `#[value_object]`：合并值对象的默认派生
//!
use proc_macro::TokenStream;

mod entity;
mod entity_id;
mod event;
mod utils;
mod value_object;

/// 实体宏；派生的 `Clone` 不复制待发布事件（`EventBuffer` 克隆为空）
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(event::EventKind::Domain, attr, item)
}

#[proc_macro_attribute]
pub fn integration_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(event::EventKind::Integration, attr, item)
}

#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
