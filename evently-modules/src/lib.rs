//! Evently 业务模块（evently-modules）
//!
//! - `users`：用户注册与资料维护
//! - `events`：活动与票种
//! - `ticketing`：客户副本与购物车
//!
//! 模块之间只通过 `integration_events` 子模块中的集成事件通信，
//! 装配入口见 [`app::EventlyApp`]。
//!
pub mod app;
pub mod events;
pub mod store;
pub mod ticketing;
pub mod users;

pub use app::EventlyApp;
