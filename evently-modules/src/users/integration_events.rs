//! Users 模块对外发布的集成事件
//!
//! 其他模块只允许依赖这里的类型，不得引用 Users 的领域模型。
//!
use evently_macros::integration_event;
use uuid::Uuid;

#[integration_event(event_type = "users.user_registered")]
pub struct UserRegisteredIntegrationEvent {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[integration_event(event_type = "users.user_profile_updated")]
pub struct UserProfileUpdatedIntegrationEvent {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}
