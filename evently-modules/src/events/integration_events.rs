//! Events 模块对外发布的集成事件
//!
use evently_macros::integration_event;
use uuid::Uuid;

/// 票价调整；价格以最小货币单位表示
#[integration_event(event_type = "events.ticket_type_price_changed")]
pub struct TicketTypePriceChangedIntegrationEvent {
    pub ticket_type_id: Uuid,
    pub price_minor: i64,
    pub currency: String,
}
