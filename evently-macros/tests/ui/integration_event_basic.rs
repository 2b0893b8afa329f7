use chrono::Utc;
use evently_application::event_bus::{IntegrationEvent, Message};
use evently_macros::integration_event;
use uuid::Uuid;

#[integration_event(event_type = "orders.order_placed")]
struct OrderPlacedIntegrationEvent {
    pub order_id: Uuid,
    pub total_minor: i64,
}

fn main() {
    let id = Uuid::now_v7();
    let at = Utc::now();
    let event = OrderPlacedIntegrationEvent::new(id, at, Uuid::now_v7(), 2500);

    assert_eq!(OrderPlacedIntegrationEvent::EVENT_TYPE, "orders.order_placed");
    assert_eq!(event.id(), id);
    assert_eq!(IntegrationEvent::occurred_on_utc(&event), at);

    let message = Message::encode(&event).unwrap();
    assert_eq!(message.message_id, id);
    let decoded: OrderPlacedIntegrationEvent = message.decode().unwrap();
    assert_eq!(decoded, event);
}
