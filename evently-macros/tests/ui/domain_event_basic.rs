use evently_domain::domain_event::DomainEvent;
use evently_macros::domain_event;

#[domain_event(event_type = "orders.placed")]
struct OrderPlaced {
    pub order_id: u64,
    pub total_minor: i64,
}

#[domain_event]
struct OrderCancelled {
    pub order_id: u64,
}

fn main() {
    let placed = OrderPlaced::new(1, 2500);
    assert_eq!(placed.event_type(), "orders.placed");
    assert_eq!(placed.event_id(), placed.id);
    assert_eq!(placed.occurred_on_utc(), placed.occurred_on_utc);
    assert_eq!(placed.clone(), placed);

    let cancelled = OrderCancelled::new(1);
    assert_eq!(cancelled.event_type(), "OrderCancelled");

    let boxed: Box<dyn DomainEvent> = Box::new(placed);
    assert!(boxed.is::<OrderPlaced>());
}
