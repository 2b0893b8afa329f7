use evently_macros::entity_id;
use std::collections::HashSet;
use uuid::Uuid;

#[entity_id]
struct OrderId(Uuid);

fn main() {
    let raw = Uuid::now_v7();
    let id = OrderId::from(raw);
    let copy = id;
    assert_eq!(id, copy);
    assert_eq!(Uuid::from(id), raw);

    let parsed: OrderId = raw.to_string().parse().unwrap();
    assert_eq!(parsed, id);
    assert_eq!(id.to_string(), raw.to_string());

    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{raw}\""));

    let mut set = HashSet::new();
    set.insert(id);
    assert!(set.contains(&copy));
}
