use evently_macros::value_object;

#[value_object]
struct Seat {
    row: u32,
    number: u32,
}

#[value_object(debug = false)]
struct Secret(String);

#[value_object]
enum Tier {
    General,
    Vip,
}

fn main() {
    let seat = Seat { row: 1, number: 2 };
    let _ = format!("{seat:?}");
    assert_eq!(seat.clone(), Seat { row: 1, number: 2 });

    let json = serde_json::to_string(&seat).unwrap();
    let back: Seat = serde_json::from_str(&json).unwrap();
    assert_eq!(back, seat);

    let _ = Secret("s".to_string()).clone() == Secret("s".to_string());
    assert_ne!(Tier::General, Tier::Vip);
}
