use evently_domain::domain_event::DomainEvent;
use evently_domain::entity::{Entity, EventBuffer};
use evently_macros::{domain_event, entity};

#[domain_event]
struct Opened {
    pub owner: String,
}

#[entity(id = u64)]
struct Account {
    owner: String,
}

impl Account {
    fn open(id: u64, owner: &str) -> Self {
        let mut account = Self {
            id,
            owner: owner.to_string(),
            domain_events: EventBuffer::new(),
        };
        account.raise(Opened::new(owner.to_string()));
        account
    }
}

#[entity(name = "ledger_line", debug = false)]
struct LedgerLine {}

fn main() {
    let mut account = Account::open(7, "ada");
    assert_eq!(*account.id(), 7);
    assert_eq!(Account::TYPE, "account");
    assert_eq!(account.owner, "ada");
    assert_eq!(account.domain_events().len(), 1);
    assert_eq!(account.domain_events().peek_all()[0].event_type(), "Opened");

    let copy = account.clone();
    assert_eq!(copy.owner, "ada");
    assert!(copy.domain_events().is_empty());
    account.clear_domain_events();
    assert!(account.domain_events().is_empty());
    let _ = format!("{account:?}");

    let line = LedgerLine {
        id: "l-1".to_string(),
        domain_events: EventBuffer::new(),
    };
    assert_eq!(LedgerLine::TYPE, "ledger_line");
    assert_eq!(line.id(), "l-1");
}
