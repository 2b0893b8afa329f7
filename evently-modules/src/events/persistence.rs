use super::domain::{Event, EventId, TicketType, TicketTypeId};
use crate::store::InMemoryTable;
use async_trait::async_trait;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::DataStore;
use evently_domain::entity::TrackedEntity;

/// Events 模块的内存存储：活动与票种两张表，单次写入同时生效
#[derive(Default)]
pub struct EventStore {
    events: InMemoryTable<Event>,
    ticket_types: InMemoryTable<TicketType>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&self, id: &EventId) -> Option<Event> {
        self.events.get(id)
    }

    pub fn ticket_type(&self, id: &TicketTypeId) -> Option<TicketType> {
        self.ticket_types.get(id)
    }

    pub fn ticket_types_for(&self, event_id: EventId) -> Vec<TicketType> {
        self.ticket_types.find(|tt| tt.event_id() == event_id)
    }
}

#[async_trait]
impl DataStore for EventStore {
    async fn write(
        &self,
        _ctx: &AppContext,
        entities: &[Box<dyn TrackedEntity>],
    ) -> Result<usize, AppError> {
        let events = self.events.stage(entities);
        let ticket_types = self.ticket_types.stage(entities);
        let written = events.len() + ticket_types.len();

        self.events.apply(events);
        self.ticket_types.apply(ticket_types);
        Ok(written)
    }
}
