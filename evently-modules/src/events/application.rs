//! Events 模块的命令与查询
//!
//! 所有处理器共享同一组依赖，因此由一个 `EventsHandler` 统一实现，
//! 按命令类型分别注册到总线。
//!
use super::domain::{Event, EventErrors, EventId, EventStatus, TicketTypeErrors, TicketTypeId};
use super::persistence::EventStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use evently_application::clock::DateTimeProvider;
use evently_application::command::Command;
use evently_application::command_handler::CommandHandler;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::query::Query;
use evently_application::query_handler::QueryHandler;
use evently_application::validation::Validator;
use evently_domain::entity::Entity;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub title: String,
    pub starts_at_utc: DateTime<Utc>,
    pub ends_at_utc: DateTime<Utc>,
}

impl Command for CreateEvent {
    const NAME: &'static str = "events.create_event";
    type Output = EventId;

    fn validate(&self) -> Result<(), AppError> {
        Validator::new().not_empty("title", &self.title).finish()
    }
}

#[derive(Debug, Clone)]
pub struct PublishEvent {
    pub event_id: EventId,
}

impl Command for PublishEvent {
    const NAME: &'static str = "events.publish_event";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct CompleteEvent {
    pub event_id: EventId,
}

impl Command for CompleteEvent {
    const NAME: &'static str = "events.complete_event";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct CancelEvent {
    pub event_id: EventId,
}

impl Command for CancelEvent {
    const NAME: &'static str = "events.cancel_event";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct CreateTicketType {
    pub event_id: EventId,
    pub name: String,
    pub price_minor: i64,
    pub currency: String,
    pub quantity: u32,
}

impl Command for CreateTicketType {
    const NAME: &'static str = "events.create_ticket_type";
    type Output = TicketTypeId;

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_empty("name", &self.name)
            .check("price_minor", self.price_minor >= 0, "must not be negative")
            .not_empty("currency", &self.currency)
            .check("quantity", self.quantity > 0, "must be greater than zero")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateTicketTypePrice {
    pub ticket_type_id: TicketTypeId,
    pub price_minor: i64,
}

impl Command for UpdateTicketTypePrice {
    const NAME: &'static str = "events.update_ticket_type_price";
    type Output = ();

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .check("price_minor", self.price_minor >= 0, "must not be negative")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GetEvent {
    pub event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketTypeResponse {
    pub id: TicketTypeId,
    pub name: String,
    pub price_minor: i64,
    pub currency: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub id: EventId,
    pub title: String,
    pub starts_at_utc: DateTime<Utc>,
    pub ends_at_utc: DateTime<Utc>,
    pub status: EventStatus,
    pub ticket_types: Vec<TicketTypeResponse>,
}

impl Query for GetEvent {
    const NAME: &'static str = "events.get_event";
    type Output = EventResponse;
}

pub struct EventsHandler {
    store: Arc<EventStore>,
    uow: UnitOfWorkFactory,
    clock: Arc<dyn DateTimeProvider>,
}

impl EventsHandler {
    pub fn new(
        store: Arc<EventStore>,
        uow: UnitOfWorkFactory,
        clock: Arc<dyn DateTimeProvider>,
    ) -> Self {
        Self { store, uow, clock }
    }

    fn load_event(&self, id: EventId) -> Result<Event, AppError> {
        self.store
            .event(&id)
            .ok_or_else(|| EventErrors::not_found(id).into())
    }

    async fn save_event(&self, ctx: &AppContext, event: Event) -> Result<(), AppError> {
        let mut uow = self.uow.begin();
        uow.track(event);
        uow.commit(ctx).await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateEvent> for EventsHandler {
    async fn handle(&self, ctx: &AppContext, cmd: CreateEvent) -> Result<EventId, AppError> {
        let event = Event::create(cmd.title, cmd.starts_at_utc, cmd.ends_at_utc)?;
        let id = *event.id();
        self.save_event(ctx, event).await?;
        Ok(id)
    }
}

#[async_trait]
impl CommandHandler<PublishEvent> for EventsHandler {
    async fn handle(&self, ctx: &AppContext, cmd: PublishEvent) -> Result<(), AppError> {
        let mut event = self.load_event(cmd.event_id)?;
        event.publish()?;
        self.save_event(ctx, event).await
    }
}

#[async_trait]
impl CommandHandler<CompleteEvent> for EventsHandler {
    async fn handle(&self, ctx: &AppContext, cmd: CompleteEvent) -> Result<(), AppError> {
        let mut event = self.load_event(cmd.event_id)?;
        event.complete()?;
        self.save_event(ctx, event).await
    }
}

#[async_trait]
impl CommandHandler<CancelEvent> for EventsHandler {
    async fn handle(&self, ctx: &AppContext, cmd: CancelEvent) -> Result<(), AppError> {
        let mut event = self.load_event(cmd.event_id)?;
        event.cancel(self.clock.utc_now())?;
        self.save_event(ctx, event).await
    }
}

#[async_trait]
impl CommandHandler<CreateTicketType> for EventsHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: CreateTicketType,
    ) -> Result<TicketTypeId, AppError> {
        let event = self.load_event(cmd.event_id)?;
        let ticket_type =
            event.add_ticket_type(cmd.name, cmd.price_minor, &cmd.currency, cmd.quantity)?;
        let id = *ticket_type.id();

        let mut uow = self.uow.begin();
        uow.track(ticket_type);
        uow.commit(ctx).await?;
        Ok(id)
    }
}

#[async_trait]
impl CommandHandler<UpdateTicketTypePrice> for EventsHandler {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateTicketTypePrice) -> Result<(), AppError> {
        let mut ticket_type = self
            .store
            .ticket_type(&cmd.ticket_type_id)
            .ok_or_else(|| TicketTypeErrors::not_found(cmd.ticket_type_id))?;
        let event = self.load_event(ticket_type.event_id())?;

        // 规则不满足时直接返回，不开启工作单元
        ticket_type.update_price(cmd.price_minor, &event, self.clock.utc_now())?;

        let mut uow = self.uow.begin();
        uow.track(ticket_type);
        uow.commit(ctx).await?;

        tracing::info!(
            ticket_type_id = %cmd.ticket_type_id,
            price_minor = cmd.price_minor,
            "ticket type price updated"
        );
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetEvent> for EventsHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetEvent) -> Result<EventResponse, AppError> {
        let event = self.load_event(q.event_id)?;
        let mut ticket_types: Vec<TicketTypeResponse> = self
            .store
            .ticket_types_for(q.event_id)
            .into_iter()
            .map(|tt| TicketTypeResponse {
                id: *tt.id(),
                name: tt.name().to_string(),
                price_minor: tt.price().amount_minor(),
                currency: tt.price().currency().to_string(),
                quantity: tt.quantity(),
            })
            .collect();
        ticket_types.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(EventResponse {
            id: q.event_id,
            title: event.title().to_string(),
            starts_at_utc: event.starts_at_utc(),
            ends_at_utc: event.ends_at_utc(),
            status: event.status(),
            ticket_types,
        })
    }
}
