use chrono::{DateTime, Duration, Utc};
use evently_domain::entity::EventBuffer;
use evently_domain::error::{DomainError, DomainResult};
use evently_domain::value_object::Money;
use evently_macros::{domain_event, entity, entity_id, value_object};
use uuid::Uuid;

#[entity_id]
pub struct EventId(Uuid);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

#[entity_id]
pub struct TicketTypeId(Uuid);

impl TicketTypeId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

#[value_object]
#[derive(Copy)]
pub enum EventStatus {
    Draft,
    Published,
    Completed,
    Canceled,
}

#[domain_event(event_type = "events.event_created")]
pub struct EventCreated {
    pub event_id: EventId,
    pub title: String,
    pub starts_at_utc: DateTime<Utc>,
}

#[domain_event(event_type = "events.event_published")]
pub struct EventPublished {
    pub event_id: EventId,
}

#[domain_event(event_type = "events.event_completed")]
pub struct EventCompleted {
    pub event_id: EventId,
}

#[domain_event(event_type = "events.event_canceled")]
pub struct EventCanceled {
    pub event_id: EventId,
}

#[domain_event(event_type = "events.ticket_type_price_changed")]
pub struct TicketTypePriceChanged {
    pub ticket_type_id: TicketTypeId,
    pub price: Money,
}

/// 活动聚合
#[entity(id = EventId)]
pub struct Event {
    title: String,
    starts_at_utc: DateTime<Utc>,
    ends_at_utc: DateTime<Utc>,
    status: EventStatus,
}

impl Event {
    /// 新建草稿活动，结束时间不得早于开始时间
    pub fn create(
        title: impl Into<String>,
        starts_at_utc: DateTime<Utc>,
        ends_at_utc: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if ends_at_utc < starts_at_utc {
            return Err(EventErrors::end_date_precedes_start_date());
        }

        let mut event = Self {
            id: EventId::generate(),
            title: title.into(),
            starts_at_utc,
            ends_at_utc,
            status: EventStatus::Draft,
            domain_events: EventBuffer::new(),
        };
        event.raise(EventCreated::new(
            event.id,
            event.title.clone(),
            event.starts_at_utc,
        ));
        Ok(event)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn starts_at_utc(&self) -> DateTime<Utc> {
        self.starts_at_utc
    }

    pub fn ends_at_utc(&self) -> DateTime<Utc> {
        self.ends_at_utc
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn publish(&mut self) -> DomainResult<()> {
        if self.status != EventStatus::Draft {
            return Err(EventErrors::not_draft());
        }
        self.status = EventStatus::Published;
        self.raise(EventPublished::new(self.id));
        Ok(())
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        match self.status {
            EventStatus::Published => {}
            EventStatus::Completed => return Err(EventErrors::already_completed()),
            _ => return Err(EventErrors::not_published()),
        }
        self.status = EventStatus::Completed;
        self.raise(EventCompleted::new(self.id));
        Ok(())
    }

    /// 已开始的活动不能取消
    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            EventStatus::Canceled => return Err(EventErrors::already_canceled()),
            EventStatus::Completed => return Err(EventErrors::already_completed()),
            _ => {}
        }
        if self.starts_at_utc <= now {
            return Err(EventErrors::already_started());
        }
        self.status = EventStatus::Canceled;
        self.raise(EventCanceled::new(self.id));
        Ok(())
    }

    /// 为活动新增票种；票种是独立聚合，只能经由活动创建
    pub fn add_ticket_type(
        &self,
        name: impl Into<String>,
        price_minor: i64,
        currency: &str,
        quantity: u32,
    ) -> DomainResult<TicketType> {
        if self.status == EventStatus::Canceled {
            return Err(EventErrors::already_canceled());
        }
        Ok(TicketType {
            id: TicketTypeId::generate(),
            event_id: self.id,
            name: name.into(),
            price: Money::new(price_minor, currency)?,
            quantity,
            domain_events: EventBuffer::new(),
        })
    }
}

/// 票种
#[entity(id = TicketTypeId)]
pub struct TicketType {
    event_id: EventId,
    name: String,
    price: Money,
    quantity: u32,
}

impl TicketType {
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 调整票价（币种不变）
    ///
    /// 依次检查：价格未变、活动已结束、距开演不足 24 小时；
    /// 任何一项不满足都直接返回错误，状态与事件缓冲区保持不变。
    pub fn update_price(
        &mut self,
        price_minor: i64,
        event: &Event,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.price.amount_minor() == price_minor {
            return Err(TicketTypeErrors::same_price());
        }

        if event.status() == EventStatus::Completed {
            return Err(TicketTypeErrors::cannot_change_price_after_event_completed());
        }

        if event.starts_at_utc() <= now + Duration::hours(24) {
            return Err(TicketTypeErrors::cannot_change_price_within_24_hours());
        }

        let price = Money::new(price_minor, self.price.currency())?;
        self.price = price.clone();
        self.raise(TicketTypePriceChanged::new(self.id, price));
        Ok(())
    }
}

pub struct EventErrors;

impl EventErrors {
    pub fn not_found(event_id: EventId) -> DomainError {
        DomainError::not_found(
            "Events.NotFound",
            format!("The event with the identifier {event_id} was not found"),
        )
    }

    pub fn end_date_precedes_start_date() -> DomainError {
        DomainError::problem(
            "Events.EndDatePrecedesStartDate",
            "The event end date precedes the start date",
        )
    }

    pub fn not_draft() -> DomainError {
        DomainError::problem("Events.NotDraft", "The event is not in draft status")
    }

    pub fn not_published() -> DomainError {
        DomainError::problem("Events.NotPublished", "The event is not published")
    }

    pub fn already_completed() -> DomainError {
        DomainError::problem("Events.AlreadyCompleted", "The event was already completed")
    }

    pub fn already_canceled() -> DomainError {
        DomainError::problem("Events.AlreadyCanceled", "The event was already canceled")
    }

    pub fn already_started() -> DomainError {
        DomainError::problem("Events.AlreadyStarted", "The event has already started")
    }
}

pub struct TicketTypeErrors;

impl TicketTypeErrors {
    pub fn not_found(ticket_type_id: TicketTypeId) -> DomainError {
        DomainError::not_found(
            "TicketTypes.NotFound",
            format!("The ticket type with the identifier {ticket_type_id} was not found"),
        )
    }

    pub fn same_price() -> DomainError {
        DomainError::problem(
            "TicketTypes.SamePrice",
            "The new price is the same as the current price",
        )
    }

    pub fn cannot_change_price_after_event_completed() -> DomainError {
        DomainError::problem(
            "TicketTypes.CannotChangePriceAfterEventCompleted",
            "The ticket type price cannot be changed after the event is completed",
        )
    }

    pub fn cannot_change_price_within_24_hours() -> DomainError {
        DomainError::problem(
            "TicketTypes.CannotChangePriceWithin24Hours",
            "The ticket type price cannot be changed within 24 hours of the event start time",
        )
    }
}
