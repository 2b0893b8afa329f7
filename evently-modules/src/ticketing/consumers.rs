//! 入站消费者：解码其他模块的集成事件，转为本模块命令
//!
//! 每次消费都经命令总线开启新的工作单元。命令失败原样返回，
//! 重试与死信交由代理处理。
//!
use super::application::{CreateCustomer, RepriceCartItems, UpdateCustomer};
use crate::events::integration_events::TicketTypePriceChangedIntegrationEvent;
use crate::users::integration_events::{
    UserProfileUpdatedIntegrationEvent, UserRegisteredIntegrationEvent,
};
use async_trait::async_trait;
use evently_application::InMemoryCommandBus;
use evently_application::command_bus::CommandBus;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::event_bus::IntegrationEventConsumer;
use std::sync::Arc;

pub struct UserRegisteredConsumer {
    commands: Arc<InMemoryCommandBus>,
}

impl UserRegisteredConsumer {
    pub fn new(commands: Arc<InMemoryCommandBus>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl IntegrationEventConsumer<UserRegisteredIntegrationEvent> for UserRegisteredConsumer {
    fn consumer_name(&self) -> &'static str {
        "ticketing.user_registered"
    }

    async fn consume(
        &self,
        ctx: &AppContext,
        event: UserRegisteredIntegrationEvent,
    ) -> Result<(), AppError> {
        self.commands
            .dispatch(
                ctx,
                CreateCustomer {
                    customer_id: event.user_id.into(),
                    email: event.email,
                    first_name: event.first_name,
                    last_name: event.last_name,
                },
            )
            .await
    }
}

pub struct UserProfileUpdatedConsumer {
    commands: Arc<InMemoryCommandBus>,
}

impl UserProfileUpdatedConsumer {
    pub fn new(commands: Arc<InMemoryCommandBus>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl IntegrationEventConsumer<UserProfileUpdatedIntegrationEvent> for UserProfileUpdatedConsumer {
    fn consumer_name(&self) -> &'static str {
        "ticketing.user_profile_updated"
    }

    async fn consume(
        &self,
        ctx: &AppContext,
        event: UserProfileUpdatedIntegrationEvent,
    ) -> Result<(), AppError> {
        self.commands
            .dispatch(
                ctx,
                UpdateCustomer {
                    customer_id: event.user_id.into(),
                    first_name: event.first_name,
                    last_name: event.last_name,
                },
            )
            .await
    }
}

pub struct TicketTypePriceChangedConsumer {
    commands: Arc<InMemoryCommandBus>,
}

impl TicketTypePriceChangedConsumer {
    pub fn new(commands: Arc<InMemoryCommandBus>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl IntegrationEventConsumer<TicketTypePriceChangedIntegrationEvent>
    for TicketTypePriceChangedConsumer
{
    fn consumer_name(&self) -> &'static str {
        "ticketing.ticket_type_price_changed"
    }

    async fn consume(
        &self,
        ctx: &AppContext,
        event: TicketTypePriceChangedIntegrationEvent,
    ) -> Result<(), AppError> {
        self.commands
            .dispatch(
                ctx,
                RepriceCartItems {
                    ticket_type_id: event.ticket_type_id,
                    price_minor: event.price_minor,
                    currency: event.currency,
                },
            )
            .await?;
        Ok(())
    }
}
