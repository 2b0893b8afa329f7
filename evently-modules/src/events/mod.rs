//! Events 模块
//!
//! 管理活动生命周期与票种。票价调整经转换器发布为
//! `TicketTypePriceChangedIntegrationEvent`，Ticketing 据此刷新购物车单价。
//!
pub mod application;
pub mod domain;
pub mod integration_events;
pub mod persistence;
pub mod translators;

use application::{
    CancelEvent, CompleteEvent, CreateEvent, CreateTicketType, EventsHandler, GetEvent,
    PublishEvent, UpdateTicketTypePrice,
};
use domain::TicketTypePriceChanged;
use evently_application::clock::DateTimeProvider;
use evently_application::error::AppError;
use evently_application::event_bus::OutboundBus;
use evently_application::eventing::LocalDispatcherBuilder;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::{InMemoryCommandBus, InMemoryQueryBus};
use persistence::EventStore;
use std::sync::Arc;
use translators::TicketTypePriceChangedTranslator;

pub const MODULE_NAME: &str = "events";

pub fn subscribe(dispatcher: LocalDispatcherBuilder, outbound: OutboundBus) -> LocalDispatcherBuilder {
    dispatcher.translate::<TicketTypePriceChanged, _>(TicketTypePriceChangedTranslator, outbound)
}

pub fn register(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    store: Arc<EventStore>,
    uow: UnitOfWorkFactory,
    clock: Arc<dyn DateTimeProvider>,
) -> Result<(), AppError> {
    let handler = Arc::new(EventsHandler::new(store, uow, clock));

    commands.register::<CreateEvent, _>(handler.clone())?;
    commands.register::<PublishEvent, _>(handler.clone())?;
    commands.register::<CompleteEvent, _>(handler.clone())?;
    commands.register::<CancelEvent, _>(handler.clone())?;
    commands.register::<CreateTicketType, _>(handler.clone())?;
    commands.register::<UpdateTicketTypePrice, _>(handler.clone())?;
    queries.register::<GetEvent, _>(handler)?;
    Ok(())
}
