//! Ticketing 模块
//!
//! 不引用 Users / Events 的领域模型，只通过它们的集成事件维护客户副本
//! 与购物车单价。
//!
pub mod application;
pub mod carts;
pub mod consumers;
pub mod domain;
pub mod persistence;

use crate::events::integration_events::TicketTypePriceChangedIntegrationEvent;
use crate::users::integration_events::{
    UserProfileUpdatedIntegrationEvent, UserRegisteredIntegrationEvent,
};
use application::{
    AddItemToCart, ClearCart, CreateCustomer, GetCart, GetCustomer, RemoveItemFromCart,
    RepriceCartItems, TicketingHandler, UpdateCustomer,
};
use carts::CartService;
use consumers::{
    TicketTypePriceChangedConsumer, UserProfileUpdatedConsumer, UserRegisteredConsumer,
};
use evently_application::error::AppError;
use evently_application::event_bus::ConsumerRegistryBuilder;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::{InMemoryCommandBus, InMemoryQueryBus};
use persistence::TicketingStore;
use std::sync::Arc;

pub const MODULE_NAME: &str = "ticketing";

pub fn register(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    store: Arc<TicketingStore>,
    uow: UnitOfWorkFactory,
    carts: Arc<CartService>,
) -> Result<(), AppError> {
    let handler = Arc::new(TicketingHandler::new(store, uow, carts));

    commands.register::<CreateCustomer, _>(handler.clone())?;
    commands.register::<UpdateCustomer, _>(handler.clone())?;
    commands.register::<AddItemToCart, _>(handler.clone())?;
    commands.register::<RemoveItemFromCart, _>(handler.clone())?;
    commands.register::<ClearCart, _>(handler.clone())?;
    commands.register::<RepriceCartItems, _>(handler.clone())?;
    queries.register::<GetCustomer, _>(handler.clone())?;
    queries.register::<GetCart, _>(handler)?;
    Ok(())
}

/// 注册入站消费者
pub fn consume(
    registry: ConsumerRegistryBuilder,
    commands: Arc<InMemoryCommandBus>,
) -> Result<ConsumerRegistryBuilder, AppError> {
    registry
        .consume::<UserRegisteredIntegrationEvent, _>(Arc::new(UserRegisteredConsumer::new(
            commands.clone(),
        )))?
        .consume::<UserProfileUpdatedIntegrationEvent, _>(Arc::new(
            UserProfileUpdatedConsumer::new(commands.clone()),
        ))?
        .consume::<TicketTypePriceChangedIntegrationEvent, _>(Arc::new(
            TicketTypePriceChangedConsumer::new(commands),
        ))
}
