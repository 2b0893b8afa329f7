//! Users 模块
//!
//! 负责用户注册与资料维护。`UserRegistered` / `UserProfileUpdated`
//! 经转换器翻译为集成事件后发布，Ticketing 据此维护自己的客户副本。
//!
pub mod application;
pub mod domain;
pub mod integration_events;
pub mod persistence;
pub mod translators;

use application::{
    GetUser, GetUserHandler, RegisterUser, RegisterUserHandler, UpdateProfile,
    UpdateProfileHandler,
};
use domain::{UserProfileUpdated, UserRegistered};
use evently_application::error::AppError;
use evently_application::event_bus::OutboundBus;
use evently_application::eventing::LocalDispatcherBuilder;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::{InMemoryCommandBus, InMemoryQueryBus};
use persistence::UserStore;
use std::sync::Arc;
use translators::{UserProfileUpdatedTranslator, UserRegisteredTranslator};

pub const MODULE_NAME: &str = "users";

/// 注册本模块的领域事件转换器
pub fn subscribe(
    dispatcher: LocalDispatcherBuilder,
    queries: Arc<InMemoryQueryBus>,
    outbound: OutboundBus,
) -> LocalDispatcherBuilder {
    dispatcher
        .translate::<UserRegistered, _>(UserRegisteredTranslator::new(queries), outbound.clone())
        .translate::<UserProfileUpdated, _>(UserProfileUpdatedTranslator, outbound)
}

/// 注册本模块的命令与查询处理器
pub fn register(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    store: Arc<UserStore>,
    uow: UnitOfWorkFactory,
) -> Result<(), AppError> {
    commands.register::<RegisterUser, _>(Arc::new(RegisterUserHandler::new(uow.clone())))?;
    commands.register::<UpdateProfile, _>(Arc::new(UpdateProfileHandler::new(
        store.clone(),
        uow,
    )))?;
    queries.register::<GetUser, _>(Arc::new(GetUserHandler::new(store)))?;
    Ok(())
}
