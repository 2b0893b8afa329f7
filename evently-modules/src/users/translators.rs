use super::application::GetUser;
use super::domain::{UserProfileUpdated, UserRegistered};
use super::integration_events::{
    UserProfileUpdatedIntegrationEvent, UserRegisteredIntegrationEvent,
};
use async_trait::async_trait;
use evently_application::InMemoryQueryBus;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::eventing::IntegrationEventTranslator;
use evently_application::query_bus::QueryBus;
use std::sync::Arc;

/// 用户注册事件只携带 id，其余字段通过查询补齐
pub struct UserRegisteredTranslator {
    queries: Arc<InMemoryQueryBus>,
}

impl UserRegisteredTranslator {
    pub fn new(queries: Arc<InMemoryQueryBus>) -> Self {
        Self { queries }
    }
}

#[async_trait]
impl IntegrationEventTranslator<UserRegistered> for UserRegisteredTranslator {
    type Output = UserRegisteredIntegrationEvent;

    fn translator_name(&self) -> &'static str {
        "users.user_registered_translator"
    }

    async fn translate(
        &self,
        ctx: &AppContext,
        event: &UserRegistered,
    ) -> Result<Option<Self::Output>, AppError> {
        let user = self
            .queries
            .dispatch(
                ctx,
                GetUser {
                    user_id: event.user_id,
                },
            )
            .await?;

        Ok(Some(UserRegisteredIntegrationEvent::new(
            event.id,
            event.occurred_on_utc,
            user.id,
            user.email,
            user.first_name,
            user.last_name,
        )))
    }
}

pub struct UserProfileUpdatedTranslator;

#[async_trait]
impl IntegrationEventTranslator<UserProfileUpdated> for UserProfileUpdatedTranslator {
    type Output = UserProfileUpdatedIntegrationEvent;

    fn translator_name(&self) -> &'static str {
        "users.user_profile_updated_translator"
    }

    async fn translate(
        &self,
        _ctx: &AppContext,
        event: &UserProfileUpdated,
    ) -> Result<Option<Self::Output>, AppError> {
        Ok(Some(UserProfileUpdatedIntegrationEvent::new(
            event.id,
            event.occurred_on_utc,
            event.user_id.into(),
            event.first_name.clone(),
            event.last_name.clone(),
        )))
    }
}
