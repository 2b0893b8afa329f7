use super::handler::DomainEventHandler;
use crate::context::AppContext;
use crate::error::AppError;
use crate::event_bus::{IntegrationEvent, OutboundBus};
use async_trait::async_trait;
use evently_domain::domain_event::DomainEvent;
use std::any::type_name;

/// 领域事件 → 集成事件转换器
///
/// 可以通过查询总线补齐数据；返回 `None` 表示该事件无需对外发布。
/// 多次调用必须是安全的（下游消费者幂等）。
#[async_trait]
pub trait IntegrationEventTranslator<E: DomainEvent>: Send + Sync {
    type Output: IntegrationEvent;

    fn translator_name(&self) -> &'static str {
        type_name::<Self>()
    }

    async fn translate(&self, ctx: &AppContext, event: &E)
    -> Result<Option<Self::Output>, AppError>;
}

/// 以本地处理器的身份运行转换器，并把结果发布到出站总线
pub struct TranslatingHandler<T> {
    translator: T,
    outbound: OutboundBus,
}

impl<T> TranslatingHandler<T> {
    pub fn new(translator: T, outbound: OutboundBus) -> Self {
        Self {
            translator,
            outbound,
        }
    }
}

#[async_trait]
impl<E, T> DomainEventHandler<E> for TranslatingHandler<T>
where
    E: DomainEvent,
    T: IntegrationEventTranslator<E>,
{
    fn handler_name(&self) -> &'static str {
        self.translator.translator_name()
    }

    async fn handle(&self, ctx: &AppContext, event: &E) -> Result<(), AppError> {
        let translator = self.translator.translator_name();
        let translated = self
            .translator
            .translate(ctx, event)
            .await
            .map_err(|source| AppError::Translation {
                translator,
                source: Box::new(source),
            })?;

        let Some(integration_event) = translated else {
            tracing::debug!(translator, "nothing to publish");
            return Ok(());
        };

        self.outbound.publish(ctx, &integration_event).await
    }
}
