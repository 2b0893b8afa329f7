use super::{Broker, IntegrationEvent, Message, MessageMetadata};
use crate::context::AppContext;
use crate::error::AppError;
use std::sync::Arc;

/// 出站总线：把集成事件编码为消息并交给代理
///
/// 不保存未发送成功的消息，失败直接返回给调用方。
#[derive(Clone)]
pub struct OutboundBus {
    broker: Arc<dyn Broker>,
}

impl OutboundBus {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self { broker }
    }

    pub async fn publish<T: IntegrationEvent>(
        &self,
        ctx: &AppContext,
        event: &T,
    ) -> Result<(), AppError> {
        let message = Message::encode(event)?;
        tracing::debug!(
            event_type = T::EVENT_TYPE,
            message_id = %message.message_id,
            correlation_id = %ctx.correlation_id,
            "publishing integration event"
        );
        self.broker
            .publish(message, MessageMetadata::from_context(ctx))
            .await
    }
}
