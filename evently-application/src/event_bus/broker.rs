use super::{Message, MessageMetadata};
use crate::error::AppError;
use async_trait::async_trait;

/// 消息代理
///
/// `publish` 在代理接受消息后返回，不等待消费者处理完成。
/// 重试与死信策略由具体代理实现负责。
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(&self, message: Message, metadata: MessageMetadata) -> Result<(), AppError>;
}
