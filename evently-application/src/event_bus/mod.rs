//! 集成事件与跨模块消息投递
//!
//! 集成事件是模块之间唯一允许共享的契约：发布方的转换器生成它，
//! 经由 `OutboundBus` 编码为 `Message` 交给 `Broker`；订阅方的消费者
//! 在代理的工作任务中解码并通过命令总线重新进入系统。
//!
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

mod broker;
mod consumer;
mod inmemory;
mod message;
mod outbound;

pub use broker::Broker;
pub use consumer::{
    ConsumerRegistry, ConsumerRegistryBuilder, IntegrationEventConsumer, RegisteredConsumer,
};
pub use inmemory::{BrokerHandle, DeadLetter, InMemoryBroker};
pub use message::{Message, MessageMetadata};
pub use outbound::OutboundBus;

/// 集成事件
///
/// 通常通过 `#[integration_event]` 宏定义：宏会注入 `id` 与 `occurred_on_utc`
/// 字段并实现本 trait。新增字段应使用 `Option` 或 `#[serde(default)]`，
/// 以便旧消息仍能解码。
pub trait IntegrationEvent:
    Serialize + DeserializeOwned + fmt::Debug + Clone + Send + Sync + 'static
{
    /// 线上类型标识（消息路由键）
    const EVENT_TYPE: &'static str;

    fn id(&self) -> Uuid;

    fn occurred_on_utc(&self) -> DateTime<Utc>;
}
