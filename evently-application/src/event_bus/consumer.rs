//! 入站消费者与订阅注册表
//!
//! 每个（集成事件类型，消费者）组合对应一条独立的解码/处理路径。
//! 注册表在启动时一次性构建，之后只读，代理工作任务无锁并发读取。
//!
use super::{IntegrationEvent, Message};
use crate::context::AppContext;
use crate::error::AppError;
use async_trait::async_trait;
use std::any::type_name;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// 集成事件消费者
///
/// 实现方通常只做一件事：把事件转换为本模块的命令并交给命令总线。
/// 重复投递必须是安全的（幂等），失败时直接返回错误，由代理决定是否重试。
#[async_trait]
pub trait IntegrationEventConsumer<T: IntegrationEvent>: Send + Sync {
    fn consumer_name(&self) -> &'static str {
        type_name::<Self>()
    }

    async fn consume(&self, ctx: &AppContext, event: T) -> Result<(), AppError>;
}

type DeliverFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'a>>;

type DeliverFn =
    Arc<dyn for<'a> Fn(&'a AppContext, &'a Message) -> DeliverFuture<'a> + Send + Sync>;

/// 类型擦除后的消费者
#[derive(Clone)]
pub struct RegisteredConsumer {
    name: &'static str,
    event_type: &'static str,
    deliver: DeliverFn,
}

impl RegisteredConsumer {
    fn new<T, C>(consumer: Arc<C>) -> Self
    where
        T: IntegrationEvent,
        C: IntegrationEventConsumer<T> + 'static,
    {
        let name = consumer.consumer_name();
        let deliver: DeliverFn = Arc::new(move |ctx, message| {
            let consumer = consumer.clone();
            Box::pin(async move {
                // 解码失败原样返回（AppError::Decode），代理不会重试
                let event = message.decode::<T>()?;
                consumer
                    .consume(ctx, event)
                    .await
                    .map_err(|source| AppError::Consumer {
                        consumer: name,
                        source: Box::new(source),
                    })
            })
        });

        Self {
            name,
            event_type: T::EVENT_TYPE,
            deliver,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// 解码并交给消费者处理
    pub async fn deliver(&self, ctx: &AppContext, message: &Message) -> Result<(), AppError> {
        (self.deliver)(ctx, message).await
    }
}

#[derive(Default)]
pub struct ConsumerRegistryBuilder {
    by_type: HashMap<&'static str, Vec<RegisteredConsumer>>,
}

impl ConsumerRegistryBuilder {
    /// 为集成事件 `T` 注册消费者；同一事件类型下同名消费者只能注册一次
    pub fn consume<T, C>(mut self, consumer: Arc<C>) -> Result<Self, AppError>
    where
        T: IntegrationEvent,
        C: IntegrationEventConsumer<T> + 'static,
    {
        let registered = RegisteredConsumer::new::<T, C>(consumer);
        let list = self.by_type.entry(T::EVENT_TYPE).or_default();

        if list.iter().any(|c| c.name == registered.name) {
            return Err(AppError::AlreadyRegisteredConsumer {
                event_type: T::EVENT_TYPE,
                consumer: registered.name,
            });
        }

        list.push(registered);
        Ok(self)
    }

    pub fn build(self) -> ConsumerRegistry {
        ConsumerRegistry {
            by_type: Arc::new(self.by_type),
        }
    }
}

/// 消息类型 → 消费者列表（注册顺序）
#[derive(Clone, Default)]
pub struct ConsumerRegistry {
    by_type: Arc<HashMap<&'static str, Vec<RegisteredConsumer>>>,
}

impl ConsumerRegistry {
    pub fn builder() -> ConsumerRegistryBuilder {
        ConsumerRegistryBuilder::default()
    }

    pub fn consumers_for(&self, event_type: &str) -> &[RegisteredConsumer] {
        self.by_type
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.by_type.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use evently_macros::integration_event;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[integration_event(event_type = "tests.greeted")]
    struct Greeted {
        pub name: String,
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IntegrationEventConsumer<Greeted> for Recorder {
        fn consumer_name(&self) -> &'static str {
            "recorder"
        }

        async fn consume(&self, _ctx: &AppContext, event: Greeted) -> Result<(), AppError> {
            self.seen.lock().unwrap().push(event.name);
            Ok(())
        }
    }

    struct Refuser;

    #[async_trait]
    impl IntegrationEventConsumer<Greeted> for Refuser {
        async fn consume(&self, _ctx: &AppContext, _event: Greeted) -> Result<(), AppError> {
            Err(AppError::Broker("refused".into()))
        }
    }

    #[tokio::test]
    async fn delivers_decoded_event_and_wraps_failures() {
        let recorder = Arc::new(Recorder::default());
        let registry = ConsumerRegistry::builder()
            .consume::<Greeted, _>(recorder.clone())
            .unwrap()
            .consume::<Greeted, _>(Arc::new(Refuser))
            .unwrap()
            .build();

        let message = Message::encode(&Greeted::new(Uuid::now_v7(), Utc::now(), "Ada".into())).unwrap();
        let consumers = registry.consumers_for("tests.greeted");
        assert_eq!(consumers.len(), 2);
        assert_eq!(consumers[0].name(), "recorder");

        let ctx = AppContext::default();
        consumers[0].deliver(&ctx, &message).await.unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["Ada".to_string()]);

        let err = consumers[1].deliver(&ctx, &message).await.unwrap_err();
        assert!(matches!(err, AppError::Consumer { consumer, .. } if consumer.ends_with("Refuser")));

        assert!(registry.consumers_for("tests.unknown").is_empty());
        assert_eq!(registry.event_types(), vec!["tests.greeted"]);
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_decode_error() {
        let registry = ConsumerRegistry::builder()
            .consume::<Greeted, _>(Arc::new(Recorder::default()))
            .unwrap()
            .build();
        let mut message = Message::encode(&Greeted::new(Uuid::now_v7(), Utc::now(), "x".into())).unwrap();
        message.payload = serde_json::json!({ "name": [] });

        let err = registry.consumers_for("tests.greeted")[0]
            .deliver(&AppContext::default(), &message)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }

    #[test]
    fn same_consumer_twice_is_rejected() {
        let result = ConsumerRegistry::builder()
            .consume::<Greeted, _>(Arc::new(Recorder::default()))
            .and_then(|b| b.consume::<Greeted, _>(Arc::new(Recorder::default())));
        assert!(matches!(
            result,
            Err(AppError::AlreadyRegisteredConsumer { consumer: "recorder", .. })
        ));
    }
}
