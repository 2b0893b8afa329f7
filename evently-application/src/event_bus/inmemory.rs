//! 内存版消息代理（InMemoryBroker）
//!
//! - `publish`：写入有界队列，入队即返回；队列满时等待；
//! - 消费者在投递过程中再次发布（消费 → 命令 → 提交 → 转换器 → 发布）时，
//!   消息进入无界的后续队列，工作任务不会因等待自己的队列而卡死；
//! - `start`：启动工作任务，按消息类型把每条消息投递给全部已注册消费者，
//!   同一消息的多个消费者并发处理（上限可配）；
//! - 消费失败按 `RetryPolicy` 退避重试，解码失败不重试；
//!   最终失败的投递进入死信列表，供人工对账；
//! - 关闭时正在进行的投递会完成，队列中剩余的消息转入死信；
//! - `wait_idle`：等待队列清空且无在途投递，便于测试与演示。
//!
use super::{Broker, ConsumerRegistry, Message, MessageMetadata, RegisteredConsumer};
use crate::config::BrokerConfig;
use crate::error::AppError;
use crate::retry::retry_with_backoff;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

tokio::task_local! {
    /// 当前任务正在为哪个代理投递（共享状态的地址）
    static DELIVERING: usize;
}

#[derive(Debug, Clone)]
struct Envelope {
    message: Message,
    metadata: MessageMetadata,
}

/// 投递最终失败的消息
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub message: Message,
    pub metadata: MessageMetadata,
    pub consumer: &'static str,
    /// 实际执行次数（含首次）；关闭时未投递的消息为 0
    pub attempts: usize,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

struct Shared {
    config: BrokerConfig,
    in_flight: AtomicUsize,
    idle: Notify,
    dead_letters: Mutex<Vec<DeadLetter>>,
}

impl Shared {
    fn key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    fn finish_one(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn push_dead_letter(&self, letter: DeadLetter) {
        self.dead_letters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(letter);
    }
}

struct Receivers {
    queue: mpsc::Receiver<Envelope>,
    follow_up: mpsc::UnboundedReceiver<Envelope>,
}

impl Receivers {
    fn try_recv(&mut self) -> Option<Envelope> {
        self.follow_up
            .try_recv()
            .ok()
            .or_else(|| self.queue.try_recv().ok())
    }
}

pub struct InMemoryBroker {
    sender: mpsc::Sender<Envelope>,
    follow_up: mpsc::UnboundedSender<Envelope>,
    receivers: Mutex<Option<Receivers>>,
    shared: Arc<Shared>,
}

impl InMemoryBroker {
    pub fn new(config: BrokerConfig) -> Self {
        let (sender, queue) = mpsc::channel(config.queue_capacity.max(1));
        let (follow_up, follow_up_rx) = mpsc::unbounded_channel();
        Self {
            sender,
            follow_up,
            receivers: Mutex::new(Some(Receivers {
                queue,
                follow_up: follow_up_rx,
            })),
            shared: Arc::new(Shared {
                config,
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                dead_letters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// 启动投递任务；每个代理只能启动一次
    ///
    /// 启动前发布的消息会留在队列中，启动后按顺序投递。
    pub fn start(&self, registry: ConsumerRegistry) -> Result<BrokerHandle, AppError> {
        let receivers = self
            .receivers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| AppError::Broker("broker already started".into()))?;

        tracing::info!(
            event_types = ?registry.event_types(),
            queue_capacity = self.shared.config.queue_capacity,
            "in-memory broker started"
        );

        let token = CancellationToken::new();
        let task = tokio::spawn(Self::deliver_loop(
            self.shared.clone(),
            registry,
            receivers,
            token.clone(),
        ));

        Ok(BrokerHandle {
            token,
            task: Some(task),
        })
    }

    /// 等待所有已发布消息处理完毕（含处理过程中新发布的消息）
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.shared.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// 死信快照
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.shared
            .dead_letters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_delivering(&self) -> bool {
        let key = self.shared.key();
        DELIVERING.try_with(|current| *current == key).unwrap_or(false)
    }

    async fn deliver_loop(
        shared: Arc<Shared>,
        registry: ConsumerRegistry,
        mut receivers: Receivers,
        token: CancellationToken,
    ) {
        let key = shared.key();
        loop {
            // 后续队列优先：先处理投递中派生的消息
            let envelope = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                Some(envelope) = receivers.follow_up.recv() => envelope,
                maybe_envelope = receivers.queue.recv() => match maybe_envelope {
                    Some(envelope) => envelope,
                    None => break,
                },
            };

            DELIVERING
                .scope(key, Self::deliver(&shared, &registry, envelope))
                .await;
            shared.finish_one();
        }

        Self::drain(&shared, &registry, receivers);
        tracing::info!("in-memory broker stopped");
    }

    /// 关闭队列并把剩余消息转入死信，保证 `in_flight` 归零
    fn drain(shared: &Shared, registry: &ConsumerRegistry, mut receivers: Receivers) {
        receivers.queue.close();
        receivers.follow_up.close();

        let mut drained = 0usize;
        while let Some(envelope) = receivers.try_recv() {
            let message = &envelope.message;
            let consumers = registry.consumers_for(&message.event_type);
            for consumer in consumers {
                shared.push_dead_letter(DeadLetter {
                    message: message.clone(),
                    metadata: envelope.metadata.clone(),
                    consumer: consumer.name(),
                    attempts: 0,
                    reason: "broker shut down before delivery".to_string(),
                    failed_at: Utc::now(),
                });
            }
            if consumers.is_empty() {
                tracing::debug!(
                    event_type = %message.event_type,
                    message_id = %message.message_id,
                    "no consumers registered, message dropped"
                );
            }
            shared.finish_one();
            drained += 1;
        }

        if drained > 0 {
            tracing::warn!(drained, "undelivered messages moved to dead letters on shutdown");
        }
    }

    async fn deliver(shared: &Shared, registry: &ConsumerRegistry, envelope: Envelope) {
        let consumers = registry.consumers_for(&envelope.message.event_type);
        if consumers.is_empty() {
            tracing::debug!(
                event_type = %envelope.message.event_type,
                message_id = %envelope.message.message_id,
                "no consumers registered, message dropped"
            );
            return;
        }

        let envelope = &envelope;
        stream::iter(consumers)
            .for_each_concurrent(Some(shared.config.consumer_concurrency.max(1)), |consumer| {
                Self::deliver_to(shared, consumer, envelope)
            })
            .await;
    }
    async fn deliver_to(shared: &Shared, consumer: &RegisteredConsumer, envelope: &Envelope) {
        let message = &envelope.message;
        let ctx = envelope.metadata.to_context(message.message_id);
        let span = tracing::info_span!(
            "consume",
            consumer = consumer.name(),
            event_type = %message.event_type,
            message_id = %message.message_id,
            correlation_id = %ctx.correlation_id,
        );

        let outcome = retry_with_backoff(
            &shared.config.retry,
            |err: &AppError| !matches!(err, AppError::Decode { .. }),
            |attempt| {
                tracing::trace!(attempt, "delivering");
                consumer.deliver(&ctx, message)
            },
        )
        .instrument(span.clone())
        .await;

        match outcome {
            Ok(()) => {
                tracing::debug!(parent: &span, "delivered");
            }
            Err(exhausted) => {
                tracing::error!(
                    parent: &span,
                    attempts = exhausted.attempts,
                    error = %exhausted.error,
                    "delivery failed, moved to dead letters"
                );
                shared.push_dead_letter(DeadLetter {
                    message: message.clone(),
                    metadata: envelope.metadata.clone(),
                    consumer: consumer.name(),
                    attempts: exhausted.attempts,
                    reason: exhausted.error.to_string(),
                    failed_at: Utc::now(),
                });
            }
        }
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, message: Message, metadata: MessageMetadata) -> Result<(), AppError> {
        self.shared.in_flight.fetch_add(1, Ordering::AcqRel);
        let event_type = message.event_type.clone();
        let envelope = Envelope { message, metadata };

        // 投递中的再次发布不能等待有界队列：唯一的消费方正是当前任务
        let sent = if self.is_delivering() {
            self.follow_up.send(envelope).is_ok()
        } else {
            self.sender.send(envelope).await.is_ok()
        };

        if !sent {
            self.shared.finish_one();
            return Err(AppError::Broker(format!(
                "queue closed, cannot publish {event_type}"
            )));
        }

        Ok(())
    }
}

/// 代理运行句柄：用于优雅关闭与等待任务结束
pub struct BrokerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl BrokerHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for BrokerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
