//! 模块装配
//!
//! 装配顺序由依赖决定：代理与出站总线 → 命令/查询总线 → 本地分发器
//! （转换器依赖查询总线与出站总线）→ 提交拦截器与各模块工作单元工厂 →
//! 命令/查询处理器 → 入站消费者 → 启动代理。
//!
//! 必须在 tokio 运行时内调用 [`EventlyApp::start`]。
//!
use crate::events::{self, persistence::EventStore};
use crate::ticketing::{self, carts::CartService, persistence::TicketingStore};
use crate::users::{self, persistence::UserStore};
use evently_application::clock::DateTimeProvider;
use evently_application::config::BrokerConfig;
use evently_application::error::AppError;
use evently_application::event_bus::{BrokerHandle, ConsumerRegistry, InMemoryBroker, OutboundBus};
use evently_application::eventing::LocalDispatcher;
use evently_application::persistence::{
    CommitInterceptor, SaveChangesInterceptor, UnitOfWorkFactory,
};
use evently_application::{InMemoryCommandBus, InMemoryQueryBus};
use std::sync::Arc;

pub struct EventlyApp {
    pub commands: Arc<InMemoryCommandBus>,
    pub queries: Arc<InMemoryQueryBus>,
    pub broker: Arc<InMemoryBroker>,
    pub users: Arc<UserStore>,
    pub events: Arc<EventStore>,
    pub ticketing: Arc<TicketingStore>,
    pub carts: Arc<CartService>,
    handle: BrokerHandle,
}

impl EventlyApp {
    pub fn start(
        broker_config: BrokerConfig,
        clock: Arc<dyn DateTimeProvider>,
    ) -> Result<Self, AppError> {
        let broker = Arc::new(InMemoryBroker::new(broker_config));
        let outbound = OutboundBus::new(broker.clone());
        let commands = Arc::new(InMemoryCommandBus::new());
        let queries = Arc::new(InMemoryQueryBus::new());

        let dispatcher = LocalDispatcher::builder();
        let dispatcher = users::subscribe(dispatcher, queries.clone(), outbound.clone());
        let dispatcher = events::subscribe(dispatcher, outbound);
        let commit: Arc<dyn SaveChangesInterceptor> =
            Arc::new(CommitInterceptor::new(dispatcher.build()));

        let user_store = Arc::new(UserStore::new());
        users::register(
            &commands,
            &queries,
            user_store.clone(),
            UnitOfWorkFactory::new(user_store.clone(), vec![commit.clone()]),
        )?;

        let event_store = Arc::new(EventStore::new());
        events::register(
            &commands,
            &queries,
            event_store.clone(),
            UnitOfWorkFactory::new(event_store.clone(), vec![commit.clone()]),
            clock,
        )?;

        let ticketing_store = Arc::new(TicketingStore::new());
        let carts = Arc::new(CartService::new());
        ticketing::register(
            &commands,
            &queries,
            ticketing_store.clone(),
            UnitOfWorkFactory::new(ticketing_store.clone(), vec![commit]),
            carts.clone(),
        )?;

        let registry = ticketing::consume(ConsumerRegistry::builder(), commands.clone())?.build();
        let handle = broker.start(registry)?;

        tracing::info!(
            modules = ?[users::MODULE_NAME, events::MODULE_NAME, ticketing::MODULE_NAME],
            commands = commands.registered_commands().len(),
            queries = queries.registered_queries().len(),
            "evently modules started"
        );

        Ok(Self {
            commands,
            queries,
            broker,
            users: user_store,
            events: event_store,
            ticketing: ticketing_store,
            carts,
            handle,
        })
    }

    /// 等待代理中的消息全部处理完毕
    pub async fn wait_idle(&self) {
        self.broker.wait_idle().await;
    }

    /// 处理完在途消息后停止代理
    pub async fn shutdown(self) {
        self.broker.wait_idle().await;
        self.handle.shutdown();
        self.handle.join().await;
        tracing::info!("evently modules stopped");
    }
}
