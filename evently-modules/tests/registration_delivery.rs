//! 注册场景中每一段只发生一次：本地分发、集成事件发布、客户创建命令

use async_trait::async_trait;
use evently_application::command_bus::CommandBus;
use evently_application::command_handler::CommandHandler;
use evently_application::config::BrokerConfig;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::event_bus::{
    Broker, ConsumerRegistry, InMemoryBroker, Message, MessageMetadata, OutboundBus,
};
use evently_application::eventing::{DomainEventHandler, LocalDispatcher};
use evently_application::persistence::{
    CommitInterceptor, SaveChangesInterceptor, UnitOfWorkFactory,
};
use evently_application::query_bus::QueryBus;
use evently_application::{InMemoryCommandBus, InMemoryQueryBus};
use evently_modules::ticketing::application::{CreateCustomer, GetCustomer, TicketingHandler};
use evently_modules::ticketing::carts::CartService;
use evently_modules::ticketing::domain::CustomerId;
use evently_modules::ticketing::persistence::TicketingStore;
use evently_modules::users::application::RegisterUser;
use evently_modules::users::domain::{UserId, UserRegistered};
use evently_modules::users::integration_events::UserRegisteredIntegrationEvent;
use evently_modules::users::persistence::UserStore;
use evently_modules::{ticketing, users};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 记录经过的每条消息后转交内存代理
struct RecordingBroker {
    inner: Arc<InMemoryBroker>,
    published: Mutex<Vec<Message>>,
}

#[async_trait]
impl Broker for RecordingBroker {
    async fn publish(&self, message: Message, metadata: MessageMetadata) -> Result<(), AppError> {
        self.published.lock().unwrap().push(message.clone());
        self.inner.publish(message, metadata).await
    }
}

#[derive(Default)]
struct RegisteredLog {
    seen: Mutex<Vec<(UserId, Uuid)>>,
}

#[async_trait]
impl DomainEventHandler<UserRegistered> for RegisteredLog {
    async fn handle(&self, _ctx: &AppContext, event: &UserRegistered) -> Result<(), AppError> {
        self.seen.lock().unwrap().push((event.user_id, event.id));
        Ok(())
    }
}

/// 记录收到的命令后交给 Ticketing 的真实处理器
struct RecordingCreateCustomer {
    inner: Arc<TicketingHandler>,
    seen: Mutex<Vec<CreateCustomer>>,
}

#[async_trait]
impl CommandHandler<CreateCustomer> for RecordingCreateCustomer {
    async fn handle(&self, ctx: &AppContext, cmd: CreateCustomer) -> Result<(), AppError> {
        self.seen.lock().unwrap().push(cmd.clone());
        CommandHandler::<CreateCustomer>::handle(self.inner.as_ref(), ctx, cmd).await
    }
}

#[tokio::test]
async fn registration_is_dispatched_published_and_consumed_exactly_once() -> anyhow::Result<()> {
    let inner = Arc::new(InMemoryBroker::new(BrokerConfig::default()));
    let broker = Arc::new(RecordingBroker {
        inner: inner.clone(),
        published: Mutex::new(Vec::new()),
    });
    let commands = Arc::new(InMemoryCommandBus::new());
    let queries = Arc::new(InMemoryQueryBus::new());

    let registered = Arc::new(RegisteredLog::default());
    let dispatcher = users::subscribe(
        LocalDispatcher::builder(),
        queries.clone(),
        OutboundBus::new(broker.clone()),
    )
    .subscribe::<UserRegistered, _>(registered.clone())
    .build();
    let commit: Arc<dyn SaveChangesInterceptor> = Arc::new(CommitInterceptor::new(dispatcher));

    let user_store = Arc::new(UserStore::new());
    users::register(
        &commands,
        &queries,
        user_store.clone(),
        UnitOfWorkFactory::new(user_store, vec![commit.clone()]),
    )?;

    let ticketing_store = Arc::new(TicketingStore::new());
    let ticketing = Arc::new(TicketingHandler::new(
        ticketing_store.clone(),
        UnitOfWorkFactory::new(ticketing_store, vec![commit]),
        Arc::new(CartService::new()),
    ));
    let create_customer = Arc::new(RecordingCreateCustomer {
        inner: ticketing.clone(),
        seen: Mutex::new(Vec::new()),
    });
    commands.register::<CreateCustomer, _>(create_customer.clone())?;
    queries.register::<GetCustomer, _>(ticketing)?;

    let registry = ticketing::consume(ConsumerRegistry::builder(), commands.clone())?.build();
    let handle = inner.start(registry)?;

    let ctx = AppContext::default();
    let user_id = commands
        .dispatch(
            &ctx,
            RegisterUser {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            },
        )
        .await?;
    inner.wait_idle().await;

    let dispatched = registered.seen.lock().unwrap().clone();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].0, user_id);

    let published = broker.published.lock().unwrap().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event_type, "users.user_registered");
    // 集成事件沿用领域事件的 id
    assert_eq!(published[0].message_id, dispatched[0].1);
    let event = published[0].decode::<UserRegisteredIntegrationEvent>()?;
    assert_eq!(event.user_id, Uuid::from(user_id));
    assert_eq!(event.email, "ada@example.com");

    let customer_id = CustomerId::from(Uuid::from(user_id));
    let handled = create_customer.seen.lock().unwrap().clone();
    assert_eq!(handled.len(), 1);
    assert_eq!(handled[0].customer_id, customer_id);
    assert_eq!(handled[0].email, "ada@example.com");
    assert_eq!(handled[0].first_name, "Ada");
    assert_eq!(handled[0].last_name, "Lovelace");

    let customer = queries.dispatch(&ctx, GetCustomer { customer_id }).await?;
    assert_eq!(customer.email, "ada@example.com");
    assert!(inner.dead_letters().is_empty());

    handle.shutdown();
    handle.join().await;
    Ok(())
}
