//! 演示：加载配置、初始化日志、装配全部模块并走通注册与调价流程
//!
//! 配置目录默认为 `demo/config`，可通过 `EVENTLY_CONFIG_DIR` 覆盖；
//! 运行环境默认 `Development`，可通过 `EVENTLY_ENVIRONMENT` 覆盖。
//!
use chrono::{Duration, Utc};
use evently_application::clock::SystemClock;
use evently_application::command_bus::CommandBus;
use evently_application::config::ConfigLoader;
use evently_application::context::AppContext;
use evently_application::query_bus::QueryBus;
use evently_modules::EventlyApp;
use evently_modules::events::{
    self,
    application::{CreateEvent, CreateTicketType, GetEvent, PublishEvent, UpdateTicketTypePrice},
};
use evently_modules::ticketing::{
    self,
    application::{AddItemToCart, GetCart, GetCustomer},
    domain::CustomerId,
};
use evently_modules::users::{
    self,
    application::{RegisterUser, UpdateProfile},
};
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TicketingSettings {
    default_currency: String,
}

impl Default for TicketingSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = env::var("EVENTLY_CONFIG_DIR")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/config").to_string());
    let environment = env::var("EVENTLY_ENVIRONMENT").unwrap_or_else(|_| "Development".into());

    let config = ConfigLoader::new(config_dir)
        .environment(environment)
        .modules([users::MODULE_NAME, events::MODULE_NAME, ticketing::MODULE_NAME])
        .load()?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings: TicketingSettings = config.module(ticketing::MODULE_NAME)?;
    tracing::info!(?settings, broker = ?config.broker, "configuration loaded");

    let app = EventlyApp::start(config.broker.clone(), Arc::new(SystemClock))?;
    let ctx = AppContext::builder().actor("demo".to_string()).build();

    // Users → Ticketing：注册用户后，客户副本由消费者创建
    let user_id = app
        .commands
        .dispatch(
            &ctx,
            RegisterUser {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            },
        )
        .await?;
    app.wait_idle().await;

    let customer_id = CustomerId::from(Uuid::from(user_id));
    let customer = app.queries.dispatch(&ctx, GetCustomer { customer_id }).await?;
    tracing::info!(?customer, "customer replicated");

    app.commands
        .dispatch(
            &ctx,
            UpdateProfile {
                user_id,
                first_name: "Augusta Ada".to_string(),
                last_name: "King".to_string(),
            },
        )
        .await?;

    // Events → Ticketing：调价后刷新购物车单价
    let starts_at = Utc::now() + Duration::days(7);
    let event_id = app
        .commands
        .dispatch(
            &ctx,
            CreateEvent {
                title: "Evently Live".to_string(),
                starts_at_utc: starts_at,
                ends_at_utc: starts_at + Duration::hours(6),
            },
        )
        .await?;
    app.commands.dispatch(&ctx, PublishEvent { event_id }).await?;
    let ticket_type_id = app
        .commands
        .dispatch(
            &ctx,
            CreateTicketType {
                event_id,
                name: "General admission".to_string(),
                price_minor: 4_500,
                currency: settings.default_currency.clone(),
                quantity: 500,
            },
        )
        .await?;

    app.commands
        .dispatch(
            &ctx,
            AddItemToCart {
                customer_id,
                ticket_type_id: ticket_type_id.into(),
                quantity: 2,
                unit_price_minor: 4_500,
                currency: settings.default_currency.clone(),
            },
        )
        .await?;

    app.commands
        .dispatch(
            &ctx,
            UpdateTicketTypePrice {
                ticket_type_id,
                price_minor: 5_000,
            },
        )
        .await?;

    // 价格未变：业务规则拒绝，不会产生任何事件
    if let Err(err) = app
        .commands
        .dispatch(
            &ctx,
            UpdateTicketTypePrice {
                ticket_type_id,
                price_minor: 5_000,
            },
        )
        .await
    {
        tracing::warn!(error = %err, "price update rejected");
    }

    app.wait_idle().await;

    let event = app.queries.dispatch(&ctx, GetEvent { event_id }).await?;
    let customer = app.queries.dispatch(&ctx, GetCustomer { customer_id }).await?;
    let cart = app.queries.dispatch(&ctx, GetCart { customer_id }).await?;
    tracing::info!(?event, "event");
    tracing::info!(?customer, "customer");
    tracing::info!(total_minor = cart.total_minor(), items = cart.items.len(), "cart");

    let dead_letters = app.broker.dead_letters();
    if !dead_letters.is_empty() {
        tracing::error!(count = dead_letters.len(), "undelivered messages");
    }

    app.shutdown().await;
    Ok(())
}
