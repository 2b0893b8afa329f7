use chrono::{DateTime, Duration, TimeZone, Utc};
use evently_application::clock::FixedClock;
use evently_application::command_bus::CommandBus;
use evently_application::config::BrokerConfig;
use evently_application::context::AppContext;
use evently_application::query_bus::QueryBus;
use evently_modules::EventlyApp;
use evently_modules::events::application::{
    CompleteEvent, CreateEvent, CreateTicketType, GetEvent, PublishEvent, UpdateTicketTypePrice,
};
use evently_modules::events::domain::{EventId, TicketTypeId};
use evently_modules::ticketing::application::{AddItemToCart, GetCart};
use evently_modules::ticketing::domain::CustomerId;
use evently_modules::users::application::RegisterUser;
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    app: EventlyApp,
    clock: Arc<FixedClock>,
    ctx: AppContext,
    starts_at: DateTime<Utc>,
    event_id: EventId,
    ticket_type_id: TicketTypeId,
    customer_id: CustomerId,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
}

/// 已发布的活动（72 小时后开始）、一个票种，以及购物车里有 2 张票的客户
async fn fixture() -> anyhow::Result<Fixture> {
    let clock = Arc::new(FixedClock::new(now()));
    let app = EventlyApp::start(BrokerConfig::default(), clock.clone())?;
    let ctx = AppContext::default();
    let starts_at = now() + Duration::hours(72);

    let event_id = app
        .commands
        .dispatch(
            &ctx,
            CreateEvent {
                title: "RustConf".to_string(),
                starts_at_utc: starts_at,
                ends_at_utc: starts_at + Duration::hours(8),
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
                name: "General".to_string(),
                price_minor: 2500,
                currency: "usd".to_string(),
                quantity: 100,
            },
        )
        .await?;

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
    app.commands
        .dispatch(
            &ctx,
            AddItemToCart {
                customer_id,
                ticket_type_id: ticket_type_id.into(),
                quantity: 2,
                unit_price_minor: 2500,
                currency: "USD".to_string(),
            },
        )
        .await?;

    Ok(Fixture {
        app,
        clock,
        ctx,
        starts_at,
        event_id,
        ticket_type_id,
        customer_id,
    })
}

impl Fixture {
    async fn stored_price(&self) -> anyhow::Result<i64> {
        let event = self
            .app
            .queries
            .dispatch(
                &self.ctx,
                GetEvent {
                    event_id: self.event_id,
                },
            )
            .await?;
        Ok(event.ticket_types[0].price_minor)
    }

    async fn cart_unit_price(&self) -> anyhow::Result<i64> {
        self.app.wait_idle().await;
        let cart = self
            .app
            .queries
            .dispatch(
                &self.ctx,
                GetCart {
                    customer_id: self.customer_id,
                },
            )
            .await?;
        Ok(cart.items[0].unit_price.amount_minor())
    }

    async fn update_price(&self, price_minor: i64) -> Result<(), evently_application::error::AppError> {
        self.app
            .commands
            .dispatch(
                &self.ctx,
                UpdateTicketTypePrice {
                    ticket_type_id: self.ticket_type_id,
                    price_minor,
                },
            )
            .await
    }
}

#[tokio::test]
async fn price_change_reprices_carts_in_ticketing() -> anyhow::Result<()> {
    let fx = fixture().await?;

    fx.update_price(3000).await?;

    assert_eq!(fx.stored_price().await?, 3000);
    assert_eq!(fx.cart_unit_price().await?, 3000);
    assert!(fx.app.broker.dead_letters().is_empty());

    fx.app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn same_price_fails_and_changes_nothing() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let err = fx.update_price(2500).await.unwrap_err();

    assert_eq!(
        err.domain_error().map(|e| e.code()),
        Some("TicketTypes.SamePrice")
    );
    assert_eq!(fx.stored_price().await?, 2500);
    assert_eq!(fx.cart_unit_price().await?, 2500);

    fx.app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn change_within_24_hours_fails_without_publishing() -> anyhow::Result<()> {
    let fx = fixture().await?;
    fx.clock.set(fx.starts_at - Duration::hours(23));

    let err = fx.update_price(3500).await.unwrap_err();

    assert_eq!(
        err.domain_error().map(|e| e.code()),
        Some("TicketTypes.CannotChangePriceWithin24Hours")
    );
    assert_eq!(fx.stored_price().await?, 2500);
    // 若有事件发出，购物车单价会被刷新为 3500
    assert_eq!(fx.cart_unit_price().await?, 2500);

    fx.app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn completed_event_price_is_frozen() -> anyhow::Result<()> {
    let fx = fixture().await?;
    fx.app
        .commands
        .dispatch(
            &fx.ctx,
            CompleteEvent {
                event_id: fx.event_id,
            },
        )
        .await?;

    let err = fx.update_price(3000).await.unwrap_err();

    assert_eq!(
        err.domain_error().map(|e| e.code()),
        Some("TicketTypes.CannotChangePriceAfterEventCompleted")
    );
    assert_eq!(fx.cart_unit_price().await?, 2500);

    fx.app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn unknown_ticket_type_is_not_found() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let err = fx
        .app
        .commands
        .dispatch(
            &fx.ctx,
            UpdateTicketTypePrice {
                ticket_type_id: TicketTypeId::generate(),
                price_minor: 100,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.domain_error().map(|e| e.code()),
        Some("TicketTypes.NotFound")
    );

    fx.app.shutdown().await;
    Ok(())
}
