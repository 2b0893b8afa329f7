use chrono::Utc;
use evently_application::clock::SystemClock;
use evently_application::command_bus::CommandBus;
use evently_application::config::BrokerConfig;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::event_bus::OutboundBus;
use evently_application::query_bus::QueryBus;
use evently_modules::EventlyApp;
use evently_modules::ticketing::application::GetCustomer;
use evently_modules::ticketing::domain::CustomerId;
use evently_modules::users::application::{GetUser, RegisterUser, UpdateProfile};
use evently_modules::users::domain::UserId;
use evently_modules::users::integration_events::UserRegisteredIntegrationEvent;
use std::sync::Arc;
use uuid::Uuid;

fn start() -> anyhow::Result<EventlyApp> {
    Ok(EventlyApp::start(BrokerConfig::default(), Arc::new(SystemClock))?)
}

fn register(email: &str) -> RegisterUser {
    RegisterUser {
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

fn customer_of(user_id: UserId) -> CustomerId {
    CustomerId::from(Uuid::from(user_id))
}

#[tokio::test]
async fn registered_user_becomes_a_ticketing_customer() -> anyhow::Result<()> {
    let app = start()?;
    let ctx = AppContext::default();

    let user_id = app.commands.dispatch(&ctx, register("ada@example.com")).await?;
    app.wait_idle().await;

    let customer = app
        .queries
        .dispatch(
            &ctx,
            GetCustomer {
                customer_id: customer_of(user_id),
            },
        )
        .await?;
    assert_eq!(customer.email, "ada@example.com");
    assert_eq!(customer.first_name, "Ada");
    assert_eq!(customer.last_name, "Lovelace");
    assert!(app.broker.dead_letters().is_empty());

    app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn profile_update_reaches_the_customer_copy() -> anyhow::Result<()> {
    let app = start()?;
    let ctx = AppContext::default();

    let user_id = app.commands.dispatch(&ctx, register("ada@example.com")).await?;
    app.commands
        .dispatch(
            &ctx,
            UpdateProfile {
                user_id,
                first_name: "Augusta".to_string(),
                last_name: "King".to_string(),
            },
        )
        .await?;
    app.wait_idle().await;

    let user = app.queries.dispatch(&ctx, GetUser { user_id }).await?;
    assert_eq!(user.first_name, "Augusta");

    let customer = app
        .queries
        .dispatch(
            &ctx,
            GetCustomer {
                customer_id: customer_of(user_id),
            },
        )
        .await?;
    assert_eq!(customer.first_name, "Augusta");
    assert_eq!(customer.last_name, "King");

    app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn redelivered_registration_is_idempotent() -> anyhow::Result<()> {
    let app = start()?;
    let ctx = AppContext::default();
    let user_id = Uuid::now_v7();
    let event = UserRegisteredIntegrationEvent::new(
        Uuid::now_v7(),
        Utc::now(),
        user_id,
        "grace@example.com".to_string(),
        "Grace".to_string(),
        "Hopper".to_string(),
    );

    let outbound = OutboundBus::new(app.broker.clone());
    outbound.publish(&ctx, &event).await?;
    outbound.publish(&ctx, &event).await?;
    app.wait_idle().await;

    assert!(app.ticketing.has_customer(&CustomerId::from(user_id)));
    assert!(app.broker.dead_letters().is_empty());

    app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn invalid_registration_never_reaches_the_handler() -> anyhow::Result<()> {
    let app = start()?;
    let ctx = AppContext::default();

    let err = app
        .commands
        .dispatch(
            &ctx,
            RegisterUser {
                email: "not-an-email".to_string(),
                first_name: String::new(),
                last_name: "Lovelace".to_string(),
            },
        )
        .await
        .unwrap_err();

    match err {
        AppError::Validation(failures) => {
            assert!(failures.has_field("email"));
            assert!(failures.has_field("first_name"));
            assert!(!failures.has_field("last_name"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(app.users.count(), 0);

    app.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn updating_an_unknown_user_is_not_found() -> anyhow::Result<()> {
    let app = start()?;

    let err = app
        .commands
        .dispatch(
            &AppContext::default(),
            UpdateProfile {
                user_id: UserId::generate(),
                first_name: "Ada".to_string(),
                last_name: "King".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.domain_error().map(|e| e.code()), Some("Users.NotFound"));

    app.shutdown().await;
    Ok(())
}
