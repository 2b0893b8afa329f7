//! Users 模块的命令与查询
//!
use super::domain::{User, UserErrors, UserId};
use super::persistence::UserStore;
use async_trait::async_trait;
use evently_application::command::Command;
use evently_application::command_handler::CommandHandler;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::query::Query;
use evently_application::query_handler::QueryHandler;
use evently_application::validation::Validator;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Command for RegisterUser {
    const NAME: &'static str = "users.register_user";
    type Output = UserId;

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_empty("email", &self.email)
            .email("email", &self.email)
            .not_empty("first_name", &self.first_name)
            .not_empty("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl Command for UpdateProfile {
    const NAME: &'static str = "users.update_profile";
    type Output = ();

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .check(
                "user_id",
                Uuid::from(self.user_id) != Uuid::nil(),
                "must not be empty",
            )
            .not_empty("first_name", &self.first_name)
            .not_empty("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GetUser {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Query for GetUser {
    const NAME: &'static str = "users.get_user";
    type Output = UserResponse;
}

pub struct RegisterUserHandler {
    uow: UnitOfWorkFactory,
}

impl RegisterUserHandler {
    pub fn new(uow: UnitOfWorkFactory) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl CommandHandler<RegisterUser> for RegisterUserHandler {
    async fn handle(&self, ctx: &AppContext, cmd: RegisterUser) -> Result<UserId, AppError> {
        let id = UserId::generate();
        let user = User::create(id, cmd.email.trim(), cmd.first_name, cmd.last_name);

        let mut uow = self.uow.begin();
        uow.track(user);
        uow.commit(ctx).await?;

        tracing::info!(user_id = %id, "user registered");
        Ok(id)
    }
}

pub struct UpdateProfileHandler {
    store: Arc<UserStore>,
    uow: UnitOfWorkFactory,
}

impl UpdateProfileHandler {
    pub fn new(store: Arc<UserStore>, uow: UnitOfWorkFactory) -> Self {
        Self { store, uow }
    }
}

#[async_trait]
impl CommandHandler<UpdateProfile> for UpdateProfileHandler {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateProfile) -> Result<(), AppError> {
        let mut user = self
            .store
            .get(&cmd.user_id)
            .ok_or_else(|| UserErrors::not_found(cmd.user_id))?;

        user.update_profile(&cmd.first_name, &cmd.last_name);

        let mut uow = self.uow.begin();
        uow.track(user);
        uow.commit(ctx).await?;
        Ok(())
    }
}

pub struct GetUserHandler {
    store: Arc<UserStore>,
}

impl GetUserHandler {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueryHandler<GetUser> for GetUserHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetUser) -> Result<UserResponse, AppError> {
        let user = self
            .store
            .get(&q.user_id)
            .ok_or_else(|| UserErrors::not_found(q.user_id))?;

        Ok(UserResponse {
            id: q.user_id.into(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
        })
    }
}
