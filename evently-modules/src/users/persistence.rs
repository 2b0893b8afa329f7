use super::domain::{User, UserId};
use crate::store::InMemoryTable;
use async_trait::async_trait;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::DataStore;
use evently_domain::entity::TrackedEntity;

/// Users 模块的内存存储
#[derive(Default)]
pub struct UserStore {
    users: InMemoryTable<User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users.get(id)
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl DataStore for UserStore {
    async fn write(
        &self,
        _ctx: &AppContext,
        entities: &[Box<dyn TrackedEntity>],
    ) -> Result<usize, AppError> {
        let users = self.users.stage(entities);
        let written = users.len();
        self.users.apply(users);
        Ok(written)
    }
}
