use super::domain::{Customer, CustomerId};
use crate::store::InMemoryTable;
use async_trait::async_trait;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::DataStore;
use evently_domain::entity::TrackedEntity;

#[derive(Default)]
pub struct TicketingStore {
    customers: InMemoryTable<Customer>,
}

impl TicketingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(&self, id: &CustomerId) -> Option<Customer> {
        self.customers.get(id)
    }

    pub fn has_customer(&self, id: &CustomerId) -> bool {
        self.customers.contains(id)
    }
}

#[async_trait]
impl DataStore for TicketingStore {
    async fn write(
        &self,
        _ctx: &AppContext,
        entities: &[Box<dyn TrackedEntity>],
    ) -> Result<usize, AppError> {
        let customers = self.customers.stage(entities);
        let written = customers.len();
        self.customers.apply(customers);
        Ok(written)
    }
}
