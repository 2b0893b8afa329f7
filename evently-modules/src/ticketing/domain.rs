use evently_domain::entity::EventBuffer;
use evently_domain::error::DomainError;
use evently_domain::value_object::Money;
use evently_macros::{entity, entity_id, value_object};
use uuid::Uuid;

/// 与 Users 模块的用户 id 取值相同，但类型独立
#[entity_id]
pub struct CustomerId(Uuid);

/// 客户：Users 模块用户数据在本模块内的副本
#[entity(id = CustomerId)]
pub struct Customer {
    email: String,
    first_name: String,
    last_name: String,
}

impl Customer {
    pub fn create(
        id: CustomerId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain_events: EventBuffer::new(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn update(&mut self, first_name: impl Into<String>, last_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
    }
}

#[value_object]
pub struct CartItem {
    pub ticket_type_id: Uuid,
    pub quantity: u32,
    pub unit_price: Money,
}

#[value_object]
pub struct Cart {
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            items: Vec::new(),
        }
    }

    /// 按单价 × 数量累加（最小货币单位），溢出时饱和
    pub fn total_minor(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.unit_price.times(item.quantity).amount_minor())
            .fold(0i64, i64::saturating_add)
    }
}

pub struct CustomerErrors;

impl CustomerErrors {
    pub fn not_found(customer_id: CustomerId) -> DomainError {
        DomainError::not_found(
            "Customers.NotFound",
            format!("The customer with the identifier {customer_id} was not found"),
        )
    }
}
