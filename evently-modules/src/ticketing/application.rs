//! Ticketing 模块的命令与查询
//!
//! 客户命令会开启工作单元；购物车命令只操作 `CartService`。
//!
use super::carts::CartService;
use super::domain::{Cart, CartItem, Customer, CustomerErrors, CustomerId};
use super::persistence::TicketingStore;
use async_trait::async_trait;
use evently_application::command::Command;
use evently_application::command_handler::CommandHandler;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::persistence::UnitOfWorkFactory;
use evently_application::query::Query;
use evently_application::query_handler::QueryHandler;
use evently_application::validation::Validator;
use evently_domain::value_object::Money;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// 创建客户；同 id 的客户已存在时视为成功（重复投递安全）
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub customer_id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Command for CreateCustomer {
    const NAME: &'static str = "ticketing.create_customer";
    type Output = ();

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_empty("email", &self.email)
            .not_empty("first_name", &self.first_name)
            .not_empty("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
}

impl Command for UpdateCustomer {
    const NAME: &'static str = "ticketing.update_customer";
    type Output = ();

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_empty("first_name", &self.first_name)
            .not_empty("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AddItemToCart {
    pub customer_id: CustomerId,
    pub ticket_type_id: Uuid,
    pub quantity: u32,
    pub unit_price_minor: i64,
    pub currency: String,
}

impl Command for AddItemToCart {
    const NAME: &'static str = "ticketing.add_item_to_cart";
    type Output = ();

    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .check("quantity", self.quantity > 0, "must be greater than zero")
            .check(
                "unit_price_minor",
                self.unit_price_minor >= 0,
                "must not be negative",
            )
            .not_empty("currency", &self.currency)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RemoveItemFromCart {
    pub customer_id: CustomerId,
    pub ticket_type_id: Uuid,
}

impl Command for RemoveItemFromCart {
    const NAME: &'static str = "ticketing.remove_item_from_cart";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct ClearCart {
    pub customer_id: CustomerId,
}

impl Command for ClearCart {
    const NAME: &'static str = "ticketing.clear_cart";
    type Output = ();
}

/// 票价变化后刷新购物车单价，返回受影响的条目数
#[derive(Debug, Clone)]
pub struct RepriceCartItems {
    pub ticket_type_id: Uuid,
    pub price_minor: i64,
    pub currency: String,
}

impl Command for RepriceCartItems {
    const NAME: &'static str = "ticketing.reprice_cart_items";
    type Output = usize;
}

#[derive(Debug, Clone)]
pub struct GetCustomer {
    pub customer_id: CustomerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Query for GetCustomer {
    const NAME: &'static str = "ticketing.get_customer";
    type Output = CustomerResponse;
}

#[derive(Debug, Clone)]
pub struct GetCart {
    pub customer_id: CustomerId,
}

impl Query for GetCart {
    const NAME: &'static str = "ticketing.get_cart";
    type Output = Cart;
}

pub struct TicketingHandler {
    store: Arc<TicketingStore>,
    uow: UnitOfWorkFactory,
    carts: Arc<CartService>,
}

impl TicketingHandler {
    pub fn new(store: Arc<TicketingStore>, uow: UnitOfWorkFactory, carts: Arc<CartService>) -> Self {
        Self { store, uow, carts }
    }

    fn ensure_customer(&self, id: CustomerId) -> Result<(), AppError> {
        if self.store.has_customer(&id) {
            Ok(())
        } else {
            Err(CustomerErrors::not_found(id).into())
        }
    }
}

#[async_trait]
impl CommandHandler<CreateCustomer> for TicketingHandler {
    async fn handle(&self, ctx: &AppContext, cmd: CreateCustomer) -> Result<(), AppError> {
        if self.store.has_customer(&cmd.customer_id) {
            tracing::debug!(customer_id = %cmd.customer_id, "customer already exists");
            return Ok(());
        }

        let customer = Customer::create(cmd.customer_id, cmd.email, cmd.first_name, cmd.last_name);
        let mut uow = self.uow.begin();
        uow.track(customer);
        uow.commit(ctx).await?;

        tracing::info!(customer_id = %cmd.customer_id, "customer created");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<UpdateCustomer> for TicketingHandler {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateCustomer) -> Result<(), AppError> {
        let mut customer = self
            .store
            .customer(&cmd.customer_id)
            .ok_or_else(|| CustomerErrors::not_found(cmd.customer_id))?;

        customer.update(cmd.first_name, cmd.last_name);

        let mut uow = self.uow.begin();
        uow.track(customer);
        uow.commit(ctx).await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<AddItemToCart> for TicketingHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: AddItemToCart) -> Result<(), AppError> {
        self.ensure_customer(cmd.customer_id)?;
        let unit_price = Money::new(cmd.unit_price_minor, cmd.currency)?;

        self.carts.add_item(
            cmd.customer_id,
            CartItem {
                ticket_type_id: cmd.ticket_type_id,
                quantity: cmd.quantity,
                unit_price,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<RemoveItemFromCart> for TicketingHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: RemoveItemFromCart) -> Result<(), AppError> {
        self.ensure_customer(cmd.customer_id)?;
        self.carts.remove_item(cmd.customer_id, cmd.ticket_type_id);
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<ClearCart> for TicketingHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: ClearCart) -> Result<(), AppError> {
        self.ensure_customer(cmd.customer_id)?;
        self.carts.clear(cmd.customer_id);
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<RepriceCartItems> for TicketingHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: RepriceCartItems) -> Result<usize, AppError> {
        let price = Money::new(cmd.price_minor, cmd.currency)?;
        let updated = self.carts.reprice(cmd.ticket_type_id, &price);
        tracing::debug!(ticket_type_id = %cmd.ticket_type_id, updated, "cart items repriced");
        Ok(updated)
    }
}

#[async_trait]
impl QueryHandler<GetCustomer> for TicketingHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetCustomer,
    ) -> Result<CustomerResponse, AppError> {
        let customer = self
            .store
            .customer(&q.customer_id)
            .ok_or_else(|| CustomerErrors::not_found(q.customer_id))?;

        Ok(CustomerResponse {
            id: q.customer_id,
            email: customer.email().to_string(),
            first_name: customer.first_name().to_string(),
            last_name: customer.last_name().to_string(),
        })
    }
}

#[async_trait]
impl QueryHandler<GetCart> for TicketingHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetCart) -> Result<Cart, AppError> {
        self.ensure_customer(q.customer_id)?;
        Ok(self.carts.get(q.customer_id))
    }
}
