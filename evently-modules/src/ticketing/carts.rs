use super::domain::{Cart, CartItem, CustomerId};
use dashmap::DashMap;
use evently_domain::value_object::Money;
use uuid::Uuid;

/// 购物车服务：每个客户一个购物车，只保存在内存中
#[derive(Default)]
pub struct CartService {
    carts: DashMap<CustomerId, Cart>,
}

impl CartService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不存在时返回空购物车
    pub fn get(&self, customer_id: CustomerId) -> Cart {
        self.carts
            .get(&customer_id)
            .map(|cart| cart.value().clone())
            .unwrap_or_else(|| Cart::empty(customer_id))
    }

    pub fn clear(&self, customer_id: CustomerId) {
        self.carts.remove(&customer_id);
    }

    /// 同一票种合并数量，单价以最近一次为准
    pub fn add_item(&self, customer_id: CustomerId, item: CartItem) {
        let mut cart = self
            .carts
            .entry(customer_id)
            .or_insert_with(|| Cart::empty(customer_id));

        match cart
            .items
            .iter()
            .position(|existing| existing.ticket_type_id == item.ticket_type_id)
        {
            Some(index) => {
                let existing = &mut cart.items[index];
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.unit_price = item.unit_price;
            }
            None => cart.items.push(item),
        }
    }

    /// 票种不在购物车中时什么也不做
    pub fn remove_item(&self, customer_id: CustomerId, ticket_type_id: Uuid) {
        if let Some(mut cart) = self.carts.get_mut(&customer_id) {
            cart.items.retain(|item| item.ticket_type_id != ticket_type_id);
        }
    }

    /// 刷新所有购物车中该票种的单价，返回受影响的条目数
    pub fn reprice(&self, ticket_type_id: Uuid, price: &Money) -> usize {
        let mut updated = 0;
        for mut cart in self.carts.iter_mut() {
            for item in cart.items.iter_mut() {
                if item.ticket_type_id == ticket_type_id && item.unit_price != *price {
                    item.unit_price = price.clone();
                    updated += 1;
                }
            }
        }
        updated
    }
}
