//! 值对象（Value Object）
//!
//! 以属性而非身份区分的不可变对象。字段组合本身即相等性依据。
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait ValueObject: Clone + PartialEq + Eq {
    /// 校验内部约束，违反时返回 `Validation` 错误
    fn validate(&self) -> DomainResult<()>;
}

/// 金额：以最小货币单位（如分）存储，避免浮点误差
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount_minor: i64,
    currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> DomainResult<Self> {
        let money = Self {
            amount_minor,
            currency: currency.into().trim().to_ascii_uppercase(),
        };
        money.validate()?;
        Ok(money)
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// 同币种下按数量相乘
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount_minor: self.amount_minor.saturating_mul(i64::from(quantity)),
            currency: self.currency.clone(),
        }
    }
}

impl ValueObject for Money {
    fn validate(&self) -> DomainResult<()> {
        if self.amount_minor < 0 {
            return Err(DomainError::validation(
                "Money.Negative",
                "amount must not be negative",
            ));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(
                "Money.InvalidCurrency",
                format!("invalid currency code: {:?}", self.currency),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.amount_minor / 100,
            self.amount_minor % 100,
            self.currency
        )
    }
}
