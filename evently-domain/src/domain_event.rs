//! 领域事件（Domain Event）
//!
//! 由聚合的业务方法在状态变更时产生的不可变事实，只在同一进程内消费。
//! 通常通过 `#[domain_event]` 宏定义，宏会注入 `id`（UUID v7）与
//! `occurred_on_utc` 字段并生成构造函数。
//!
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// 领域事件需要满足的最小能力边界
///
/// 本地分发器按具体类型路由事件，因此实现者必须通过 `as_any`
/// 暴露自身，以便在注册时解析出的 `TypeId` 与分发时一致。
pub trait DomainEvent: fmt::Debug + Send + Sync + 'static {
    /// 事件唯一标识
    fn event_id(&self) -> Uuid;

    /// 事件发生时间（UTC）
    fn occurred_on_utc(&self) -> DateTime<Utc>;

    /// 事件类型名，用于日志与排障
    fn event_type(&self) -> &'static str;

    /// 以 `Any` 暴露具体类型
    fn as_any(&self) -> &dyn Any;
}

impl dyn DomainEvent {
    /// 判断事件的具体类型是否为 `E`
    pub fn is<E: DomainEvent>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// 还原为具体事件类型
    pub fn downcast_ref<E: DomainEvent>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

#[cfg(test)]
mod tests {
    use super::DomainEvent;
    use evently_macros::domain_event;
    use uuid::Uuid;

    #[domain_event(event_type = "tests.price_changed")]
    struct PriceChanged {
        pub amount: i64,
    }

    #[domain_event]
    struct Renamed {
        pub name: String,
    }

    #[test]
    fn macro_injects_identity_and_timestamp() {
        let a = PriceChanged::new(10);
        let b = PriceChanged::new(10);
        assert_ne!(a.event_id(), b.event_id());
        assert_ne!(a.id, Uuid::nil());
        assert_eq!(a.amount, 10);
        assert_eq!(a.event_type(), "tests.price_changed");
        assert_eq!(Renamed::new("x".into()).event_type(), "Renamed");
    }

    #[test]
    fn downcast_matches_only_concrete_type() {
        let event: Box<dyn DomainEvent> = Box::new(PriceChanged::new(5));
        assert!(event.is::<PriceChanged>());
        assert!(!event.is::<Renamed>());
        assert_eq!(event.downcast_ref::<PriceChanged>().map(|e| e.amount), Some(5));
        assert!(event.downcast_ref::<Renamed>().is_none());
    }
}
