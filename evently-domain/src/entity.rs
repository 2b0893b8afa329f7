//! 实体（Entity）与事件缓冲区（EventBuffer）
//!
//! 实体在一次工作单元内通过自身的业务方法产生领域事件，事件按产生顺序
//! 追加到实体私有的 `EventBuffer` 中；提交成功后由提交拦截器一次性取出并清空。
//!
//! `#[entity]` 宏会注入私有的 `domain_events` 字段，并生成模块私有的
//! `raise` 方法，因此外部调用方只能读取或清空缓冲区，无法伪造事件。
//!
use crate::domain_event::DomainEvent;
use std::any::Any;
use std::fmt::{self, Display};
use std::sync::Arc;

/// 实体私有的待发布事件队列（追加有序，直到被收割）
///
/// 克隆得到的是空缓冲区：事件只属于产生它的那个实例，
/// 实体副本被追踪提交时不会重复分发。
#[derive(Default)]
pub struct EventBuffer {
    events: Vec<Arc<dyn DomainEvent>>,
}

impl Clone for EventBuffer {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加事件到队尾
    pub fn raise<E: DomainEvent>(&mut self, event: E) {
        self.events.push(Arc::new(event));
    }

    /// 按产生顺序返回全部事件，不改变缓冲区
    pub fn peek_all(&self) -> &[Arc<dyn DomainEvent>] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Debug for EventBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.events.iter().map(|e| e.event_type()))
            .finish()
    }
}

/// 可承载领域事件的实体
pub trait Entity: Send + Sync + 'static {
    /// 实体标识类型
    type Id: Clone + Display + Send + Sync;

    /// 实体类型名（日志中用于定位来源聚合）
    const TYPE: &'static str;

    fn id(&self) -> &Self::Id;

    /// 当前待发布事件（只读视图）
    fn domain_events(&self) -> &EventBuffer;

    fn clear_domain_events(&mut self);
}

/// 类型擦除后的实体视图，供变更追踪器与提交拦截器统一处理不同类型的实体
pub trait TrackedEntity: Send + Sync + 'static {
    fn entity_type(&self) -> &'static str;

    fn entity_id(&self) -> String;

    fn peek_events(&self) -> &[Arc<dyn DomainEvent>];

    fn clear_events(&mut self);

    fn as_any(&self) -> &dyn Any;
}

impl<E: Entity> TrackedEntity for E {
    fn entity_type(&self) -> &'static str {
        E::TYPE
    }

    fn entity_id(&self) -> String {
        self.id().to_string()
    }

    fn peek_events(&self) -> &[Arc<dyn DomainEvent>] {
        self.domain_events().peek_all()
    }

    fn clear_events(&mut self) {
        self.clear_domain_events();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn TrackedEntity {
    /// 还原为具体实体类型
    pub fn downcast_ref<E: Entity>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainError, DomainResult};
    use evently_macros::{domain_event, entity};

    #[domain_event]
    struct Incremented {
        pub by: u32,
    }

    #[domain_event]
    struct Reset {}

    #[entity(id = u64)]
    struct Counter {
        value: u32,
    }

    impl Counter {
        fn create(id: u64) -> Self {
            Self {
                id,
                value: 0,
                domain_events: EventBuffer::new(),
            }
        }

        fn increment(&mut self, by: u32) -> DomainResult<()> {
            if by == 0 {
                return Err(DomainError::validation("Counter.Zero", "by must be > 0"));
            }
            self.value += by;
            self.raise(Incremented::new(by));
            Ok(())
        }

        fn reset(&mut self) {
            self.value = 0;
            self.raise(Reset::new());
        }
    }

    #[test]
    fn buffer_preserves_raise_order() {
        let mut counter = Counter::create(1);
        for by in 1..=5 {
            counter.increment(by).unwrap();
        }
        counter.reset();

        let events = counter.domain_events().peek_all();
        assert_eq!(events.len(), 6);
        let amounts: Vec<u32> = events
            .iter()
            .filter_map(|e| e.downcast_ref::<Incremented>().map(|i| i.by))
            .collect();
        assert_eq!(amounts, vec![1, 2, 3, 4, 5]);
        assert!(events[5].is::<Reset>());
    }

    #[test]
    fn peek_is_not_destructive_and_clear_empties() {
        let mut counter = Counter::create(2);
        counter.increment(3).unwrap();

        assert_eq!(counter.domain_events().len(), 1);
        assert_eq!(counter.domain_events().len(), 1);

        counter.clear_domain_events();
        assert!(counter.domain_events().is_empty());
        assert_eq!(counter.value, 3);
    }

    #[test]
    fn rejected_mutation_raises_nothing() {
        let mut counter = Counter::create(3);
        let err = counter.increment(0).unwrap_err();
        assert_eq!(err.code(), "Counter.Zero");
        assert!(counter.domain_events().is_empty());
    }

    #[test]
    fn cloned_entity_does_not_carry_pending_events() {
        let mut counter = Counter::create(5);
        counter.increment(2).unwrap();

        let copy = counter.clone();
        assert_eq!(copy.value, 2);
        assert!(copy.domain_events().is_empty());
        assert_eq!(counter.domain_events().len(), 1);
    }

    #[test]
    fn tracked_view_erases_type() {
        let mut counter = Counter::create(42);
        counter.increment(1).unwrap();

        let tracked: &mut dyn TrackedEntity = &mut counter;
        assert_eq!(tracked.entity_type(), "counter");
        assert_eq!(tracked.entity_id(), "42");
        assert_eq!(tracked.peek_events().len(), 1);
        tracked.clear_events();
        assert!(tracked.peek_events().is_empty());
        assert!(tracked.downcast_ref::<Counter>().is_some());
    }
}
