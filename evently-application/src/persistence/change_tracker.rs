use evently_domain::domain_event::DomainEvent;
use evently_domain::entity::{Entity, TrackedEntity};
use std::sync::Arc;

/// 收割出的事件及其来源聚合
#[derive(Debug, Clone)]
pub struct HarvestedEvent {
    pub event: Arc<dyn DomainEvent>,
    pub aggregate_type: &'static str,
    pub aggregate_id: String,
}

/// 变更追踪器：按追踪顺序保存工作单元内的实体
#[derive(Default)]
pub struct ChangeTracker {
    entries: Vec<Box<dyn TrackedEntity>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<E: Entity>(&mut self, entity: E) {
        self.entries.push(Box::new(entity));
    }

    pub fn entries(&self) -> &[Box<dyn TrackedEntity>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 尚未收割的事件总数
    pub fn pending_events(&self) -> usize {
        self.entries.iter().map(|e| e.peek_events().len()).sum()
    }

    /// 按追踪顺序逐个实体读取并清空事件缓冲区
    ///
    /// 结果保持实体内的产生顺序与实体间的追踪顺序；再次调用返回空列表。
    pub fn harvest(&mut self) -> Vec<HarvestedEvent> {
        let mut harvested = Vec::with_capacity(self.pending_events());

        for entry in &mut self.entries {
            let aggregate_type = entry.entity_type();
            let aggregate_id = entry.entity_id();
            harvested.extend(entry.peek_events().iter().map(|event| HarvestedEvent {
                event: event.clone(),
                aggregate_type,
                aggregate_id: aggregate_id.clone(),
            }));
            entry.clear_events();
        }

        harvested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evently_domain::entity::EventBuffer;
    use evently_macros::{domain_event, entity};

    #[domain_event]
    struct Tick {
        pub n: u32,
    }

    #[entity(id = u32)]
    struct Clock {}

    impl Clock {
        fn with_ticks(id: u32, ticks: &[u32]) -> Self {
            let mut clock = Self {
                id,
                domain_events: EventBuffer::new(),
            };
            for n in ticks {
                clock.raise(Tick::new(*n));
            }
            clock
        }
    }

    #[test]
    fn harvest_keeps_per_entity_and_tracking_order_then_clears() {
        let mut tracker = ChangeTracker::new();
        tracker.track(Clock::with_ticks(2, &[1, 2, 3]));
        tracker.track(Clock::with_ticks(1, &[10, 20]));
        tracker.track(Clock::with_ticks(3, &[]));
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.pending_events(), 5);

        let harvested = tracker.harvest();
        let seen: Vec<(String, u32)> = harvested
            .iter()
            .map(|h| {
                let tick = h.event.downcast_ref::<Tick>().unwrap();
                (h.aggregate_id.clone(), tick.n)
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                ("2".to_string(), 1),
                ("2".to_string(), 2),
                ("2".to_string(), 3),
                ("1".to_string(), 10),
                ("1".to_string(), 20),
            ]
        );
        assert!(harvested.iter().all(|h| h.aggregate_type == "clock"));

        assert_eq!(tracker.pending_events(), 0);
        assert!(tracker.harvest().is_empty());
    }
}
