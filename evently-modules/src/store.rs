//! 模块内存存储的公共表结构
//!
//! 每个模块的 `DataStore` 由若干张 `InMemoryTable` 组成。写入分两步：
//! 先把工作单元中的实体全部暂存（克隆并清空事件缓冲区），确认无误后再
//! 一次性落表，因此单次 `write` 要么全部可见，要么全部不可见。
//!
use dashmap::DashMap;
use evently_domain::entity::{Entity, TrackedEntity};
use std::hash::Hash;

pub struct InMemoryTable<E>
where
    E: Entity + Clone,
    E::Id: Eq + Hash,
{
    rows: DashMap<E::Id, E>,
}

impl<E> Default for InMemoryTable<E>
where
    E: Entity + Clone,
    E::Id: Eq + Hash,
{
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }
}

impl<E> InMemoryTable<E>
where
    E: Entity + Clone,
    E::Id: Eq + Hash,
{
    /// 读取快照（克隆），调用方修改后需重新纳入工作单元
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.get(id).map(|row| row.value().clone())
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.rows.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 找出追踪列表中属于本表的实体
    ///
    /// 存储的副本不携带事件：事件只属于本次提交，由提交拦截器收割。
    pub fn stage(&self, entities: &[Box<dyn TrackedEntity>]) -> Vec<E> {
        entities
            .iter()
            .filter_map(|entity| entity.downcast_ref::<E>())
            .map(|entity| {
                let mut row = entity.clone();
                row.clear_domain_events();
                row
            })
            .collect()
    }

    pub fn apply(&self, rows: Vec<E>) {
        for row in rows {
            self.rows.insert(row.id().clone(), row);
        }
    }

    /// 按条件扫描全部行
    pub fn find<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.rows
            .iter()
            .filter(|row| predicate(row.value()))
            .map(|row| row.value().clone())
            .collect()
    }
}
