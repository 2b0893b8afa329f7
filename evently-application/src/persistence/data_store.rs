use crate::context::AppContext;
use crate::error::AppError;
use async_trait::async_trait;
use evently_domain::entity::TrackedEntity;

/// 持久化协作方
///
/// 以一次调用原子地写入工作单元追踪的全部实体，返回写入条数。
/// 实现方通过 `TrackedEntity::downcast_ref` 还原出自己关心的实体类型。
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn write(
        &self,
        ctx: &AppContext,
        entities: &[Box<dyn TrackedEntity>],
    ) -> Result<usize, AppError>;
}
