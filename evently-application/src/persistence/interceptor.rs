use super::change_tracker::ChangeTracker;
use crate::context::AppContext;
use crate::error::AppError;
use crate::eventing::LocalDispatcher;
use async_trait::async_trait;

/// 提交钩子：在存储写入成功之后、`commit` 返回之前调用
#[async_trait]
pub trait SaveChangesInterceptor: Send + Sync {
    async fn saved_changes(
        &self,
        ctx: &AppContext,
        tracker: &mut ChangeTracker,
    ) -> Result<(), AppError>;
}

/// 发布领域事件的提交拦截器
///
/// 按追踪顺序收割全部实体的事件（收割即清空），然后逐个交给本地分发器，
/// 每个事件处理完毕才处理下一个。某个事件分发失败时，已写入的数据不回滚，
/// 剩余事件不再分发，错误返回给 `commit` 的调用方。
pub struct CommitInterceptor {
    dispatcher: LocalDispatcher,
}

impl CommitInterceptor {
    pub fn new(dispatcher: LocalDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl SaveChangesInterceptor for CommitInterceptor {
    async fn saved_changes(
        &self,
        ctx: &AppContext,
        tracker: &mut ChangeTracker,
    ) -> Result<(), AppError> {
        let harvested = tracker.harvest();
        if harvested.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = harvested.len(), "publishing domain events");

        for (index, item) in harvested.iter().enumerate() {
            let event = &*item.event;
            if let Err(err) = self.dispatcher.dispatch(ctx, event).await {
                tracing::error!(
                    event_type = event.event_type(),
                    event_id = %event.event_id(),
                    aggregate_type = item.aggregate_type,
                    aggregate_id = %item.aggregate_id,
                    undispatched = harvested.len() - index - 1,
                    error = %err,
                    "domain event dispatch failed after commit"
                );
                return Err(err);
            }
        }

        Ok(())
    }
}
