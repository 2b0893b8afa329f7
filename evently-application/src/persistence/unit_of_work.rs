use super::change_tracker::ChangeTracker;
use super::data_store::DataStore;
use super::interceptor::SaveChangesInterceptor;
use crate::context::AppContext;
use crate::error::AppError;
use evently_domain::entity::Entity;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Open,
    Committed,
    Discarded,
}

/// 工作单元工厂：每个模块持有一个，绑定本模块的存储与公共拦截器
#[derive(Clone)]
pub struct UnitOfWorkFactory {
    store: Arc<dyn DataStore>,
    interceptors: Arc<[Arc<dyn SaveChangesInterceptor>]>,
}

impl UnitOfWorkFactory {
    pub fn new(
        store: Arc<dyn DataStore>,
        interceptors: Vec<Arc<dyn SaveChangesInterceptor>>,
    ) -> Self {
        Self {
            store,
            interceptors: interceptors.into(),
        }
    }

    pub fn begin(&self) -> UnitOfWork {
        UnitOfWork {
            store: self.store.clone(),
            interceptors: self.interceptors.clone(),
            tracker: ChangeTracker::new(),
            state: UnitOfWorkState::Open,
        }
    }
}

/// 工作单元（事务边界）
///
/// `commit` 消耗自身，因此 `Open → Committed` 只可能发生一次。
/// 提交前被取消、写入失败或直接丢弃时，实体缓冲的事件随之丢弃，永不分发。
pub struct UnitOfWork {
    store: Arc<dyn DataStore>,
    interceptors: Arc<[Arc<dyn SaveChangesInterceptor>]>,
    tracker: ChangeTracker,
    state: UnitOfWorkState,
}

impl UnitOfWork {
    pub fn track<E: Entity>(&mut self, entity: E) {
        self.tracker.track(entity);
    }

    pub fn tracked(&self) -> usize {
        self.tracker.len()
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    /// 写入存储，成功后依次运行提交拦截器
    ///
    /// 返回写入条数。拦截器（事件分发）失败时数据已经写入，
    /// 错误仍返回给调用方。
    pub async fn commit(mut self, ctx: &AppContext) -> Result<usize, AppError> {
        if ctx.is_cancelled() {
            self.state = UnitOfWorkState::Discarded;
            tracing::debug!(
                pending_events = self.tracker.pending_events(),
                "unit of work cancelled before commit"
            );
            return Err(AppError::Cancelled);
        }

        let written = match self.store.write(ctx, self.tracker.entries()).await {
            Ok(written) => written,
            Err(err) => {
                self.state = UnitOfWorkState::Discarded;
                tracing::warn!(
                    error = %err,
                    pending_events = self.tracker.pending_events(),
                    "commit failed, pending events discarded"
                );
                return Err(match err {
                    AppError::Commit { .. } => err,
                    other => AppError::Commit {
                        reason: other.to_string(),
                        source: Some(Box::new(other)),
                    },
                });
            }
        };

        self.state = UnitOfWorkState::Committed;
        tracing::debug!(written, "unit of work committed");

        for interceptor in self.interceptors.iter() {
            interceptor.saved_changes(ctx, &mut self.tracker).await?;
        }

        Ok(written)
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state == UnitOfWorkState::Open && self.tracker.pending_events() > 0 {
            tracing::debug!(
                pending_events = self.tracker.pending_events(),
                "unit of work dropped without commit, pending events discarded"
            );
        }
    }
}
