use crate::context::AppContext;
use crate::error::AppError;
use async_trait::async_trait;
use evently_domain::domain_event::DomainEvent;
use std::any::type_name;

/// 领域事件处理器：只接收具体类型为 `E` 的事件
#[async_trait]
pub trait DomainEventHandler<E: DomainEvent>: Send + Sync {
    /// 处理器名称（用于日志与错误定位）
    fn handler_name(&self) -> &'static str {
        type_name::<Self>()
    }

    async fn handle(&self, ctx: &AppContext, event: &E) -> Result<(), AppError>;
}
