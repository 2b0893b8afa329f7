use crate::context::AppContext;
use evently_domain::domain_event::DomainEvent;
use std::time::Instant;
use tracing::Span;

/// 单个事件的分发作用域
///
/// 持有以该事件为因果的子上下文（子取消令牌）与 tracing span。
/// 离开作用域时（无论成功、失败还是被取消）取消子令牌，
/// 处理器派生的后续工作随之结束。
pub struct DispatchScope {
    ctx: AppContext,
    span: Span,
    started: Instant,
}

impl DispatchScope {
    pub fn open(parent: &AppContext, event: &dyn DomainEvent) -> Self {
        let ctx = parent.child_for_event(event.event_id());
        let span = tracing::info_span!(
            "dispatch",
            event_type = event.event_type(),
            event_id = %event.event_id(),
            correlation_id = %ctx.correlation_id,
        );
        Self {
            ctx,
            span,
            started: Instant::now(),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        self.ctx.cancellation().cancel();
        tracing::trace!(
            parent: &self.span,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "dispatch scope released"
        );
    }
}
