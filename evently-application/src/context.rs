use bon::Builder;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询/事件处理）所需的横切信息：
/// - 关联追踪 `correlation_id`：同一条业务链路上的所有调用共享；
/// - 因果链 `causation_id`：触发本次调用的上游事件或消息 ID；
/// - 执行者 `actor`；
/// - 取消令牌：提交前取消将放弃整个工作单元。
///
/// 典型用法：
/// ```rust
/// use evently_application::context::AppContext;
///
/// let ctx = AppContext::builder().actor("user:42".to_string()).build();
/// assert!(ctx.causation_id.is_none());
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Clone, Debug, Builder)]
pub struct AppContext {
    #[builder(default = Uuid::now_v7())]
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,
    pub actor: Option<String>,
    #[builder(default)]
    cancellation: CancellationToken,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AppContext {
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// 派生处理某个事件时使用的子上下文
    ///
    /// 关联 ID 与执行者保持不变，因果 ID 指向该事件；子令牌随父令牌取消，
    /// 但取消子令牌不会影响父上下文。
    pub fn child_for_event(&self, event_id: Uuid) -> Self {
        Self {
            correlation_id: self.correlation_id,
            causation_id: Some(event_id),
            actor: self.actor.clone(),
            cancellation: self.cancellation.child_token(),
        }
    }
}
