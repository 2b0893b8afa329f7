//! 进程内领域事件分发
//!
//! - `DomainEventHandler`：订阅某一具体领域事件类型的处理器；
//! - `LocalDispatcher`：启动时一次性构建的只读路由表，按事件具体类型
//!   顺序调用处理器，首个失败即中止；
//! - `DispatchScope`：单个事件分发期间的子上下文与 tracing span；
//! - `IntegrationEventTranslator`：把领域事件翻译为集成事件并发布到出站总线。
//!
mod dispatcher;
mod handler;
mod scope;
mod translator;

pub use dispatcher::{LocalDispatcher, LocalDispatcherBuilder};
pub use handler::DomainEventHandler;
pub use scope::DispatchScope;
pub use translator::{IntegrationEventTranslator, TranslatingHandler};
