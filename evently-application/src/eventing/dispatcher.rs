//! 本地分发器（LocalDispatcher）
//!
//! 路由表在启动时通过 builder 一次性构建：键为事件具体类型的 `TypeId`
//! （注册时解析），值为按注册顺序排列的处理器列表。构建后只读，
//! 多个请求并发分发时无需加锁。
//!
use super::handler::DomainEventHandler;
use super::scope::DispatchScope;
use super::translator::{IntegrationEventTranslator, TranslatingHandler};
use crate::context::AppContext;
use crate::error::AppError;
use crate::event_bus::OutboundBus;
use evently_domain::domain_event::DomainEvent;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

type RouteFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'a>>;

type RouteFn =
    Arc<dyn for<'a> Fn(&'a AppContext, &'a dyn DomainEvent) -> RouteFuture<'a> + Send + Sync>;

#[derive(Clone)]
struct Route {
    handler: &'static str,
    call: RouteFn,
}

#[derive(Default)]
pub struct LocalDispatcherBuilder {
    routes: HashMap<TypeId, Vec<Route>>,
}

impl LocalDispatcherBuilder {
    /// 为事件类型 `E` 追加处理器（同一类型的处理器按注册顺序执行）
    pub fn subscribe<E, H>(mut self, handler: Arc<H>) -> Self
    where
        E: DomainEvent,
        H: DomainEventHandler<E> + 'static,
    {
        let name = handler.handler_name();
        let call: RouteFn = Arc::new(move |ctx, event| {
            let handler = handler.clone();
            Box::pin(async move {
                // 键与闭包同一泛型 E，正常情况下不会失败
                match event.as_any().downcast_ref::<E>() {
                    Some(event) => handler.handle(ctx, event).await,
                    None => Err(AppError::TypeMismatch {
                        expected: type_name::<E>(),
                        found: event.event_type(),
                    }),
                }
            })
        });

        self.routes
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Route {
                handler: name,
                call,
            });
        self
    }

    /// 为事件类型 `E` 注册转换器：翻译结果发布到出站总线
    pub fn translate<E, T>(self, translator: T, outbound: OutboundBus) -> Self
    where
        E: DomainEvent,
        T: IntegrationEventTranslator<E> + 'static,
    {
        self.subscribe::<E, _>(Arc::new(TranslatingHandler::new(translator, outbound)))
    }

    pub fn build(self) -> LocalDispatcher {
        LocalDispatcher {
            routes: Arc::new(self.routes),
        }
    }
}

/// 进程内发布/订阅路由器
#[derive(Clone, Default)]
pub struct LocalDispatcher {
    routes: Arc<HashMap<TypeId, Vec<Route>>>,
}

impl LocalDispatcher {
    pub fn builder() -> LocalDispatcherBuilder {
        LocalDispatcherBuilder::default()
    }

    /// 已为事件类型 `E` 注册的处理器数量
    pub fn handler_count<E: DomainEvent>(&self) -> usize {
        self.routes.get(&TypeId::of::<E>()).map_or(0, Vec::len)
    }

    /// 把事件交给其具体类型的全部处理器
    ///
    /// 处理器在同一个 `DispatchScope` 内按注册顺序逐个 await；
    /// 第一个失败立即返回 `AppError::Dispatch`，剩余处理器不再执行。
    /// 没有处理器订阅的事件直接忽略。
    pub async fn dispatch(&self, ctx: &AppContext, event: &dyn DomainEvent) -> Result<(), AppError> {
        let type_id = Any::type_id(event.as_any());
        let Some(routes) = self.routes.get(&type_id) else {
            tracing::trace!(event_type = event.event_type(), "no local handlers");
            return Ok(());
        };

        let scope = DispatchScope::open(ctx, event);

        for route in routes {
            tracing::debug!(parent: scope.span(), handler = route.handler, "handling domain event");
            let result = (route.call)(scope.context(), event)
                .instrument(scope.span().clone())
                .await;

            if let Err(source) = result {
                return Err(AppError::Dispatch {
                    handler: route.handler,
                    event_type: event.event_type(),
                    event_id: event.event_id(),
                    source: Box::new(source),
                });
            }
        }

        Ok(())
    }
}
