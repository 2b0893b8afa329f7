//! Evently 应用层（evently-application）
//!
//! 领域事件从“产生”到“送达”的整条管线都在这里编排：
//! - 工作单元（`persistence`）：追踪实体、写入存储，写入成功后触发提交拦截器；
//! - 本地分发（`eventing`）：按事件具体类型路由到进程内处理器，顺序执行、失败即止；
//! - 集成事件（`event_bus`）：转换器把领域事件翻译为集成事件并发布到代理（Broker），
//!   其他模块的消费者再通过命令总线开启新的工作单元；
//! - 命令/查询总线、上下文、时钟、重试策略与配置等公共设施。
//!
pub mod clock;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod eventing;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod persistence;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod retry;
pub mod validation;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;

// 允许宏生成的 ::evently_application 路径在本 crate 内部解析
extern crate self as evently_application;
