//! Evently 领域层基础库（evently-domain）
//!
//! 提供各业务模块（Users / Events / Ticketing）共用的领域构件：
//! - 实体（`entity`）与其私有的待发布事件缓冲区（`EventBuffer`）
//! - 领域事件（`domain_event`）的最小接口
//! - 领域错误（`error`）：业务规则违反时返回的结构化失败
//! - 值对象（`value_object`）
//!
//! 本 crate 不做任何 I/O：事件只在实体内部累积，何时、如何投递由应用层的
//! 工作单元与提交拦截器决定。
//!
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod value_object;

// 允许在本 crate 内部通过 ::evently_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::evently_domain 路径。
extern crate self as evently_domain;
