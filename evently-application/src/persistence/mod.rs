//! 工作单元与提交边界
//!
//! 命令处理器在工作单元中追踪被修改的实体；`commit` 先把实体写入
//! `DataStore`，写入成功后依次调用 `SaveChangesInterceptor`。
//! `CommitInterceptor` 就是在这个时点收割事件并交给本地分发器的。
//!
mod change_tracker;
mod data_store;
mod interceptor;
mod unit_of_work;

pub use change_tracker::{ChangeTracker, HarvestedEvent};
pub use data_store::DataStore;
pub use interceptor::{CommitInterceptor, SaveChangesInterceptor};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory, UnitOfWorkState};
