//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 构建 manager registry (名称大小写不敏感唯一)
//! - 单消费者循环：出队、归一化、Fan-out 到所有 manager
//! - 隔离失败/panic 的 manager，不影响其他 manager 与后续事件
//! - 默认 manager 实现 (`AlarmManager`)

pub mod error;
pub mod metrics;
pub mod registry;
pub mod sinks;
pub mod worker;

pub use contracts::{Event, Manager, ManagerFactory};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registry::SinkRegistry;
pub use sinks::{
    AlarmConfig, AlarmManager, AlarmManagerFactory, FileAlarm, Filters, LogAlarm, Notification,
};
pub use worker::{DispatchSummary, DispatchWorker, BACKPRESSURE_THRESHOLD};
