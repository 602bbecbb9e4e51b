//! Default manager implementation
//!
//! `AlarmManager` filters events and forwards them to its alarms
//! (`LogAlarm`, `FileAlarm`).

mod alarm_manager;
mod file;
mod filters;
mod log;

pub use self::alarm_manager::{AlarmConfig, AlarmManager, AlarmManagerFactory, Notification};
pub use self::file::FileAlarm;
pub use self::filters::{Filters, KindFilter};
pub use self::log::LogAlarm;
