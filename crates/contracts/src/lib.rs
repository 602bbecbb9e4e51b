//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Pipeline
//! - `RawPayload`: parsed webhook body, owned by the ingestion queue until dequeued
//! - `Event`: normalized payload handed to every registered manager
//! - `SinkConfig`: immutable per-manager configuration bundle
//! - `Manager`: capability interface the dispatch worker fans out to

mod error;
mod event;
mod manager;
mod manager_config;

pub use error::*;
pub use event::*;
pub use manager::*;
pub use manager_config::*;
