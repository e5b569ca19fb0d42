//! Persistent execution store for dbmaint.
//!
//! [`SledExecutionStore`] keeps the execution history in an embedded sled
//! database and delegates script execution to a [`ScriptRunner`].

pub mod history;
pub mod runner;
pub mod store;

pub use history::SledHistory;
pub use runner::{CommandRunner, ScriptRunner};
pub use store::SledExecutionStore;
