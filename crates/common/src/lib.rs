//! stackwait common library
//!
//! Resource model, fetch capability and the status poller shared by the
//! stackwait service proxies.

pub mod config;
pub mod error;
pub mod fetch;
pub mod mock;
pub mod types;
pub mod wait;

// Re-export commonly used types
pub use config::{default_config_path, PollConfig, StatusDefaults};
pub use error::{Error, Result, WaitError};
pub use fetch::{fetch_fn, FetchOutcome, FnFetcher, ResourceFetcher, WaitResult};
pub use types::*;
pub use wait::{wait_for_delete, wait_for_status, WaitOptions};
