//! stackwait SDK
//!
//! Block storage and compute proxies that wait on remote resources with the
//! service defaults of the control-plane API. The proxies never talk
//! to the API themselves; they are handed a client implementing
//! [`ResourceFetcher`] for each resource kind they wait on.

pub mod block_storage;
pub mod cleanup;
pub mod compute;
mod proxy;

pub use block_storage::BlockStorage;
pub use cleanup::{wait_for_deletions, CleanupReport};
pub use compute::Compute;

pub use stackwait_common::{
    FetchOutcome, PollConfig, Resource, ResourceFetcher, StatusDefaults, WaitError, WaitOptions,
    WaitResult,
};
