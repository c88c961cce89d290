//! Scripted in-memory fetcher
//!
//! `ScriptedFetcher<R>` implements [`ResourceFetcher`] without any remote
//! service. It replays a fixed sequence of outcomes, one per fetch, and keeps
//! repeating the final step once the script runs out. Use it to test code
//! that waits on resources:
//!
//! ```
//! use stackwait_common::mock::ScriptedFetcher;
//! use stackwait_common::types::Volume;
//! use stackwait_common::wait::{wait_for_delete, WaitOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let deleting = Volume { id: "vol-1".into(), status: "deleting".into(), ..Default::default() };
//! let fetcher = ScriptedFetcher::new().then_found(deleting.clone()).then_not_found();
//!
//! let options = WaitOptions::default().with_interval(std::time::Duration::from_millis(1));
//! let last = wait_for_delete(&fetcher, deleting, &options).await.unwrap();
//! assert_eq!(last.status, "deleting");
//! assert_eq!(fetcher.fetch_count(), 2);
//! # }
//! ```

use crate::fetch::{FetchOutcome, ResourceFetcher};
use crate::types::Resource;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Error returned by scripted error steps
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ScriptedError(pub String);

#[derive(Debug, Clone)]
enum Step<R> {
    Found(R),
    NotFound,
    Error(String),
}

#[derive(Debug)]
struct Script<R> {
    steps: Vec<Step<R>>,
    fetches: usize,
    seen_ids: Vec<String>,
}

/// Replays a scripted sequence of fetch outcomes
#[derive(Debug)]
pub struct ScriptedFetcher<R> {
    script: Mutex<Script<R>>,
}

impl<R: Resource> Default for ScriptedFetcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ScriptedFetcher<R> {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                steps: Vec::new(),
                fetches: 0,
                seen_ids: Vec::new(),
            }),
        }
    }

    /// Next fetch returns `resource`
    pub fn then_found(self, resource: R) -> Self {
        self.script.lock().steps.push(Step::Found(resource));
        self
    }

    /// Next fetch reports the resource as absent
    pub fn then_not_found(self) -> Self {
        self.script.lock().steps.push(Step::NotFound);
        self
    }

    /// Next fetch fails with `message`
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.script.lock().steps.push(Step::Error(message.into()));
        self
    }

    /// Number of fetches performed so far
    pub fn fetch_count(&self) -> usize {
        self.script.lock().fetches
    }

    /// Ids of the handles passed to each fetch, in order
    pub fn fetched_ids(&self) -> Vec<String> {
        self.script.lock().seen_ids.clone()
    }
}

#[async_trait]
impl<R: Resource> ResourceFetcher<R> for ScriptedFetcher<R> {
    type Error = ScriptedError;

    async fn fetch(&self, resource: &R) -> Result<FetchOutcome<R>, ScriptedError> {
        let mut script = self.script.lock();
        let index = script.fetches;
        script.fetches += 1;
        script.seen_ids.push(resource.id().to_string());

        let step = script
            .steps
            .get(index)
            .or_else(|| script.steps.last())
            .cloned();

        match step {
            Some(Step::Found(r)) => Ok(FetchOutcome::Found(r)),
            Some(Step::NotFound) => Ok(FetchOutcome::NotFound),
            Some(Step::Error(message)) => Err(ScriptedError(message)),
            None => Err(ScriptedError(format!(
                "no scripted outcome for {} {}",
                R::KIND,
                resource.id()
            ))),
        }
    }
}
