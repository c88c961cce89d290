//! The read capability handed to the poller

use crate::error::WaitError;
use crate::types::Resource;
use async_trait::async_trait;
use std::future::Future;

/// Result of a single successful fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<R> {
    /// The resource exists; this is its current representation
    Found(R),
    /// The remote service reported the resource as absent (HTTP 404)
    NotFound,
}

impl<R> FetchOutcome<R> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchOutcome::NotFound)
    }

    pub fn found(self) -> Option<R> {
        match self {
            FetchOutcome::Found(r) => Some(r),
            FetchOutcome::NotFound => None,
        }
    }
}

impl<R> From<Option<R>> for FetchOutcome<R> {
    fn from(value: Option<R>) -> Self {
        match value {
            Some(r) => FetchOutcome::Found(r),
            None => FetchOutcome::NotFound,
        }
    }
}

/// Performs a fresh read of a resource.
///
/// The resource passed in carries whatever identity the kind needs, so
/// parent-scoped kinds such as volume attachments can read their parent id
/// from it. Any error other than absence is returned as `Self::Error` and
/// reaches the waiting caller unchanged.
#[async_trait]
pub trait ResourceFetcher<R: Resource>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch(&self, resource: &R) -> Result<FetchOutcome<R>, Self::Error>;
}

/// Outcome of waiting on `R` through fetcher `F`
pub type WaitResult<R, F> = Result<R, WaitError<R, <F as ResourceFetcher<R>>::Error>>;

/// Adapts a closure into a [`ResourceFetcher`].
///
/// The closure receives an owned copy of the handle being watched.
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

/// Shorthand for [`FnFetcher::new`]
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher::new(f)
}

#[async_trait]
impl<R, F, Fut, E> ResourceFetcher<R> for FnFetcher<F>
where
    R: Resource,
    F: Fn(R) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchOutcome<R>, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    async fn fetch(&self, resource: &R) -> Result<FetchOutcome<R>, E> {
        (self.f)(resource.clone()).await
    }
}
