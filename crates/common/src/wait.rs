//! Status and deletion polling
//!
//! Both routines run a strict fetch-inspect-sleep loop on the calling task
//! until a terminal condition is met. They only ever read the resource.

use crate::error::WaitError;
use crate::fetch::{FetchOutcome, ResourceFetcher};
use crate::types::{status_eq, status_in, Resource};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay between two fetches (2 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default wait budget used by the service proxies (2 minutes)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Timing and cancellation for a single wait
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Delay between fetch attempts
    pub interval: Duration,
    /// Total wall-clock budget; `None` waits forever
    pub timeout: Option<Duration>,
    /// Aborts the wait at the next sleep when cancelled
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_WAIT_TIMEOUT),
            cancel: None,
        }
    }
}

impl WaitOptions {
    /// Options with an unbounded wait budget
    pub fn forever() -> Self {
        Self {
            timeout: None,
            ..Default::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Tracks the budget of one wait call
struct Deadline {
    start: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    fn start(timeout: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    fn expired(&self) -> bool {
        self.timeout
            .is_some_and(|timeout| self.start.elapsed() > timeout)
    }
}

/// Sleep for one interval. Returns `false` if the wait was cancelled.
async fn pause(options: &WaitOptions) -> bool {
    match &options.cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(options.interval) => true,
            }
        }
        None => {
            tokio::time::sleep(options.interval).await;
            true
        }
    }
}

/// Wait for `resource` to reach `target` status.
///
/// Returns the first fetched representation whose status equals `target`,
/// or `resource` itself without fetching when it is already there. A status
/// found in `failures` ends the wait with [`WaitError::Failure`]. Both
/// comparisons ignore case.
///
/// The budget is checked at the top of every pass, before fetching. No fetch
/// is made once more than `timeout` has elapsed, and a zero timeout still
/// performs exactly one fetch.
pub async fn wait_for_status<R, F, S>(
    fetcher: &F,
    resource: R,
    target: &str,
    failures: &[S],
    options: &WaitOptions,
) -> Result<R, WaitError<R, F::Error>>
where
    R: Resource,
    F: ResourceFetcher<R> + ?Sized,
    S: AsRef<str>,
{
    let Some(initial) = resource.status() else {
        return Err(WaitError::Misuse { kind: R::KIND });
    };
    if status_eq(initial, target) {
        return Ok(resource);
    }

    let deadline = Deadline::start(options.timeout);
    let mut current = resource;

    loop {
        if deadline.expired() {
            let status = current.status().map(str::to_string);
            warn!(
                "Timeout waiting for {} {} to reach {}, last status {}",
                R::KIND,
                current.id(),
                target,
                status.as_deref().unwrap_or("unknown")
            );
            return Err(WaitError::Timeout {
                kind: R::KIND,
                id: current.id().to_string(),
                target: target.to_string(),
                status,
                timeout: options.timeout.unwrap_or_default(),
                resource: current,
            });
        }

        match fetcher.fetch(&current).await.map_err(WaitError::Fetch)? {
            FetchOutcome::Found(fetched) => current = fetched,
            FetchOutcome::NotFound => {
                warn!("{} {} disappeared while waiting for {}", R::KIND, current.id(), target);
                return Err(WaitError::NotFound {
                    kind: R::KIND,
                    id: current.id().to_string(),
                    target: target.to_string(),
                    resource: current,
                });
            }
        }

        let status = match current.status() {
            Some(status) => status,
            None => return Err(WaitError::Misuse { kind: R::KIND }),
        };

        if status_eq(status, target) {
            info!("{} {} reached status {}", R::KIND, current.id(), status);
            return Ok(current);
        }

        if status_in(status, failures) {
            warn!("{} {} transitioned to failure status {}", R::KIND, current.id(), status);
            return Err(WaitError::Failure {
                kind: R::KIND,
                id: current.id().to_string(),
                status: status.to_string(),
                resource: current,
            });
        }

        debug!(
            "Still waiting for {} {} to reach {}, current status is {}",
            R::KIND,
            current.id(),
            target,
            status
        );

        if !pause(options).await {
            return Err(WaitError::Cancelled {
                kind: R::KIND,
                id: current.id().to_string(),
                resource: current,
            });
        }
    }
}

/// Wait for `resource` to be deleted remotely.
///
/// Absence is the only success signal: a resource that can still be fetched
/// is not deleted, whatever its status. On success the last representation
/// seen before the not-found response is returned.
pub async fn wait_for_delete<R, F>(
    fetcher: &F,
    resource: R,
    options: &WaitOptions,
) -> Result<R, WaitError<R, F::Error>>
where
    R: Resource,
    F: ResourceFetcher<R> + ?Sized,
{
    let deadline = Deadline::start(options.timeout);
    let mut last = resource;

    loop {
        if deadline.expired() {
            warn!("Timeout waiting for {} {} to be deleted", R::KIND, last.id());
            return Err(WaitError::Timeout {
                kind: R::KIND,
                id: last.id().to_string(),
                target: "deleted".to_string(),
                status: last.status().map(str::to_string),
                timeout: options.timeout.unwrap_or_default(),
                resource: last,
            });
        }

        match fetcher.fetch(&last).await.map_err(WaitError::Fetch)? {
            FetchOutcome::NotFound => {
                info!("{} {} deleted", R::KIND, last.id());
                return Ok(last);
            }
            FetchOutcome::Found(fetched) => last = fetched,
        }

        debug!("Still waiting for {} {} to be deleted", R::KIND, last.id());

        if !pause(options).await {
            return Err(WaitError::Cancelled {
                kind: R::KIND,
                id: last.id().to_string(),
                resource: last,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetch_fn;
    use crate::mock::ScriptedFetcher;
    use crate::types::{Flavor, Volume};
    use std::convert::Infallible;

    fn volume(status: &str) -> Volume {
        Volume {
            id: "vol-1".to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn options(interval: u64, timeout: Option<u64>) -> WaitOptions {
        WaitOptions::default()
            .with_interval(Duration::from_secs(interval))
            .with_timeout(timeout.map(Duration::from_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_at_target_skips_fetch() {
        let fetcher = ScriptedFetcher::<Volume>::new();

        for status in ["Available", "AVAILABLE", "available"] {
            let result = wait_for_status(
                &fetcher,
                volume(status),
                "available",
                &["error"],
                &options(2, Some(10)),
            )
            .await
            .unwrap();
            assert_eq!(result.status, status);
        }
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_target_ignoring_case() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("creating"))
            .then_found(volume("AVAILABLE"));

        let result = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(2, Some(60)),
        )
        .await
        .unwrap();

        assert_eq!(result.status, "AVAILABLE");
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_status_short_circuits() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("creating"))
            .then_found(volume("Error"))
            .then_found(volume("available"));

        let start = Instant::now();
        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(1, None),
        )
        .await
        .unwrap_err();

        assert!(err.is_failure());
        match err {
            WaitError::Failure { status, resource, .. } => {
                assert_eq!(status, "Error");
                assert_eq!(resource.status, "Error");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(fetcher.fetch_count(), 2);
        // One sleep between the two fetches, none after the failure
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_bounded() {
        let fetcher = ScriptedFetcher::new().then_found(volume("creating"));

        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(1, Some(3)),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(fetcher.fetch_count() <= 4);
        match err {
            WaitError::Timeout { status, target, .. } => {
                assert_eq!(status.as_deref(), Some("creating"));
                assert_eq!(target, "available");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_fetches_once() {
        let fetcher = ScriptedFetcher::new().then_found(volume("creating"));

        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(2, Some(0)),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_statusless_kind_is_misuse() {
        let fetcher = ScriptedFetcher::<Flavor>::new();
        let flavor = Flavor {
            id: "m1.tiny".to_string(),
            name: "m1.tiny".to_string(),
            ..Default::default()
        };

        let err = wait_for_status(&fetcher, flavor, "available", &["error"], &options(1, None))
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Misuse { kind: "flavor" }));
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_propagates() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("creating"))
            .then_error("permission denied");

        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(1, None),
        )
        .await
        .unwrap_err();

        match err {
            WaitError::Fetch(e) => assert_eq!(e.to_string(), "permission denied"),
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_during_status_wait() {
        let fetcher = ScriptedFetcher::<Volume>::new().then_not_found();

        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(1, None),
        )
        .await
        .unwrap_err();

        match err {
            WaitError::NotFound { target, resource, .. } => {
                assert_eq!(target, "available");
                assert_eq!(resource.status, "creating");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_budget_spent_in_sleep() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("creating"))
            .then_found(volume("available"));

        let start = Instant::now();
        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(10, Some(3)),
        )
        .await
        .unwrap_err();

        match err {
            WaitError::Timeout { status, resource, .. } => {
                assert_eq!(status.as_deref(), Some("creating"));
                assert_eq!(resource.status, "creating");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(fetcher.fetch_count(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_boundary_allows_last_fetch() {
        let fetcher = ScriptedFetcher::new().then_found(volume("creating"));

        let err = wait_for_status(
            &fetcher,
            volume("creating"),
            "available",
            &["error"],
            &options(1, Some(3)),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        // Fetches at 0s, 1s, 2s and 3s
        assert_eq!(fetcher.fetch_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_returns_last_snapshot() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("deleting"))
            .then_found(volume("error_deleting"))
            .then_not_found();

        let result = wait_for_delete(&fetcher, volume("in-use"), &options(1, Some(30)))
            .await
            .unwrap();

        assert_eq!(result.status, "error_deleting");
        assert_eq!(fetcher.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_not_found_immediately() {
        let fetcher = ScriptedFetcher::<Volume>::new().then_not_found();

        let result = wait_for_delete(&fetcher, volume("available"), &options(1, Some(30)))
            .await
            .unwrap();

        assert_eq!(result.status, "available");
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_timeout() {
        let fetcher = ScriptedFetcher::new().then_found(volume("deleting"));

        let err = wait_for_delete(&fetcher, volume("available"), &options(1, Some(2)))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.resource().map(|v| v.status.as_str()), Some("deleting"));
        assert!(fetcher.fetch_count() <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_no_fetch_after_budget_spent_in_sleep() {
        let fetcher = ScriptedFetcher::new()
            .then_found(volume("deleting"))
            .then_not_found();

        let err = wait_for_delete(&fetcher, volume("available"), &options(10, Some(3)))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.resource().map(|v| v.status.as_str()), Some("deleting"));
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_wins_over_zero_interval() {
        let token = CancellationToken::new();
        token.cancel();
        let fetcher = ScriptedFetcher::new().then_found(volume("creating"));
        let opts = WaitOptions::forever()
            .with_interval(Duration::ZERO)
            .with_cancel(token);

        let err = wait_for_status(&fetcher, volume("creating"), "available", &["error"], &opts)
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Cancelled { .. }));
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_wait() {
        let token = CancellationToken::new();
        let fetcher = ScriptedFetcher::new().then_found(volume("creating"));
        let opts = WaitOptions::forever()
            .with_interval(Duration::from_secs(5))
            .with_cancel(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            token.cancel();
        });

        let err = wait_for_status(&fetcher, volume("creating"), "available", &["error"], &opts)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, WaitError::Cancelled { .. }));
        assert_eq!(fetcher.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closure_fetcher() {
        let fetcher = fetch_fn(|v: Volume| async move {
            Ok::<_, Infallible>(FetchOutcome::Found(Volume {
                status: "in-use".to_string(),
                ..v
            }))
        });

        let result = wait_for_status(
            &fetcher,
            volume("attaching"),
            "IN-USE",
            &[] as &[&str],
            &WaitOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(result.status, "in-use");
    }
}
