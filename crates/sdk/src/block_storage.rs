//! Block storage service waits
//!
//! Volumes, snapshots and backups settle in `available` and break down into
//! `error` unless configured otherwise.

use crate::cleanup::{wait_for_deletions, CleanupReport};
use crate::proxy::Proxy;
use stackwait_common::{
    status_in, Backup, PollConfig, Resource, ResourceFetcher, Snapshot, StatusDefaults, Volume,
    WaitError, WaitOptions, WaitResult,
};
use std::time::Duration;
use tracing::info;

/// Status a volume reports while attached to a server
pub const VOLUME_IN_USE: &str = "in-use";

/// Status a volume reports once detached
pub const VOLUME_AVAILABLE: &str = "available";

/// Block storage proxy over a client able to fetch its resources
#[derive(Debug, Clone)]
pub struct BlockStorage<C> {
    proxy: Proxy<C>,
}

impl<C> BlockStorage<C> {
    /// Proxy with the default configuration
    pub fn new(client: C) -> Self {
        Self::with_config(client, &PollConfig::default())
    }

    pub fn with_config(client: C, config: &PollConfig) -> Self {
        Self {
            proxy: Proxy::new(client, config, config.block_storage.clone()),
        }
    }

    pub fn client(&self) -> &C {
        self.proxy.client()
    }

    pub fn defaults(&self) -> &StatusDefaults {
        self.proxy.defaults()
    }

    /// Wait for a resource to reach the default status (`available`).
    pub async fn wait_for_status<R>(&self, resource: R) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        self.proxy.wait_for_status(resource).await
    }

    /// Wait for a resource to reach `status`, failing on any of `failures`.
    pub async fn wait_for_status_with<R, S>(
        &self,
        resource: R,
        status: &str,
        failures: &[S],
        options: &WaitOptions,
    ) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
        S: AsRef<str>,
    {
        self.proxy
            .wait_for_status_with(resource, status, failures, options)
            .await
    }

    /// Wait for a resource to be deleted.
    pub async fn wait_for_delete<R>(&self, resource: R) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        self.proxy
            .wait_for_delete_with(resource, self.proxy.options())
            .await
    }

    pub async fn wait_for_delete_with<R>(
        &self,
        resource: R,
        options: &WaitOptions,
    ) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        self.proxy.wait_for_delete_with(resource, options).await
    }

    /// Wait for a freshly created resource to become usable.
    ///
    /// A resource whose creation response already carries a failure status is
    /// rejected without polling. `timeout = None` waits forever.
    pub async fn wait_for_created<R>(
        &self,
        resource: R,
        timeout: Option<Duration>,
    ) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        let defaults = self.proxy.defaults();
        if let Some(status) = resource.status() {
            if status_in(status, defaults.failures.as_slice()) {
                return Err(WaitError::Failure {
                    kind: R::KIND,
                    id: resource.id().to_string(),
                    status: status.to_string(),
                    resource,
                });
            }
        }

        let options = self.proxy.options().clone().with_timeout(timeout);
        let failures = defaults.failures.as_slice();
        let created = self
            .proxy
            .wait_for_status_with(resource, &defaults.status, failures, &options)
            .await?;
        info!("{} {} created", R::KIND, created.id());
        Ok(created)
    }

    /// Wait for a volume to show up as attached after an attach request.
    pub async fn wait_for_attached(
        &self,
        volume: Volume,
        timeout: Option<Duration>,
    ) -> WaitResult<Volume, C>
    where
        C: ResourceFetcher<Volume>,
    {
        let options = self.proxy.options().clone().with_timeout(timeout);
        let failures = self.proxy.defaults().failures.as_slice();
        self.proxy
            .wait_for_status_with(volume, VOLUME_IN_USE, failures, &options)
            .await
    }

    /// Wait for a volume to return to `available` after a detach request.
    pub async fn wait_for_detached(
        &self,
        volume: Volume,
        timeout: Option<Duration>,
    ) -> WaitResult<Volume, C>
    where
        C: ResourceFetcher<Volume>,
    {
        let options = self.proxy.options().clone().with_timeout(timeout);
        let failures = self.proxy.defaults().failures.as_slice();
        self.proxy
            .wait_for_status_with(volume, VOLUME_AVAILABLE, failures, &options)
            .await
    }

    /// Wait for deleted backups, then deleted snapshots, to disappear.
    ///
    /// Snapshots cannot go while backups of them remain, so backups are
    /// awaited first. Resources that never vanish are reported, not raised.
    pub async fn wait_for_cleanup(
        &self,
        backups: Vec<Backup>,
        snapshots: Vec<Snapshot>,
    ) -> CleanupReport
    where
        C: ResourceFetcher<Backup> + ResourceFetcher<Snapshot>,
    {
        let options = self.proxy.options();
        let mut report = wait_for_deletions(self.proxy.client(), backups, options).await;
        report.merge(wait_for_deletions(self.proxy.client(), snapshots, options).await);
        report
    }
}
