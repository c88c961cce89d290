//! Compute service waits

use crate::cleanup::{wait_for_deletions, CleanupReport};
use crate::proxy::Proxy;
use stackwait_common::{
    PollConfig, Resource, ResourceFetcher, Server, StatusDefaults, WaitOptions, WaitResult,
};
use std::time::Duration;

/// Compute proxy over a client able to fetch servers
#[derive(Debug, Clone)]
pub struct Compute<C> {
    proxy: Proxy<C>,
}

impl<C> Compute<C> {
    /// Proxy with the default configuration
    pub fn new(client: C) -> Self {
        Self::with_config(client, &PollConfig::default())
    }

    pub fn with_config(client: C, config: &PollConfig) -> Self {
        Self {
            proxy: Proxy::new(client, config, config.compute.clone()),
        }
    }

    pub fn client(&self) -> &C {
        self.proxy.client()
    }

    pub fn defaults(&self) -> &StatusDefaults {
        self.proxy.defaults()
    }

    /// Wait for a server to reach the default status (`ACTIVE`).
    pub async fn wait_for_server(&self, server: Server) -> WaitResult<Server, C>
    where
        C: ResourceFetcher<Server>,
    {
        self.proxy.wait_for_status(server).await
    }

    pub async fn wait_for_server_with<S>(
        &self,
        server: Server,
        status: &str,
        failures: &[S],
        options: &WaitOptions,
    ) -> WaitResult<Server, C>
    where
        C: ResourceFetcher<Server>,
        S: AsRef<str>,
    {
        self.proxy
            .wait_for_status_with(server, status, failures, options)
            .await
    }

    /// Wait for any compute resource to be deleted.
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

    /// Wait for a server deletion to finish. `timeout = None` waits forever.
    pub async fn wait_for_server_deleted(
        &self,
        server: Server,
        timeout: Option<Duration>,
    ) -> WaitResult<Server, C>
    where
        C: ResourceFetcher<Server>,
    {
        let options = self.proxy.options().clone().with_timeout(timeout);
        self.proxy.wait_for_delete_with(server, &options).await
    }

    /// Wait for deleted servers to disappear so the ports they hold are
    /// released. Servers that never vanish are reported, not raised.
    pub async fn wait_for_servers_deleted(&self, servers: Vec<Server>) -> CleanupReport
    where
        C: ResourceFetcher<Server>,
    {
        wait_for_deletions(self.proxy.client(), servers, self.proxy.options()).await
    }
}
