//! Wait routines bound to a client and per-service defaults

use stackwait_common::wait::{wait_for_delete, wait_for_status};
use stackwait_common::{
    PollConfig, Resource, ResourceFetcher, StatusDefaults, WaitOptions, WaitResult,
};

/// Client plus the status defaults of one service
#[derive(Debug, Clone)]
pub(crate) struct Proxy<C> {
    client: C,
    defaults: StatusDefaults,
    options: WaitOptions,
}

impl<C> Proxy<C> {
    pub(crate) fn new(client: C, config: &PollConfig, defaults: StatusDefaults) -> Self {
        Self {
            client,
            defaults,
            options: config.wait_options(),
        }
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub(crate) fn defaults(&self) -> &StatusDefaults {
        &self.defaults
    }

    pub(crate) fn options(&self) -> &WaitOptions {
        &self.options
    }

    pub(crate) async fn wait_for_status<R>(&self, resource: R) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        wait_for_status(
            &self.client,
            resource,
            &self.defaults.status,
            self.defaults.failures.as_slice(),
            &self.options,
        )
        .await
    }

    pub(crate) async fn wait_for_status_with<R, S>(
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
        wait_for_status(&self.client, resource, status, failures, options).await
    }

    pub(crate) async fn wait_for_delete_with<R>(
        &self,
        resource: R,
        options: &WaitOptions,
    ) -> WaitResult<R, C>
    where
        R: Resource,
        C: ResourceFetcher<R>,
    {
        wait_for_delete(&self.client, resource, options).await
    }
}
