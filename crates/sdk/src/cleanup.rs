//! Best-effort deletion waits used during service cleanup
//!
//! Dependent resources must be gone before their parents can be deleted
//! (backups before snapshots, snapshots before volumes, servers before their
//! ports). A resource that fails to disappear is logged and skipped so the
//! rest of the cleanup can still proceed.

use stackwait_common::wait::wait_for_delete;
use stackwait_common::{Resource, ResourceFetcher, WaitOptions};
use tracing::{debug, warn};

/// Which resources were confirmed deleted and which were given up on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Ids confirmed gone
    pub deleted: Vec<String>,
    /// Ids still present or unreadable, with the reason
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.deleted.extend(other.deleted);
        self.failed.extend(other.failed);
    }
}

/// Wait for every resource in turn to be deleted, skipping failures
pub async fn wait_for_deletions<R, F, I>(
    fetcher: &F,
    resources: I,
    options: &WaitOptions,
) -> CleanupReport
where
    R: Resource,
    F: ResourceFetcher<R>,
    I: IntoIterator<Item = R>,
{
    let mut report = CleanupReport::default();

    for resource in resources {
        let id = resource.id().to_string();
        match wait_for_delete(fetcher, resource, options).await {
            Ok(_) => {
                debug!("{} {} confirmed deleted", R::KIND, id);
                report.deleted.push(id);
            }
            Err(e) => {
                warn!("Giving up on deletion of {} {}: {}", R::KIND, id, e);
                report.failed.push((id, e.to_string()));
            }
        }
    }

    report
}
