//! Resource model shared by every wait routine
//!
//! Only the identity and lifecycle fields are modelled here; the rest of a
//! resource's representation belongs to whichever client fetched it.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A remotely owned entity the poller can observe.
pub trait Resource: Debug + Clone + Send + Sync + 'static {
    /// Human readable kind, used in logs and errors
    const KIND: &'static str;

    /// Opaque identifier assigned by the remote service
    fn id(&self) -> &str;

    /// Current lifecycle status.
    ///
    /// Kinds that carry no status field keep the default `None`; waiting on
    /// their status is a usage error.
    fn status(&self) -> Option<&str> {
        None
    }
}

/// Case-insensitive status comparison
pub fn status_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether `status` matches any entry of `statuses`, ignoring case
pub fn status_in<S: AsRef<str>>(status: &str, statuses: &[S]) -> bool {
    statuses.iter().any(|s| status_eq(status, s.as_ref()))
}

/// Block storage volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_bootable: bool,
}

impl Resource for Volume {
    const KIND: &'static str = "volume";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

/// Point-in-time copy of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    pub volume_id: String,
}

impl Resource for Snapshot {
    const KIND: &'static str = "snapshot";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

/// Volume backup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    pub volume_id: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub is_incremental: bool,
}

impl Resource for Backup {
    const KIND: &'static str = "backup";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

/// Compute server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub flavor_id: Option<String>,
}

impl Resource for Server {
    const KIND: &'static str = "server";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

/// Attachment of a volume to a server.
///
/// Scoped by its parent server: fetchers need `server_id` as well as `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachment {
    pub id: String,
    pub server_id: String,
    pub volume_id: String,
    #[serde(default)]
    pub device: Option<String>,
}

impl Resource for VolumeAttachment {
    const KIND: &'static str = "volume_attachment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Compute flavor. Has no lifecycle status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vcpus: u32,
    #[serde(default)]
    pub ram: u64,
}

impl Resource for Flavor {
    const KIND: &'static str = "flavor";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Host aggregate. Has no lifecycle status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl Resource for Aggregate {
    const KIND: &'static str = "aggregate";

    fn id(&self) -> &str {
        &self.id
    }
}
