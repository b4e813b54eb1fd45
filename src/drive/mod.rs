//! Drive abstraction
//!
//! A drive is one local storage backend; a bucket exists on it as a *volume*
//! (a directory-like entry). Every coordinator operation fans out over the
//! node's ordered drive set, so the layer is built from three pieces:
//! - [`DriveStore`]: volume-level primitives one drive exposes
//! - [`DriveRef`]: a registry slot, either a live handle or an offline drive
//! - [`DriveRegistry`]: the lock-guarded ordered drive list, snapshotted at
//!   the start of every operation

pub mod local;
pub mod registry;

use crate::common::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use local::LocalDrive;
pub use registry::DriveRegistry;

/// Reserved volume holding node-local bucket metadata. Never listed, never
/// creatable or deletable through the public bucket operations.
pub const RESERVED_SYS_VOLUME: &str = ".minivol.sys";

/// Subtree of the reserved volume holding per-bucket metadata.
pub const BUCKET_META_PREFIX: &str = "buckets";

/// Subtree holding one marker volume per soft-deleted bucket.
pub const DELETED_BUCKETS_PREFIX: &str = ".deleted";

/// Marker volume recording the soft-deletion of `bucket`. The marker's
/// creation time is the bucket's deletion time.
pub fn deleted_bucket_marker(bucket: &str) -> String {
    format!("{RESERVED_SYS_VOLUME}/{BUCKET_META_PREFIX}/{DELETED_BUCKETS_PREFIX}/{bucket}")
}

/// Parent volume under which all deleted-bucket markers live.
pub fn deleted_buckets_root() -> String {
    format!("{RESERVED_SYS_VOLUME}/{BUCKET_META_PREFIX}/{DELETED_BUCKETS_PREFIX}")
}

/// One drive's local knowledge of a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub created: DateTime<Utc>,
}

/// Volume-level primitives exposed by one physical or logical drive.
///
/// Implementations are blocking; the coordinator runs them on the blocking
/// thread pool. All errors must already be classified into the crate taxonomy
/// ([`crate::Error`]) so quorum reduction can tally them.
pub trait DriveStore: Send + Sync {
    /// Stable label for this drive, used in heal reports.
    fn endpoint(&self) -> &str;

    /// Stat a volume. `VolumeNotFound` is a legitimate negative, not a fault.
    fn stat_volume(&self, volume: &str) -> Result<VolumeInfo>;

    /// Create a volume. Creating an existing volume is `VolumeExists`.
    fn make_volume(&self, volume: &str) -> Result<()>;

    /// Delete a volume. Without `force`, a non-empty volume is
    /// `VolumeNotEmpty` and is left untouched.
    fn delete_volume(&self, volume: &str, force: bool) -> Result<()>;

    /// List the volumes directly under `parent` ("" for the drive root).
    fn list_volumes(&self, parent: &str) -> Result<Vec<VolumeInfo>>;
}

/// A slot in the drive registry: a live drive handle, or a drive known to be
/// offline. An absent drive is distinct from a present drive that errors.
#[derive(Clone)]
pub enum DriveRef {
    Present(Arc<dyn DriveStore>),
    Absent,
}

impl DriveRef {
    pub fn present<D: DriveStore + 'static>(store: D) -> Self {
        DriveRef::Present(Arc::new(store))
    }

    pub fn store(&self) -> Option<&Arc<dyn DriveStore>> {
        match self {
            DriveRef::Present(store) => Some(store),
            DriveRef::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, DriveRef::Present(_))
    }

    /// Endpoint label for reports; empty for an offline drive.
    pub fn endpoint(&self) -> &str {
        match self {
            DriveRef::Present(store) => store.endpoint(),
            DriveRef::Absent => "",
        }
    }
}

impl fmt::Debug for DriveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveRef::Present(store) => write!(f, "Present({})", store.endpoint()),
            DriveRef::Absent => write!(f, "Absent"),
        }
    }
}
