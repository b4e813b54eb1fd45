//! Bucket operation coordinator
//!
//! Every operation follows the same shape: snapshot the drive registry, fan
//! the volume primitive out to every drive concurrently (bounded in-flight),
//! collect outcomes indexed by drive order, and reduce them by quorum. A
//! single slow or failed drive degrades latency, never correctness.
//!
//! Cancellation is drop-based: dropping an operation future stops waiting for
//! stragglers, while drive calls already running on the blocking pool finish
//! in the background. A cancelled caller learns nothing about whether the
//! drive mutation happened.

use crate::common::{validate_bucket_name, Error, Result};
use crate::coordinator::quorum::{
    read_quorum, reduce_quorum_errs, write_quorum, BUCKET_METADATA_OP_IGNORED_ERRS,
    BUCKET_OP_IGNORED_ERRS,
};
use crate::drive::{
    deleted_bucket_marker, deleted_buckets_root, DriveRef, DriveRegistry, DriveStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default cap on simultaneous in-flight drive calls per operation. A
/// throughput control for nodes with very large drive counts, not a
/// correctness requirement.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

/// Node-local logical view of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    /// Absent when the bucket is known only through its deleted marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Soft-deletion time, populated only when the caller opted into seeing
    /// deleted buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeBucketOptions {
    /// Treat "volume already exists" as success.
    pub force_create: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBucketOptions {
    /// Delete volumes even when they still hold objects.
    pub force: bool,
}

/// Options for the read-side operations (stat, list).
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketOptions {
    /// Include soft-deleted buckets via the deleted-marker namespace.
    pub deleted: bool,
}

pub struct BucketCoordinator {
    registry: Arc<DriveRegistry>,
    max_in_flight: usize,
}

impl BucketCoordinator {
    pub fn new(registry: Arc<DriveRegistry>) -> Self {
        Self {
            registry,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<DriveRegistry> {
        &self.registry
    }

    /// Run `op` once per drive on the blocking pool, at most
    /// `max_in_flight` concurrently. The result vector is indexed by drive
    /// order regardless of completion order; absent drives yield
    /// [`Error::DriveOffline`] without spawning.
    pub(crate) async fn fanout<T, F>(&self, drives: &[DriveRef], op: F) -> Vec<Result<T>>
    where
        T: Send + 'static,
        F: Fn(usize, Arc<dyn DriveStore>) -> Result<T> + Clone + Send + 'static,
    {
        let limiter = Arc::new(Semaphore::new(self.max_in_flight));

        let mut tasks = Vec::with_capacity(drives.len());
        for (index, drive) in drives.iter().enumerate() {
            let task = drive.store().map(|store| {
                let store = Arc::clone(store);
                let op = op.clone();
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    let _permit = limiter
                        .acquire_owned()
                        .await
                        .map_err(|_| Error::Internal("fan-out limiter closed".into()))?;
                    match tokio::task::spawn_blocking(move || op(index, store)).await {
                        Ok(result) => result,
                        Err(err) => Err(Error::Internal(format!("drive task failed: {err}"))),
                    }
                })
            });
            tasks.push(task);
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = match task {
                None => Err(Error::DriveOffline),
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(err) => Err(Error::Internal(format!("drive task failed: {err}"))),
                },
            };
            results.push(outcome);
        }
        results
    }

    /// Create the bucket's volume on every drive. Partial creation is left in
    /// place on quorum failure; a retry or heal is idempotent.
    pub async fn create_bucket(&self, bucket: &str, opts: &MakeBucketOptions) -> Result<()> {
        validate_bucket_name(bucket)?;

        let drives = self.registry.snapshot();
        tracing::debug!("Creating bucket {} across {} drives", bucket, drives.len());

        let name = bucket.to_string();
        let force = opts.force_create;
        let results = self
            .fanout(&drives, move |_, store| {
                match store.make_volume(&name) {
                    // Expected on force-create: the volume being there is the
                    // goal state.
                    Err(Error::VolumeExists(_)) if force => Ok(()),
                    other => other,
                }
            })
            .await;

        match reduce_quorum_errs(&results, BUCKET_OP_IGNORED_ERRS, write_quorum(drives.len())) {
            None => Ok(()),
            Some(err) => {
                tracing::warn!("Create bucket {} failed: {}", bucket, err);
                Err(err)
            }
        }
    }

    /// Delete the bucket's volume from every drive.
    ///
    /// If any drive refuses with `VolumeNotEmpty`, the delete is aborted
    /// rather than partially applied: every drive that did delete gets its
    /// volume re-created best-effort, and `VolumeNotEmpty` is returned no
    /// matter what quorum reduction would have said. The drives have no
    /// multi-volume transaction primitive, so this compensating step is the
    /// closest available substitute.
    pub async fn delete_bucket(&self, bucket: &str, opts: &DeleteBucketOptions) -> Result<()> {
        validate_bucket_name(bucket)?;

        let drives = self.registry.snapshot();
        tracing::debug!("Deleting bucket {} across {} drives", bucket, drives.len());

        let name = bucket.to_string();
        let force = opts.force;
        let results = self
            .fanout(&drives, move |_, store| store.delete_volume(&name, force))
            .await;

        let not_empty = results
            .iter()
            .any(|r| matches!(r, Err(Error::VolumeNotEmpty(_))));
        if not_empty {
            tracing::warn!("Delete bucket {} aborted: volume not empty, restoring", bucket);
            let restored = Arc::new(
                results.iter().map(|r| r.is_ok()).collect::<Vec<bool>>(),
            );
            let name = bucket.to_string();
            // Best-effort compensation; its own failures are intentionally
            // discarded and left for a later heal.
            let _ = self
                .fanout(&drives, move |index, store| {
                    if restored[index] {
                        store.make_volume(&name)
                    } else {
                        Ok(())
                    }
                })
                .await;
            return Err(Error::VolumeNotEmpty(bucket.to_string()));
        }

        match reduce_quorum_errs(&results, BUCKET_OP_IGNORED_ERRS, write_quorum(drives.len())) {
            None => Ok(()),
            Some(err) => {
                tracing::warn!("Delete bucket {} failed: {}", bucket, err);
                Err(err)
            }
        }
    }

    /// Stat the bucket across drives and reduce by read quorum. The first
    /// drive in registry order with an error-free outcome supplies the
    /// representative creation time.
    ///
    /// With `opts.deleted`, a uniform not-found is followed by a probe of the
    /// deleted-marker namespace; the probe never participates in quorum
    /// counting.
    pub async fn get_bucket_info(&self, bucket: &str, opts: &BucketOptions) -> Result<BucketInfo> {
        validate_bucket_name(bucket)?;

        let drives = self.registry.snapshot();
        let name = bucket.to_string();
        let results = self
            .fanout(&drives, move |_, store| store.stat_volume(&name))
            .await;

        match reduce_quorum_errs(&results, BUCKET_OP_IGNORED_ERRS, read_quorum(drives.len())) {
            None => {
                let info = results.iter().find_map(|r| r.as_ref().ok());
                Ok(BucketInfo {
                    name: bucket.to_string(),
                    // A zero read quorum can succeed with no surviving drive
                    // data; the bucket then has no known creation time.
                    created: info.map(|vi| vi.created),
                    deleted: None,
                })
            }
            Some(Error::VolumeNotFound(_)) if opts.deleted => {
                let marker = deleted_bucket_marker(bucket);
                let probes = self
                    .fanout(&drives, move |_, store| store.stat_volume(&marker))
                    .await;
                match probes.iter().find_map(|r| r.as_ref().ok()) {
                    Some(vi) => Ok(BucketInfo {
                        name: bucket.to_string(),
                        created: None,
                        deleted: Some(vi.created),
                    }),
                    None => Err(Error::VolumeNotFound(bucket.to_string())),
                }
            }
            Some(err) => Err(err),
        }
    }

    /// Enumerate every bucket this node's drives agree on: a name counts as
    /// existing when at least a read quorum of drives report it, and its
    /// creation time is the earliest seen. With `opts.deleted`, a second pass
    /// walks the deleted-marker namespace under the same rule and the lists
    /// are merged.
    pub async fn list_buckets(&self, opts: &BucketOptions) -> Result<Vec<BucketInfo>> {
        let drives = self.registry.snapshot();
        let quorum = read_quorum(drives.len());

        let live = self.list_volumes_quorum(&drives, "", quorum).await?;
        let mut deleted = if opts.deleted {
            self.list_volumes_quorum(&drives, &deleted_buckets_root(), quorum)
                .await?
        } else {
            BTreeMap::new()
        };

        let mut buckets = Vec::with_capacity(live.len() + deleted.len());
        for (name, created) in live {
            let deleted_at = deleted.remove(&name);
            buckets.push(BucketInfo {
                name,
                created: Some(created),
                deleted: deleted_at,
            });
        }
        for (name, deleted_at) in deleted {
            buckets.push(BucketInfo {
                name,
                created: None,
                deleted: Some(deleted_at),
            });
        }
        // BTreeMap iteration keeps each half sorted; the merge does not.
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    /// One enumeration pass: collect each drive's volume list under `parent`,
    /// keep names reported by at least `quorum` drives with their
    /// earliest-seen creation time. Offline drives and a missing parent
    /// contribute empty lists rather than faults.
    async fn list_volumes_quorum(
        &self,
        drives: &[DriveRef],
        parent: &str,
        quorum: usize,
    ) -> Result<BTreeMap<String, DateTime<Utc>>> {
        let parent_owned = parent.to_string();
        let results = self
            .fanout(drives, move |_, store| {
                match store.list_volumes(&parent_owned) {
                    Err(Error::VolumeNotFound(_)) => Ok(Vec::new()),
                    other => other,
                }
            })
            .await;
        let results: Vec<Result<Vec<_>>> = results
            .into_iter()
            .map(|r| match r {
                Err(Error::DriveOffline) => Ok(Vec::new()),
                other => other,
            })
            .collect();

        if let Some(err) =
            reduce_quorum_errs(&results, BUCKET_METADATA_OP_IGNORED_ERRS, quorum)
        {
            return Err(err);
        }

        let mut seen: BTreeMap<String, (usize, DateTime<Utc>)> = BTreeMap::new();
        for volumes in results.iter().filter_map(|r| r.as_ref().ok()) {
            for volume in volumes {
                if !crate::common::is_listable_bucket_name(&volume.name) {
                    continue;
                }
                seen.entry(volume.name.clone())
                    .and_modify(|(count, created)| {
                        *count += 1;
                        if volume.created < *created {
                            *created = volume.created;
                        }
                    })
                    .or_insert((1, volume.created));
            }
        }

        Ok(seen
            .into_iter()
            .filter(|(_, (count, _))| *count >= quorum)
            .map(|(name, (_, created))| (name, created))
            .collect())
    }
}
