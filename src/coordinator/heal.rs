//! Bucket healing
//!
//! Healing is a state-repair operation, not a read: classify every drive's
//! view of the bucket, then either fill the gaps (re-create the volume on
//! drives where it is provably missing) or, with `remove`, clean up a bucket
//! considered dangling. It is idempotent and safe to run concurrently with
//! normal traffic; it never touches drives classified corrupt, which need a
//! drive-level repair outside this crate's scope.

use crate::common::{validate_bucket_name, Error, Result};
use crate::coordinator::BucketCoordinator;
use crate::drive::RESERVED_SYS_VOLUME;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct HealOpts {
    /// Report the observed drive states without mutating anything.
    pub dry_run: bool,
    /// Delete the bucket from every drive instead of repairing it.
    pub remove: bool,
}

/// One drive's health with respect to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveState {
    Ok,
    /// Volume absent on an otherwise healthy drive; heal can fill this gap.
    Missing,
    Offline,
    Corrupt,
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveState::Ok => write!(f, "ok"),
            DriveState::Missing => write!(f, "missing"),
            DriveState::Offline => write!(f, "offline"),
            DriveState::Corrupt => write!(f, "corrupt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealItemType {
    Bucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealDriveInfo {
    pub endpoint: String,
    pub state: DriveState,
}

/// Before/after record of one heal, for observability and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealResultItem {
    #[serde(rename = "type")]
    pub item_type: HealItemType,
    pub bucket: String,
    pub drive_count: usize,
    /// Always -1: bucket heals are not erasure-set-scoped.
    pub set_count: i64,
    pub before: Vec<HealDriveInfo>,
    pub after: Vec<HealDriveInfo>,
}

impl BucketCoordinator {
    /// Heal one bucket across the drive set.
    ///
    /// Per-drive failures are recorded in the report, never escalated: one
    /// bad drive must not block learning the state of the rest.
    pub async fn heal_bucket(&self, bucket: &str, opts: &HealOpts) -> Result<HealResultItem> {
        let reserved = bucket == RESERVED_SYS_VOLUME;
        if !reserved {
            validate_bucket_name(bucket)?;
        }

        let drives = self.registry().snapshot();
        tracing::info!(
            "Healing bucket {} across {} drives (dry_run={}, remove={})",
            bucket,
            drives.len(),
            opts.dry_run,
            opts.remove
        );

        let name = bucket.to_string();
        let results = self
            .fanout(&drives, move |_, store| {
                if reserved {
                    // The reserved namespace is maintained out of band and
                    // always reported healthy on a live drive.
                    return Ok(());
                }
                store.stat_volume(&name).map(|_| ())
            })
            .await;

        let before: Vec<DriveState> = results
            .iter()
            .map(|r| match r {
                Ok(()) => DriveState::Ok,
                Err(Error::DriveOffline) => DriveState::Offline,
                Err(Error::VolumeNotFound(_)) => DriveState::Missing,
                Err(_) => DriveState::Corrupt,
            })
            .collect();

        let endpoints: Vec<String> = drives.iter().map(|d| d.endpoint().to_string()).collect();

        let mut report = HealResultItem {
            item_type: HealItemType::Bucket,
            bucket: bucket.to_string(),
            drive_count: drives.len(),
            set_count: -1,
            before: endpoints
                .iter()
                .cloned()
                .zip(before.iter().copied())
                .map(|(endpoint, state)| HealDriveInfo { endpoint, state })
                .collect(),
            after: Vec::new(),
        };

        if opts.dry_run {
            report.after = report.before.clone();
            return Ok(report);
        }

        let all_missing = !results.is_empty()
            && results
                .iter()
                .all(|r| matches!(r, Err(Error::VolumeNotFound(_))));

        let mut after = before.clone();

        if opts.remove {
            // Dangling cleanup. "Not unanimously missing on this node's
            // drives" is a node-local heuristic, not a cluster-wide consensus
            // check; it guards against deleting a legitimately-rebuilding
            // bucket.
            if !reserved && !all_missing {
                let name = bucket.to_string();
                let _ = self
                    .fanout(&drives, move |_, store| store.delete_volume(&name, true))
                    .await;
            }
        } else {
            let missing: Arc<Vec<bool>> = Arc::new(
                before
                    .iter()
                    .map(|state| *state == DriveState::Missing)
                    .collect(),
            );
            let name = bucket.to_string();
            let missing_in_op = Arc::clone(&missing);
            let repairs = self
                .fanout(&drives, move |index, store| {
                    if missing_in_op[index] {
                        store.make_volume(&name)
                    } else {
                        Ok(())
                    }
                })
                .await;

            for (index, outcome) in repairs.iter().enumerate() {
                if !missing[index] {
                    continue;
                }
                match outcome {
                    Ok(()) => after[index] = DriveState::Ok,
                    Err(err) => tracing::warn!(
                        "Heal of bucket {} could not re-create volume on {}: {}",
                        bucket,
                        endpoints[index],
                        err
                    ),
                }
            }
        }

        report.after = endpoints
            .into_iter()
            .zip(after)
            .map(|(endpoint, state)| HealDriveInfo { endpoint, state })
            .collect();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization_shape() {
        let report = HealResultItem {
            item_type: HealItemType::Bucket,
            bucket: "b1".into(),
            drive_count: 2,
            set_count: -1,
            before: vec![HealDriveInfo {
                endpoint: "/data/d0".into(),
                state: DriveState::Missing,
            }],
            after: vec![HealDriveInfo {
                endpoint: "/data/d0".into(),
                state: DriveState::Ok,
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "bucket");
        assert_eq!(json["set_count"], -1);
        assert_eq!(json["before"][0]["state"], "missing");
        assert_eq!(json["after"][0]["state"], "ok");
    }

    #[test]
    fn test_drive_state_display() {
        assert_eq!(DriveState::Ok.to_string(), "ok");
        assert_eq!(DriveState::Missing.to_string(), "missing");
        assert_eq!(DriveState::Offline.to_string(), "offline");
        assert_eq!(DriveState::Corrupt.to_string(), "corrupt");
    }
}
