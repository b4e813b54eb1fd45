//! Bucket operation coordination
//!
//! The coordinator is responsible for:
//! - Snapshotting the drive registry at the start of every operation
//! - Concurrent, bounded fan-out of volume primitives to every drive
//! - Quorum reduction of per-drive outcomes into one logical result
//! - Healing drives whose bucket state fell behind

pub mod bucket;
pub mod heal;
pub mod quorum;

pub use bucket::{
    BucketCoordinator, BucketInfo, BucketOptions, DeleteBucketOptions, MakeBucketOptions,
    DEFAULT_MAX_IN_FLIGHT,
};
pub use heal::{DriveState, HealDriveInfo, HealItemType, HealOpts, HealResultItem};
pub use quorum::{read_quorum, reduce_quorum_errs, write_quorum};
