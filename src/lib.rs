//! # minivol
//!
//! Quorum-coordinated bucket-volume management across the local drives of a
//! distributed object-storage node:
//! - A bucket exists as an independent *volume* on every local drive
//! - Operations fan out concurrently to all drives and reduce by quorum
//! - Healing re-creates volumes on drives that fell behind
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Bucket Operation Coordinator     │
//! │  create / delete / stat / list / heal   │
//! │   - snapshots the drive registry        │
//! │   - reduces outcomes by read/write      │
//! │     quorum (N/2, N/2+1)                 │
//! └───────────┬─────────────────────────────┘
//!             │ bounded fan-out
//!   ┌─────────┴──────────┬──────────────┐
//!   │                    │              │
//! ┌─▼─────────┐   ┌─────▼──────┐   ┌──▼───────────┐
//! │ Drive 0    │   │ Drive 1    │   │ Drive 2      │
//! │ volume b1  │   │ volume b1  │   │  (offline)   │
//! │ volume b2  │   │  missing   │   │              │
//! └────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! A single slow, corrupt, or offline drive degrades latency, never
//! correctness: the reducer needs quorum, not unanimity. Cross-node concerns
//! (replication, erasure coding, bucket-to-node routing) live above this
//! crate; drive discovery and request authentication live beside it.
//!
//! ## Usage
//!
//! ```no_run
//! use minivol::coordinator::{BucketCoordinator, MakeBucketOptions};
//! use minivol::drive::{DriveRef, DriveRegistry, LocalDrive};
//! use std::sync::Arc;
//!
//! # async fn run() -> minivol::Result<()> {
//! let registry = Arc::new(DriveRegistry::from_refs(vec![
//!     DriveRef::present(LocalDrive::new("/data/d0")),
//!     DriveRef::present(LocalDrive::new("/data/d1")),
//!     DriveRef::Absent, // known-offline drive keeps its slot
//! ]));
//!
//! let coordinator = BucketCoordinator::new(registry);
//! coordinator
//!     .create_bucket("photos", &MakeBucketOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod coordinator;
pub mod drive;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use coordinator::BucketCoordinator;
pub use drive::{DriveRef, DriveRegistry, LocalDrive};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
