//! Process-wide drive registry
//!
//! The registry owns the ordered list of this node's drives. It is the only
//! shared mutable state in the crate: operations take a point-in-time
//! snapshot under the read lock and never touch the live list again, so a
//! drive being added or removed mid-flight cannot race an in-progress
//! fan-out. Slot order is stable; an offline drive keeps its slot as
//! [`DriveRef::Absent`].

use crate::drive::DriveRef;
use std::sync::RwLock;

#[derive(Default)]
pub struct DriveRegistry {
    drives: RwLock<Vec<DriveRef>>,
}

impl DriveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_refs(drives: Vec<DriveRef>) -> Self {
        Self {
            drives: RwLock::new(drives),
        }
    }

    /// Replace the drive list. Called by the discovery layer when drives are
    /// added, removed, or marked offline.
    pub fn set_drives(&self, drives: Vec<DriveRef>) {
        *self.drives.write().unwrap() = drives;
    }

    /// Point-in-time copy of the drive list, order preserved.
    pub fn snapshot(&self) -> Vec<DriveRef> {
        self.drives.read().unwrap().clone()
    }

    pub fn drive_count(&self) -> usize {
        self.drives.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::LocalDrive;

    #[test]
    fn test_snapshot_is_detached() {
        let registry = DriveRegistry::from_refs(vec![
            DriveRef::present(LocalDrive::new("/tmp/d0")),
            DriveRef::Absent,
        ]);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].is_present());
        assert!(!snapshot[1].is_present());

        // Mutating the registry must not affect an existing snapshot.
        registry.set_drives(vec![DriveRef::Absent]);
        assert_eq!(registry.drive_count(), 1);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_order_preserved() {
        let registry = DriveRegistry::from_refs(vec![
            DriveRef::present(LocalDrive::new("/tmp/d0")),
            DriveRef::Absent,
            DriveRef::present(LocalDrive::new("/tmp/d2")),
        ]);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].endpoint(), "/tmp/d0");
        assert_eq!(snapshot[1].endpoint(), "");
        assert_eq!(snapshot[2].endpoint(), "/tmp/d2");
    }
}
