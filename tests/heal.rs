//! Healing tests over temp-dir-backed local drives

use minivol::coordinator::{BucketCoordinator, DriveState, HealOpts, MakeBucketOptions};
use minivol::drive::{DriveRef, DriveRegistry, DriveStore, LocalDrive, RESERVED_SYS_VOLUME};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn node(drive_count: usize) -> (TempDir, Arc<DriveRegistry>, BucketCoordinator) {
    let dir = TempDir::new().unwrap();
    let refs = (0..drive_count)
        .map(|i| {
            let root = dir.path().join(format!("d{i}"));
            std::fs::create_dir_all(&root).unwrap();
            DriveRef::present(LocalDrive::new(root))
        })
        .collect();
    let registry = Arc::new(DriveRegistry::from_refs(refs));
    let coordinator = BucketCoordinator::new(Arc::clone(&registry));
    (dir, registry, coordinator)
}

fn drive_root(dir: &TempDir, i: usize) -> PathBuf {
    dir.path().join(format!("d{i}"))
}

fn states(infos: &[minivol::coordinator::HealDriveInfo]) -> Vec<DriveState> {
    infos.iter().map(|i| i.state).collect()
}

#[tokio::test]
async fn test_heal_fills_missing_volumes_only() {
    let (dir, _registry, coordinator) = node(4);

    // Volume exists on drives 0 and 1; 2 and 3 fell behind.
    for i in 0..2 {
        let drive = LocalDrive::new(drive_root(&dir, i));
        drive.make_volume("b1").unwrap();
    }

    let report = coordinator
        .heal_bucket("b1", &HealOpts::default())
        .await
        .unwrap();

    assert_eq!(report.bucket, "b1");
    assert_eq!(report.drive_count, 4);
    assert_eq!(report.set_count, -1);
    assert_eq!(
        states(&report.before),
        vec![
            DriveState::Ok,
            DriveState::Ok,
            DriveState::Missing,
            DriveState::Missing,
        ]
    );
    assert_eq!(states(&report.after), vec![DriveState::Ok; 4]);

    for i in 0..4 {
        let drive = LocalDrive::new(drive_root(&dir, i));
        assert!(drive.stat_volume("b1").is_ok(), "drive {i} not healed");
    }
}

#[tokio::test]
async fn test_heal_dry_run_never_mutates() {
    let (dir, _registry, coordinator) = node(3);

    let drive = LocalDrive::new(drive_root(&dir, 0));
    drive.make_volume("b1").unwrap();

    for remove in [false, true] {
        let report = coordinator
            .heal_bucket(
                "b1",
                &HealOpts {
                    dry_run: true,
                    remove,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            states(&report.before),
            vec![DriveState::Ok, DriveState::Missing, DriveState::Missing]
        );
    }

    // No drive gained or lost the volume.
    assert!(LocalDrive::new(drive_root(&dir, 0)).stat_volume("b1").is_ok());
    for i in 1..3 {
        assert!(LocalDrive::new(drive_root(&dir, i))
            .stat_volume("b1")
            .is_err());
    }
}

#[tokio::test]
async fn test_heal_skips_offline_and_corrupt_drives() {
    let dir = TempDir::new().unwrap();
    let mut refs = Vec::new();
    for i in 0..3 {
        let root = dir.path().join(format!("d{i}"));
        std::fs::create_dir_all(&root).unwrap();
        refs.push(DriveRef::present(LocalDrive::new(root)));
    }
    refs.push(DriveRef::Absent);
    let coordinator = BucketCoordinator::new(Arc::new(DriveRegistry::from_refs(refs)));

    // Drive 0 holds the volume, drive 1 fell behind, drive 2 is corrupt (the
    // volume path is a regular file), drive 3 is offline.
    LocalDrive::new(drive_root(&dir, 0)).make_volume("b1").unwrap();
    std::fs::write(drive_root(&dir, 2).join("b1"), b"junk").unwrap();

    let report = coordinator
        .heal_bucket("b1", &HealOpts::default())
        .await
        .unwrap();

    assert_eq!(
        states(&report.before),
        vec![
            DriveState::Ok,
            DriveState::Missing,
            DriveState::Corrupt,
            DriveState::Offline,
        ]
    );
    assert_eq!(
        states(&report.after),
        vec![
            DriveState::Ok,
            DriveState::Ok,
            DriveState::Corrupt,
            DriveState::Offline,
        ]
    );

    // The corrupt entry was left for a drive-level repair.
    assert_eq!(std::fs::read(drive_root(&dir, 2).join("b1")).unwrap(), b"junk");
    assert_eq!(report.after[3].endpoint, "");
}

#[tokio::test]
async fn test_heal_remove_cleans_dangling_bucket() {
    let (dir, _registry, coordinator) = node(3);

    // Dangling: one drive still holds the bucket, with content.
    let drive = LocalDrive::new(drive_root(&dir, 1));
    drive.make_volume("stale").unwrap();
    std::fs::write(drive_root(&dir, 1).join("stale").join("obj"), b"x").unwrap();

    let report = coordinator
        .heal_bucket(
            "stale",
            &HealOpts {
                dry_run: false,
                remove: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        states(&report.before),
        vec![DriveState::Missing, DriveState::Ok, DriveState::Missing]
    );

    for i in 0..3 {
        assert!(LocalDrive::new(drive_root(&dir, i))
            .stat_volume("stale")
            .is_err());
    }
}

#[tokio::test]
async fn test_heal_remove_skips_unanimously_missing_bucket() {
    let (dir, _registry, coordinator) = node(3);

    let report = coordinator
        .heal_bucket(
            "ghost",
            &HealOpts {
                dry_run: false,
                remove: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(states(&report.before), vec![DriveState::Missing; 3]);
    assert_eq!(states(&report.after), vec![DriveState::Missing; 3]);

    // Nothing was created or deleted anywhere.
    for i in 0..3 {
        let drive = LocalDrive::new(drive_root(&dir, i));
        assert!(drive.list_volumes("").unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_heal_reserved_bucket_reports_ok_without_stat() {
    let (_dir, _registry, coordinator) = node(2);

    let report = coordinator
        .heal_bucket(RESERVED_SYS_VOLUME, &HealOpts::default())
        .await
        .unwrap();
    assert_eq!(states(&report.before), vec![DriveState::Ok; 2]);
    assert_eq!(states(&report.after), vec![DriveState::Ok; 2]);
}

#[tokio::test]
async fn test_heal_is_idempotent() {
    let (dir, _registry, coordinator) = node(3);

    coordinator
        .create_bucket("b1", &MakeBucketOptions::default())
        .await
        .unwrap();
    std::fs::remove_dir_all(drive_root(&dir, 2).join("b1")).unwrap();

    for _ in 0..2 {
        let report = coordinator
            .heal_bucket("b1", &HealOpts::default())
            .await
            .unwrap();
        assert_eq!(states(&report.after), vec![DriveState::Ok; 3]);
    }
}
