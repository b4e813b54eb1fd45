//! Filesystem-backed drive
//!
//! A volume is a directory under the drive root; nested volume names such as
//! the deleted-bucket markers map to nested directories. A missing root means
//! the drive is unmounted, and every operation reports it offline rather than
//! inventing per-call I/O errors.

use crate::common::{timestamp_now, Error, Result};
use crate::drive::{DriveStore, VolumeInfo};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct LocalDrive {
    root: PathBuf,
    endpoint: String,
}

impl LocalDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let endpoint = root.display().to_string();
        Self { root, endpoint }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::DriveOffline)
        }
    }

    /// Resolve a volume name to its on-drive path. Each `/`-separated
    /// component must be a plain name; traversal components are rejected.
    fn volume_path(&self, volume: &str) -> Result<PathBuf> {
        if volume.is_empty() {
            return Err(Error::InvalidBucketName("empty volume name".into()));
        }
        let mut path = self.root.clone();
        for part in volume.split('/') {
            if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
                return Err(Error::InvalidBucketName(volume.to_string()));
            }
            path.push(part);
        }
        Ok(path)
    }
}

/// Classify a raw I/O failure into the drive-outcome taxonomy.
fn classify_io(err: &io::Error, volume: &str) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::VolumeNotFound(volume.to_string()),
        io::ErrorKind::AlreadyExists => Error::VolumeExists(volume.to_string()),
        _ => Error::Corrupt(format!("{volume}: {err}")),
    }
}

fn created_time(meta: &fs::Metadata) -> DateTime<Utc> {
    meta.created()
        .or_else(|_| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| timestamp_now())
}

impl DriveStore for LocalDrive {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn stat_volume(&self, volume: &str) -> Result<VolumeInfo> {
        self.ensure_root()?;
        let path = self.volume_path(volume)?;
        let meta = fs::metadata(&path).map_err(|e| classify_io(&e, volume))?;
        if !meta.is_dir() {
            return Err(Error::Corrupt(format!("{volume}: not a directory")));
        }
        Ok(VolumeInfo {
            name: volume.to_string(),
            created: created_time(&meta),
        })
    }

    fn make_volume(&self, volume: &str) -> Result<()> {
        self.ensure_root()?;
        let path = self.volume_path(volume)?;
        if path.exists() {
            return Err(Error::VolumeExists(volume.to_string()));
        }
        fs::create_dir_all(&path).map_err(|e| classify_io(&e, volume))
    }

    fn delete_volume(&self, volume: &str, force: bool) -> Result<()> {
        self.ensure_root()?;
        let path = self.volume_path(volume)?;
        let mut entries = fs::read_dir(&path).map_err(|e| classify_io(&e, volume))?;
        if entries.next().is_some() && !force {
            return Err(Error::VolumeNotEmpty(volume.to_string()));
        }
        fs::remove_dir_all(&path).map_err(|e| classify_io(&e, volume))
    }

    fn list_volumes(&self, parent: &str) -> Result<Vec<VolumeInfo>> {
        self.ensure_root()?;
        let dir = if parent.is_empty() {
            self.root.clone()
        } else {
            self.volume_path(parent)?
        };

        let entries = fs::read_dir(&dir).map_err(|e| classify_io(&e, parent))?;
        let mut volumes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| classify_io(&e, parent))?;
            let meta = entry.metadata().map_err(|e| classify_io(&e, parent))?;
            if !meta.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            volumes.push(VolumeInfo {
                name,
                created: created_time(&meta),
            });
        }
        Ok(volumes)
    }
}
