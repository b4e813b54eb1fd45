//! Quorum thresholds and outcome reduction
//!
//! Every bucket operation collects one outcome per drive, indexed by registry
//! order, and reduces the array to a single logical result. Reduction is a
//! pure function of the outcomes, the threshold, and an operation-specific
//! set of error kinds excluded from blame attribution (an offline drive can
//! cost an operation its quorum, but it is never reported as the cause).

use crate::common::{Error, ErrorKind, Result};

/// Error kinds excluded from blame attribution for bucket operations.
pub const BUCKET_OP_IGNORED_ERRS: &[ErrorKind] = &[ErrorKind::DriveOffline];

/// Metadata enumeration additionally tolerates missing volumes: a drive
/// without the marker namespace is an empty contribution, not a fault.
pub const BUCKET_METADATA_OP_IGNORED_ERRS: &[ErrorKind] =
    &[ErrorKind::DriveOffline, ErrorKind::VolumeNotFound];

/// Read quorum for `drive_count` drives: N/2.
pub fn read_quorum(drive_count: usize) -> usize {
    drive_count / 2
}

/// Write quorum for `drive_count` drives: N/2 + 1. Zero drives degenerate to
/// a zero threshold so that an empty drive set trivially succeeds.
pub fn write_quorum(drive_count: usize) -> usize {
    if drive_count == 0 {
        0
    } else {
        drive_count / 2 + 1
    }
}

/// Reduce per-drive outcomes against a quorum threshold.
///
/// Returns `None` when at least `quorum` drives succeeded. Otherwise the
/// failure is attributed to the most common non-ignored error kind, ties
/// broken by first occurrence in drive order, provided that kind itself
/// reached the threshold; heterogeneous failures reduce to
/// [`Error::QuorumNotMet`].
pub fn reduce_quorum_errs<T>(
    results: &[Result<T>],
    ignored: &[ErrorKind],
    quorum: usize,
) -> Option<Error> {
    let successes = results.iter().filter(|r| r.is_ok()).count();
    if successes >= quorum {
        return None;
    }

    // Tally error kinds in drive order; the first representative of each
    // kind is the one reported.
    let mut tallies: Vec<(ErrorKind, usize, &Error)> = Vec::new();
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        let kind = err.kind();
        if ignored.contains(&kind) {
            continue;
        }
        match tallies.iter_mut().find(|(k, _, _)| *k == kind) {
            Some((_, count, _)) => *count += 1,
            None => tallies.push((kind, 1, err)),
        }
    }

    let mut top: Option<(usize, &Error)> = None;
    for (_, count, err) in &tallies {
        if top.map_or(true, |(best, _)| *count > best) {
            top = Some((*count, err));
        }
    }

    match top {
        Some((count, err)) if count >= quorum => Some(err.clone()),
        _ => Some(Error::QuorumNotMet {
            required: quorum,
            available: successes,
        }),
    }
}
