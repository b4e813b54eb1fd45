//! Utility functions for minivol

use crate::drive::RESERVED_SYS_VOLUME;
use chrono::{DateTime, Utc};

/// Validate a bucket name against the S3-style rules enforced for volumes:
/// 3-63 characters, lowercase alphanumerics plus `-` and `.`, starting and
/// ending with an alphanumeric. The reserved system namespace is rejected.
pub fn validate_bucket_name(bucket: &str) -> crate::Result<()> {
    if bucket == RESERVED_SYS_VOLUME || bucket.starts_with(RESERVED_SYS_VOLUME) {
        return Err(crate::Error::InvalidBucketName(format!(
            "{}: reserved namespace",
            bucket
        )));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(crate::Error::InvalidBucketName(format!(
            "{}: must be 3-63 characters",
            bucket
        )));
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(crate::Error::InvalidBucketName(format!(
            "{}: only lowercase letters, digits, '-' and '.' allowed",
            bucket
        )));
    }

    let first = bucket.chars().next().unwrap_or('-');
    let last = bucket.chars().last().unwrap_or('-');
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(crate::Error::InvalidBucketName(format!(
            "{}: must start and end with a letter or digit",
            bucket
        )));
    }

    Ok(())
}

/// Is this a name listings should surface as a bucket?
pub fn is_listable_bucket_name(name: &str) -> bool {
    validate_bucket_name(name).is_ok()
}

/// Current UTC time, the reference clock for volume timestamps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now()
}
