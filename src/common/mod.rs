//! Common utilities and types shared across minivol

pub mod config;
pub mod error;
pub mod utils;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use utils::{is_listable_bucket_name, timestamp_now, validate_bucket_name};
