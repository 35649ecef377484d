// Storage module for pluggable file-storage backends
// Provides the capability trait consumed by the WOPI host and its implementations

pub mod ftp;

use crate::errors::StorageError;
use chrono::{DateTime, Utc};
use std::io::Read;

pub use ftp::{FtpFileReader, FtpFileStorage};

/// FileStorage defines the operation set every storage backend must expose
/// so the host can swap backends transparently.
///
/// The failure contract is deliberately asymmetric and backends must keep
/// it: the metadata and transfer operations swallow failures into sentinel
/// returns (`-1`, `None`), while listing and version derivation propagate
/// errors to the caller. Backends that do not implement an operation return
/// `StorageError::NotSupported` rather than silently succeeding.
pub trait FileStorage: Send + Sync {
    /// Size of the named file in bytes, or `-1` on any failure (including
    /// not-found, which this layer cannot distinguish from other errors).
    fn file_size(&self, name: &str) -> i64;

    /// Last modification time of the named file in UTC, or `None` on any
    /// failure.
    fn last_modified(&self, name: &str) -> Option<DateTime<Utc>>;

    /// A readable byte stream over the named file, or `None` on any
    /// failure. The caller owns the stream: it must read it to completion
    /// (or abort) and drop it; the backend does not buffer the file.
    fn get_file(&self, name: &str) -> Option<Box<dyn Read + Send>>;

    /// Store all bytes from `stream` under the named file. Returns `0` on
    /// success and `-1` on any failure. A failure mid-copy leaves the
    /// remote file in an indeterminate state; no rollback is attempted.
    fn upload_file(&self, name: &str, stream: &mut dyn Read) -> i32;

    /// Names of all files under the storage root, in the order the server
    /// emits them, one entry per listing line. Errors propagate.
    fn file_names(&self) -> Result<Vec<String>, StorageError>;

    /// Version string for the named file, derived from its modification
    /// time in ISO-8601 round-trip form. Errors propagate, including a
    /// missing modification time.
    fn file_version(&self, name: &str) -> Result<String, StorageError>;

    /// Whether the named file is read-only. No I/O is performed for
    /// backends that treat every file as writable.
    fn read_only_status(&self, name: &str) -> bool;

    /// Names of the entries of the storage root directory.
    fn get_directory(&self) -> Result<Vec<String>, StorageError>;

    /// Delete the named file.
    fn delete_file(&self, name: &str) -> Result<(), StorageError>;

    /// Create the named file, replacing any existing content.
    fn create_or_overwrite_file(
        &self,
        name: &str,
        stream: &mut dyn Read,
    ) -> Result<(), StorageError>;

    /// Rename the named file to `new_name`.
    fn rename_file(&self, name: &str, new_name: &str) -> Result<(), StorageError>;
}

/// Formats a timestamp in ISO-8601 round-trip form with seven fractional
/// digits, e.g. `2024-01-15T10:30:00.0000000Z`.
pub fn format_version(timestamp: DateTime<Utc>) -> String {
    // 100-nanosecond ticks, matching the round-trip precision WOPI
    // clients compare version strings against. Leap seconds push
    // timestamp_subsec_nanos past one second; clamp to keep the fixed
    // seven-digit width.
    let ticks = (timestamp.timestamp_subsec_nanos() / 100).min(9_999_999);
    format!("{}.{:07}Z", timestamp.format("%Y-%m-%dT%H:%M:%S"), ticks)
}
