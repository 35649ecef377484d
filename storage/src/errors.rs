// Error handling framework for storage backends

use thiserror::Error;

/// Storage backend errors
///
/// Not-found is not discriminated from other protocol failures: FTP reports
/// both through command status replies and the adapter forwards the reply
/// text as-is. Callers that need differentiated retry behavior cannot get
/// it from this layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("FTP connection failed: {0}")]
    ConnectionFailed(String),

    #[error("FTP authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("FTP operation failed: {0}")]
    OperationFailed(String),

    #[error("Directory listing failed: {0}")]
    ListingFailed(String),

    #[error("No modification time available for '{0}'")]
    MissingTimestamp(String),

    #[error("Invalid storage base path '{path}': {reason}")]
    InvalidBasePath { path: String, reason: String },

    #[error("Operation not supported by this backend: {operation}")]
    NotSupported { operation: &'static str },
}

impl StorageError {
    /// Returns true for the capability-gap variant, letting hosts branch
    /// on backend capability instead of matching error text.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, StorageError::NotSupported { .. })
    }
}
