//! Error types for the drive core.

/// Result type alias
pub type Result<T> = std::result::Result<T, DriveError>;

/// Drive core error types.
///
/// Only fatal configuration problems surface as errors. Steady-state data
/// gaps (a missing encoder reading, an unavailable history sample) are
/// reported as `None` each cycle and handled by the caller.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// Dead reckoning is underdetermined without a full diagonal pair of
    /// drive encoders.
    #[error("position prediction requires drive encoders on at least one diagonal wheel pair")]
    InsufficientDriveEncoders,

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    ConfigRead {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse config {path}: {reason}")]
    ConfigParse {
        /// Path that was attempted
        path: String,
        /// Underlying parse error message
        reason: String,
    },
}
