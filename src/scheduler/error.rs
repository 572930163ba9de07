use thiserror::Error;

use crate::archive::ArchiveError;
use crate::capture::CaptureError;

/// Failures surfaced by the capture scheduler
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please select a save location for the master archive before starting")]
    ConfigurationMissing,
    #[error("Cancelled")]
    UserCancelled,
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Archive error: {0}")]
    ArchiveWrite(#[source] ArchiveError),
    #[error("Master archive error: {0}")]
    BundleWrite(#[source] ArchiveError),
}
