use thiserror::Error;

/// A single failed capture. Never fatal to a session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No display available")]
    NoDisplay,
    #[error("Screen grab failed: {0}")]
    Grab(String),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Screen capture is not supported in this build: {0}")]
    Unsupported(String),
}
