//! Capture Unit: one grayscale, downsampled still per tick.
//!
//! The display backend sits behind [`ScreenSource`] so the unit can be driven
//! by a real screen (feature `screen`) or by a synthetic source in tests.

mod artifact;
mod error;
mod quality;
pub mod screen;
mod unit;

pub use artifact::CaptureArtifact;
pub use error::CaptureError;
pub use quality::Quality;
pub use screen::{
    default_screen_source, select_monitor, MonitorInfo, ScreenSource, UnavailableScreen,
};
pub use unit::{CaptureUnit, TARGET_HEIGHT, TARGET_WIDTH};
