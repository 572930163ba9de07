//! Display enumeration and raw pixel grabs

use std::sync::Arc;

use image::RgbaImage;

use super::CaptureError;

/// Bounds of one attached display in virtual-desktop coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl MonitorInfo {
    /// Whether a point lies inside this display (right/bottom edges exclusive)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        let left = self.x as i64;
        let top = self.y as i64;
        x >= left && x < left + self.width as i64 && y >= top && y < top + self.height as i64
    }
}

/// Source of screen pixels
pub trait ScreenSource: Send + Sync {
    /// All attached displays
    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureError>;

    /// Current pointer position, if the platform can report it
    fn pointer(&self) -> Option<(i32, i32)>;

    /// Grab the full contents of one display
    fn grab(&self, monitor: &MonitorInfo) -> Result<RgbaImage, CaptureError>;
}

/// Pick the display under the pointer, falling back to the primary display
/// (or the first one when none is flagged primary).
pub fn select_monitor(monitors: &[MonitorInfo], pointer: Option<(i32, i32)>) -> Option<&MonitorInfo> {
    if let Some((x, y)) = pointer {
        if let Some(m) = monitors.iter().find(|m| m.contains(x, y)) {
            return Some(m);
        }
    }
    monitors
        .iter()
        .find(|m| m.is_primary)
        .or_else(|| monitors.first())
}

/// Source used when the binary is built without a display backend
#[derive(Debug, Default)]
pub struct UnavailableScreen;

impl ScreenSource for UnavailableScreen {
    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureError> {
        Err(CaptureError::Unsupported(
            "rebuild with the `screen` feature".to_string(),
        ))
    }

    fn pointer(&self) -> Option<(i32, i32)> {
        None
    }

    fn grab(&self, _monitor: &MonitorInfo) -> Result<RgbaImage, CaptureError> {
        Err(CaptureError::Unsupported(
            "rebuild with the `screen` feature".to_string(),
        ))
    }
}

#[cfg(feature = "screen")]
mod desktop {
    use image::RgbaImage;
    use mouse_position::mouse_position::Mouse;
    use xcap::Monitor;

    use super::{MonitorInfo, ScreenSource};
    use crate::capture::CaptureError;

    fn grab_err(e: impl std::fmt::Display) -> CaptureError {
        CaptureError::Grab(e.to_string())
    }

    /// Real displays via `xcap`, pointer via `mouse_position`
    #[derive(Debug, Default)]
    pub struct DesktopScreen;

    impl ScreenSource for DesktopScreen {
        fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureError> {
            let monitors = Monitor::all().map_err(grab_err)?;
            monitors
                .iter()
                .map(|m| {
                    Ok(MonitorInfo {
                        id: m.id().map_err(grab_err)?,
                        name: m.name().unwrap_or_default(),
                        x: m.x().map_err(grab_err)?,
                        y: m.y().map_err(grab_err)?,
                        width: m.width().map_err(grab_err)?,
                        height: m.height().map_err(grab_err)?,
                        is_primary: m.is_primary().unwrap_or(false),
                    })
                })
                .collect()
        }

        fn pointer(&self) -> Option<(i32, i32)> {
            match Mouse::get_mouse_position() {
                Mouse::Position { x, y } => Some((x, y)),
                Mouse::Error => None,
            }
        }

        fn grab(&self, monitor: &MonitorInfo) -> Result<RgbaImage, CaptureError> {
            let monitors = Monitor::all().map_err(grab_err)?;
            let target = monitors
                .into_iter()
                .find(|m| m.id().ok() == Some(monitor.id))
                .ok_or(CaptureError::NoDisplay)?;
            let shot = target.capture_image().map_err(grab_err)?;
            let (width, height) = (shot.width(), shot.height());
            // xcap may pin a different `image` release; go through raw bytes.
            RgbaImage::from_raw(width, height, shot.into_raw())
                .ok_or_else(|| CaptureError::Grab("invalid RGBA buffer".to_string()))
        }
    }
}

#[cfg(feature = "screen")]
pub use desktop::DesktopScreen;

/// The screen source for this build
pub fn default_screen_source() -> Arc<dyn ScreenSource> {
    #[cfg(feature = "screen")]
    {
        Arc::new(DesktopScreen)
    }
    #[cfg(not(feature = "screen"))]
    {
        tracing::warn!("Built without the `screen` feature; captures will fail");
        Arc::new(UnavailableScreen)
    }
}
