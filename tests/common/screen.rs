//! Scripted [`ScreenSource`] for driving the scheduler without a display

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};
use screenlog::capture::{CaptureError, MonitorInfo, ScreenSource};

/// Screen that yields `frames` grabs, then fails every grab after that
pub struct ScriptedScreen {
    remaining: AtomicUsize,
    attempts: AtomicUsize,
}

impl ScriptedScreen {
    pub fn with_frames(frames: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(frames),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::with_frames(usize::MAX)
    }

    /// Number of grab calls so far, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ScreenSource for ScriptedScreen {
    fn monitors(&self) -> Result<Vec<MonitorInfo>, CaptureError> {
        Ok(vec![MonitorInfo {
            id: 1,
            name: "scripted".to_string(),
            x: 0,
            y: 0,
            width: 160,
            height: 100,
            is_primary: true,
        }])
    }

    fn pointer(&self) -> Option<(i32, i32)> {
        Some((5, 5))
    }

    fn grab(&self, monitor: &MonitorInfo) -> Result<RgbaImage, CaptureError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        let had_frame = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !had_frame {
            return Err(CaptureError::Grab("scripted frames exhausted".to_string()));
        }
        let shade = (attempt % 200) as u8;
        Ok(RgbaImage::from_pixel(
            monitor.width,
            monitor.height,
            Rgba([shade, 80, 160, 255]),
        ))
    }
}
