use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::DynamicImage;

use super::screen::{select_monitor, ScreenSource};
use super::{CaptureArtifact, CaptureError, Quality};
use crate::util::names::artifact_file_name;

/// Width of every stored still
pub const TARGET_WIDTH: u32 = 500;
/// Height of every stored still
pub const TARGET_HEIGHT: u32 = 310;

const ARTIFACT_EXTENSION: &str = "jpg";

/// Produces one encoded still per call
#[derive(Clone)]
pub struct CaptureUnit {
    source: Arc<dyn ScreenSource>,
    output_dir: PathBuf,
    quality: Quality,
}

impl CaptureUnit {
    pub fn new(source: Arc<dyn ScreenSource>, output_dir: PathBuf, quality: Quality) -> Self {
        Self {
            source,
            output_dir,
            quality,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Grab the display under the pointer and store it as a grayscale JPEG.
    ///
    /// Either a complete file is written or nothing is left behind.
    pub fn capture(&self) -> Result<CaptureArtifact, CaptureError> {
        let monitors = self.source.monitors()?;
        let monitor = select_monitor(&monitors, self.source.pointer())
            .ok_or(CaptureError::NoDisplay)?;

        let raw = self.source.grab(monitor)?;
        let captured_at = Local::now();
        let encoded = encode_still(DynamicImage::ImageRgba8(raw), self.quality)?;

        fs::create_dir_all(&self.output_dir)?;
        let final_path = self
            .output_dir
            .join(artifact_file_name(captured_at, ARTIFACT_EXTENSION));

        let mut tmp = tempfile::Builder::new()
            .prefix(".ss-")
            .suffix(".part")
            .tempfile_in(&self.output_dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        // Dropping the temp file on error removes the partial write.
        tmp.persist_noclobber(&final_path)
            .map_err(|e| CaptureError::Io(e.error))?;

        tracing::debug!(
            path = %final_path.display(),
            monitor = %monitor.name,
            bytes = encoded.len(),
            "Captured still"
        );
        Ok(CaptureArtifact::new(final_path, captured_at))
    }
}

/// Grayscale, downsample with Lanczos, encode as JPEG at the given quality
pub(crate) fn encode_still(img: DynamicImage, quality: Quality) -> Result<Vec<u8>, CaptureError> {
    let gray = img.to_luma8();
    let resized = imageops::resize(&gray, TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3);

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality.level());
    DynamicImage::ImageLuma8(resized).write_with_encoder(encoder)?;
    Ok(buf)
}
