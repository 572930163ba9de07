//! Path utilities for screenlog data directories

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global storage for custom data directory path
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the data directory with an optional custom path.
/// Must be called early in main() before any other path functions are used.
/// If custom_path is None, uses the default ~/.screenlog location.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        let existing = DATA_DIR
            .get()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::debug!(
            path = %path.display(),
            existing = %existing,
            "Data directory already initialized"
        );
    }
}

/// Get the default data directory path (~/.screenlog)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".screenlog"))
        .unwrap_or_else(|| PathBuf::from(".screenlog"))
}

/// Get the base data directory.
/// Returns the custom path if set via init_data_dir(), otherwise ~/.screenlog
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

/// Get the logs directory (~/.screenlog/logs)
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the default log file path (~/.screenlog/logs/screenlog.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join("screenlog.log")
}

/// Get the config file path (~/.screenlog/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Temporary screenshot directory under an arbitrary root.
pub fn temp_dir_in(root: &Path) -> PathBuf {
    root.join("temp_screenshots")
}

/// Per-batch archive directory under an arbitrary root.
pub fn archives_dir_in(root: &Path) -> PathBuf {
    root.join("archives")
}

/// Return `dir/name.ext`, or `dir/name-N.ext` with the first free N when the
/// plain name is already taken.
pub fn unique_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{n}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
