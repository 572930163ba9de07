//! Utility modules

pub mod names;
pub mod paths;

pub use names::{batch_label, sanitize_label};
pub use paths::{config_path, data_dir, init_data_dir, log_file_path, logs_dir};
