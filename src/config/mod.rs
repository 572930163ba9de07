mod settings;

pub use settings::{save_master_dir, save_user_profile, Config, ConfigError, EXAMPLE_CONFIG};
