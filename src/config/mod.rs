mod settings;

pub use settings::{ConfigError, DEFAULT_CONFIG_FILE_NAME, Settings};
