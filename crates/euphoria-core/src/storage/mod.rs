//! Settings persistence.

pub mod config;

pub use config::{
    default_settings_path, load_settings_from, read_settings_from, save_settings_to, ConfigError,
    Settings,
};
