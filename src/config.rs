//! Settings for selecting languages and parsing key paths, loaded from `.t9n.json`.
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    T9nSettings,
    ValidationError,
};
