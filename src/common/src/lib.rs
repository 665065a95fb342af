pub mod config;
pub mod dandiset;

pub use config::{Config, ConfigError, InstanceConfig};
pub use dandiset::{DANDISET_METADATA_FILE, LocalDandiset};
