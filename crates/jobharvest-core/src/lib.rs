//! Domain types and configuration shared by every jobharvest crate.

pub mod app_config;
pub mod config;
pub mod harvest;
pub mod listings;
pub mod platforms;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, MAX_RETENTION_DAYS};
pub use harvest::{HarvestResult, PlatformSummary};
pub use listings::{make_unique_id, NormalizedListing, RawListing, SalaryRange, UNIQUE_ID_MAX_LEN};
pub use platforms::{
    load_platforms, HarvestConfig, Platform, PlatformConfig, PlatformsFile, SearchQuery,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platforms file {path}: {source}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[from] serde_yaml::Error),

    #[error("platform config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}
