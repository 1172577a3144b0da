pub mod app_config;
pub mod brands;
pub mod config;
pub mod video;

pub use app_config::{AppConfig, Environment};
pub use brands::{load_brand_dictionary, BrandDictionary, BrandEntry, BrandsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use video::{
    video_url, ClassificationResult, EnrichedRecord, ExtractionResult, VideoSummary,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file {path}: {reason}")]
    BrandsFileParse { path: String, reason: String },

    #[error("brands validation failed: {0}")]
    Validation(String),
}
