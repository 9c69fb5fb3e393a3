//! Error types for annotation sessions

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotatorError>;

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("no image loaded")]
    NoImageLoaded,

    #[error("failed to load image {path}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to export measurements to {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
