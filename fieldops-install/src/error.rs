//! Error types for fieldops-install entry points

use crate::backend::BackendError;
use crate::services::MediaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading inputs and wiring the pipeline
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid media argument '{0}': expected <kind>=<path>")]
    MediaArg(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] fieldops_common::Error),
}

pub type InstallResult<T> = Result<T, InstallError>;
