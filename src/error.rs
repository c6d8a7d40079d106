//! Error types for scanning, materializing and converting LineMOD samples.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while indexing or converting a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The run cannot start, e.g. the source root is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An annotation file exists but is not valid YAML of the expected shape.
    #[error("failed to parse annotation file {path}: {source}")]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An annotation file parsed but an entry is unusable.
    #[error("invalid annotation in {path} for image {image_id}: {reason}")]
    InvalidAnnotation {
        path: PathBuf,
        image_id: u32,
        reason: String,
    },

    /// The dataset config could not be serialized.
    #[error("failed to write dataset config {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A sample image could not be read or decoded.
    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sample index {index} out of range for dataset of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DatasetError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Wraps an I/O error together with the path that caused it.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
