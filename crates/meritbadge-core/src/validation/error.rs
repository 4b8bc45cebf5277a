use std::path::PathBuf;

use thiserror::Error;

use super::rules::FileType;

/// Hard failures while validating. Data-quality problems never end up here;
/// they are collected into a `ValidationResult` instead.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{file_type} file not found: {}", path.display())]
    NotFound { file_type: FileType, path: PathBuf },

    #[error("Failed to read {file_type} file: {source}")]
    Io {
        file_type: FileType,
        #[source]
        source: std::io::Error,
    },
}

impl ValidationError {
    pub(crate) fn io(file_type: FileType, source: std::io::Error) -> Self {
        ValidationError::Io { file_type, source }
    }

    pub(crate) fn open(file_type: FileType, path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ValidationError::NotFound { file_type, path }
        } else {
            ValidationError::io(file_type, source)
        }
    }
}
