//! Error types produced while loading the content corpus.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;
use travelmap_core::ValidationError;

use crate::MarkupError;

/// Errors that abort a corpus load.
///
/// Every variant is fatal to the whole batch: callers either receive every
/// entity in the directory or none of them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    /// A record broke a schema or uniqueness rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A source directory or file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The metadata block of a place file was not valid YAML.
    #[error("failed to parse metadata block in {file}: {source}")]
    Metadata {
        /// Source file name.
        file: String,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A route file was not valid JSON.
    #[error("failed to parse route file {file}: {source}")]
    RouteJson {
        /// Source file name.
        file: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Rendering a place body failed, so no sanitized markup exists for it.
    #[error("failed to render body of {file}: {source}")]
    Markup {
        /// Source file name.
        file: String,
        /// Underlying rendering error.
        source: MarkupError,
    },
}

impl ContentError {
    /// Return the source file name associated with the error, if known.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.file(),
            Self::Read { path, .. } => path.file_name(),
            Self::Metadata { file, .. }
            | Self::RouteJson { file, .. }
            | Self::Markup { file, .. } => Some(file),
        }
    }
}
