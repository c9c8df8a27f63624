//! Error types emitted by the travel map CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use travelmap_content::ContentError;

/// Errors emitted by the travel map CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// The route reference policy was not recognised.
    #[error("invalid {field} (set --{field} or {env}): {reason}")]
    InvalidPolicy {
        field: &'static str,
        env: &'static str,
        reason: String,
    },
    /// The content root does not exist or is not a directory.
    #[error("{field} path {path:?} does not exist or is not a directory")]
    MissingContentRoot {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The content root could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectContentRoot {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Loading the corpus failed.
    #[error("failed to load content: {0}")]
    Content(#[from] ContentError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
