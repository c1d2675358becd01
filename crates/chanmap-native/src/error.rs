//! Error types for channel map generation
//!
//! Every failure is fatal for the run: nothing is written once an error is
//! returned.

use std::path::PathBuf;

use chanmap_core::{LayoutError, ProbeNameError};
use thiserror::Error;

/// Errors raised while resolving, building or writing a channel map.
#[derive(Debug, Error)]
pub enum ChanMapError {
    /// Probe or probe family name outside the supported enumeration
    #[error(transparent)]
    ProbeName(#[from] ProbeNameError),

    /// Metadata file was named explicitly but is not on disk
    #[error("Metadata file does not exist: {}", path.display())]
    MetadataNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Metadata file extension is not one of the supported formats
    #[error("Unsupported metadata file extension '{extension}' for {}: expected .json (session) or .xml (Neuroscope)", path.display())]
    UnsupportedMetadataFormat {
        /// Offending file
        path: PathBuf,
        /// Extension found (empty if none)
        extension: String,
    },

    /// Required metadata field is absent
    #[error("Required metadata field '{field}' missing from {}", path.display())]
    MissingField {
        /// Dotted path of the field
        field: &'static str,
        /// Metadata file
        path: PathBuf,
    },

    /// Metadata field is present but unusable
    #[error("Invalid metadata field '{field}' in {}: {reason}", path.display())]
    InvalidField {
        /// Dotted path of the field
        field: &'static str,
        /// Metadata file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Neuroscope XML could not be parsed
    #[error("XML error in {}: {reason}", path.display())]
    Xml {
        /// Metadata file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// JSON parse or encode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Electrode groups do not form a valid layout
    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// Channel map artifact could not be written
    #[error("Failed to write channel map to {}: {source}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Channel map artifact could not be decoded
    #[error("Malformed channel map file {}: {reason}", path.display())]
    MalformedArtifact {
        /// File being read
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Configuration file problem
    #[error("Invalid configuration {}: {reason}", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for channel map operations
pub type ChanMapResult<T> = Result<T, ChanMapError>;
