//! Runtime configuration
//!
//! Defaults that would otherwise be hidden literals: the fallback probe, the
//! metadata file naming convention and the output format. Loadable from a
//! JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use chanmap_core::LocalProbe;
use serde::{Deserialize, Serialize};

use crate::error::{ChanMapError, ChanMapResult};
use crate::writer::OutputFormat;

/// Default suffix of session metadata files (`<basename>.session.json`)
pub const DEFAULT_SESSION_SUFFIX: &str = ".session.json";

/// Default suffix of Neuroscope parameter files (`<basename>.xml`)
pub const DEFAULT_XML_SUFFIX: &str = ".xml";

/// Channel map generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanMapConfig {
    /// Probe used when no probe name and no metadata file are found
    pub default_probe: LocalProbe,
    /// Suffix appended to the basename when looking for session metadata
    pub session_suffix: String,
    /// Suffix appended to the basename when looking for Neuroscope XML
    pub xml_suffix: String,
    /// Artifact format when the request does not choose one
    pub output_format: OutputFormat,
}

impl Default for ChanMapConfig {
    fn default() -> Self {
        Self {
            default_probe: LocalProbe::NeuroPixels1Checkerboard,
            session_suffix: DEFAULT_SESSION_SUFFIX.to_string(),
            xml_suffix: DEFAULT_XML_SUFFIX.to_string(),
            output_format: OutputFormat::Mat,
        }
    }
}

impl ChanMapConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ChanMapError::Config`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> ChanMapResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ChanMapError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ChanMapError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Set the fallback probe
    #[must_use]
    pub fn with_default_probe(mut self, probe: LocalProbe) -> Self {
        self.default_probe = probe;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}
