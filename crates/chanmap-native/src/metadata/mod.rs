//! Session metadata import
//!
//! Reads the electrode group description of a recording session from one of
//! two formats:
//!
//! - [`session`]: structured JSON session record (`<basename>.session.json`)
//! - [`neuroscope`]: Neuroscope parameter XML (`<basename>.xml`)
//!
//! Both produce a [`SessionMetadata`]: the probe family name exactly as
//! written in the file, the electrode groups and, when spike groups are
//! listed, the raw listings used for connectivity pruning. The family name
//! is validated later against [`chanmap_core::ProbeFamily`].

pub mod neuroscope;
pub mod session;

use std::path::{Path, PathBuf};

use chanmap_core::{ElectrodeGroups, RawParams};
use tracing::debug;

use crate::error::ChanMapResult;

/// Supported metadata file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetadataFormat {
    /// JSON session record
    Session,
    /// Neuroscope parameter XML
    Neuroscope,
}

impl MetadataFormat {
    /// Detect the format from a file extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Session),
            "xml" => Some(Self::Neuroscope),
            _ => None,
        }
    }

    /// Short format name for log output
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Session => "session JSON",
            Self::Neuroscope => "Neuroscope XML",
        }
    }
}

/// A metadata file together with its detected format
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataSource {
    /// File on disk
    pub path: PathBuf,
    /// Format used to parse it
    pub format: MetadataFormat,
}

impl MetadataSource {
    /// Create a source
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: MetadataFormat) -> Self {
        Self { path: path.into(), format }
    }
}

/// Electrode layout description extracted from session metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionMetadata {
    /// Probe family name as written in the file
    pub family: String,
    /// Per-group 0-based channel lists
    pub groups: ElectrodeGroups,
    /// Anatomical and spike group listings, if spike groups are present
    pub raw_params: Option<RawParams>,
}

/// Read and parse a metadata file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is malformed, or lacks a
/// required field.
pub fn load(source: &MetadataSource) -> ChanMapResult<SessionMetadata> {
    debug!("Reading {} metadata from {}", source.format.name(), source.path.display());
    let text = std::fs::read_to_string(&source.path)?;
    match source.format {
        MetadataFormat::Session => session::parse_session_str(&text, &source.path),
        MetadataFormat::Neuroscope => neuroscope::parse_neuroscope_str(&text, &source.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            MetadataFormat::from_path(Path::new("rat01/rat01.session.json")),
            Some(MetadataFormat::Session)
        );
        assert_eq!(
            MetadataFormat::from_path(Path::new("rat01/rat01.XML")),
            Some(MetadataFormat::Neuroscope)
        );
        assert_eq!(MetadataFormat::from_path(Path::new("rat01/rat01.mat")), None);
        assert_eq!(MetadataFormat::from_path(Path::new("rat01/rat01")), None);
    }
}
