//! Metadata resolution
//!
//! Decides where the channel layout comes from:
//!
//! 1. An explicit probe name selects a built-in layout; any metadata file is
//!    ignored.
//! 2. An explicit metadata file must exist and be `.json` or `.xml`.
//! 3. Otherwise `<save_path>/<basename>.session.json`, then
//!    `<save_path>/<basename>.xml`, and finally the configured fallback
//!    probe.
//!
//! Only file existence is checked here; nothing is read.

use std::path::{Path, PathBuf};

use chanmap_core::LocalProbe;
use tracing::{debug, warn};

use crate::config::ChanMapConfig;
use crate::error::{ChanMapError, ChanMapResult};
use crate::metadata::{MetadataFormat, MetadataSource};
use crate::writer::OutputFormat;

/// Caller inputs for one channel map run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChanMapRequest {
    /// Session directory; the artifact is written here. Empty means the
    /// current directory once the request reaches the orchestrator.
    pub save_path: PathBuf,
    /// Explicit metadata file
    pub metadata_file: Option<PathBuf>,
    /// Explicit built-in probe name
    pub probe_name: Option<String>,
    /// Session basename, defaults to the last component of `save_path`
    pub basename: Option<String>,
    /// Artifact format, defaults to the configured format
    pub output_format: Option<OutputFormat>,
}

impl ChanMapRequest {
    /// Request for a session directory with every other input unset
    #[must_use]
    pub fn new(save_path: impl Into<PathBuf>) -> Self {
        Self { save_path: save_path.into(), ..Default::default() }
    }

    /// Use an explicit metadata file (empty paths are treated as unset)
    #[must_use]
    pub fn with_metadata_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.metadata_file = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// Use an explicit probe (empty names are treated as unset)
    #[must_use]
    pub fn with_probe_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.probe_name = (!name.is_empty()).then_some(name);
        self
    }

    /// Override the session basename
    #[must_use]
    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    /// Choose the artifact format
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Session basename used for default metadata file names
    #[must_use]
    pub fn session_basename(&self) -> String {
        self.basename.clone().unwrap_or_else(|| {
            self.save_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

/// Where the layout will come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Derive the layout from session metadata
    Metadata(MetadataSource),
    /// Use a built-in probe layout
    Local(LocalProbe),
}

impl Resolution {
    /// Whether the metadata-derived provider is used
    #[must_use]
    pub const fn use_metadata_path(&self) -> bool {
        matches!(self, Self::Metadata(_))
    }
}

/// Resolve the layout source for `request`.
///
/// # Errors
///
/// - [`ChanMapError::ProbeName`] if `probe_name` is not a built-in probe
/// - [`ChanMapError::MetadataNotFound`] if `metadata_file` does not exist
/// - [`ChanMapError::UnsupportedMetadataFormat`] for other extensions
pub fn resolve(request: &ChanMapRequest, config: &ChanMapConfig) -> ChanMapResult<Resolution> {
    if let Some(name) = request.probe_name.as_deref().filter(|n| !n.is_empty()) {
        let probe: LocalProbe = name.parse()?;
        if let Some(file) = &request.metadata_file {
            warn!("Probe {} given explicitly, ignoring metadata file {}", probe, file.display());
        }
        return Ok(Resolution::Local(probe));
    }

    if let Some(file) = request.metadata_file.as_ref().filter(|f| !f.as_os_str().is_empty()) {
        return explicit_source(file).map(Resolution::Metadata);
    }

    let basename = request.session_basename();
    let candidates = [
        (&config.session_suffix, MetadataFormat::Session),
        (&config.xml_suffix, MetadataFormat::Neuroscope),
    ];
    for (suffix, format) in candidates {
        let candidate = request.save_path.join(format!("{basename}{suffix}"));
        debug!("Looking for {} metadata at {}", format.name(), candidate.display());
        if candidate.is_file() {
            return Ok(Resolution::Metadata(MetadataSource::new(candidate, format)));
        }
    }

    debug!("No session metadata found, using default probe {}", config.default_probe);
    Ok(Resolution::Local(config.default_probe))
}

fn explicit_source(file: &Path) -> ChanMapResult<MetadataSource> {
    if !file.exists() {
        return Err(ChanMapError::MetadataNotFound { path: file.to_path_buf() });
    }
    let format = MetadataFormat::from_path(file).ok_or_else(|| ChanMapError::UnsupportedMetadataFormat {
        path: file.to_path_buf(),
        extension: file
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })?;
    Ok(MetadataSource::new(file, format))
}
