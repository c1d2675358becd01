//! Channel map artifact writers
//!
//! A channel map is written as a single file named `chanMap.<ext>` holding
//! six columns under fixed names:
//!
//! | Field         | Contents                          |
//! |---------------|-----------------------------------|
//! | `chanMap`     | 1-based channel indices           |
//! | `chanMap0ind` | 0-based channel indices           |
//! | `connected`   | usable-channel mask               |
//! | `xcoords`     | horizontal positions              |
//! | `ycoords`     | vertical positions                |
//! | `kcoords`     | shank / group ids                 |
//!
//! Files are written to a temporary sibling and renamed over the target, so
//! readers never observe a partially written map.

pub mod json;
pub mod mat;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chanmap_core::ChannelMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChanMapError, ChanMapResult};

/// Base name of every channel map artifact
pub const CHANMAP_STEM: &str = "chanMap";

/// Column names, in the order they are written
pub const FIELD_NAMES: [&str; 6] = ["chanMap", "chanMap0ind", "connected", "xcoords", "ycoords", "kcoords"];

/// Artifact encoding
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MATLAB level-5 MAT file, as read by Kilosort
    #[default]
    Mat,
    /// JSON object with one array per column
    Json,
}

impl OutputFormat {
    /// All formats
    pub const ALL: [Self; 2] = [Self::Mat, Self::Json];

    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mat => "mat",
            Self::Json => "json",
        }
    }

    /// Artifact file name, e.g. `chanMap.mat`
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{CHANMAP_STEM}.{}", self.extension())
    }

    /// Detect the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format '{s}', expected 'mat' or 'json'"))
    }
}

/// Write `map` to `<dir>/chanMap.<ext>`, replacing any existing artifact.
///
/// Returns the absolute path of the written file.
///
/// # Errors
///
/// Returns [`ChanMapError::Write`] if the directory is missing or the file
/// cannot be written.
pub fn write_channel_map(dir: &Path, map: &ChannelMap, format: OutputFormat) -> ChanMapResult<PathBuf> {
    let file_name = format.file_name();
    let target = dir.join(&file_name);
    let bytes = match format {
        OutputFormat::Mat => mat::encode(map).map_err(|source| write_error(&target, source))?,
        OutputFormat::Json => json::encode(map)?,
    };

    let tmp = dir.join(format!(".{file_name}.tmp"));
    fs::write(&tmp, &bytes).map_err(|source| write_error(&target, source))?;
    if let Err(source) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(write_error(&target, source));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    fs::canonicalize(&target).map_err(|source| write_error(&target, source))
}

/// Read a channel map artifact, choosing the decoder from the extension.
///
/// # Errors
///
/// Returns [`ChanMapError::MalformedArtifact`] for unknown extensions or
/// undecodable contents.
pub fn read_channel_map(path: &Path) -> ChanMapResult<ChannelMap> {
    match OutputFormat::from_path(path) {
        Some(OutputFormat::Mat) => mat::read_channel_map_mat(path),
        Some(OutputFormat::Json) => json::read_channel_map_json(path),
        None => Err(ChanMapError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: "expected a .mat or .json extension".to_string(),
        }),
    }
}

fn write_error(path: &Path, source: std::io::Error) -> ChanMapError {
    ChanMapError::Write { path: path.to_path_buf(), source }
}
