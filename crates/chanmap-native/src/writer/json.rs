//! JSON channel map artifact

use std::fs;
use std::path::Path;

use chanmap_core::ChannelMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChanMapError, ChanMapResult};

/// On-disk column layout, one array per field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelMapFile {
    /// 1-based channel indices
    #[serde(rename = "chanMap")]
    pub chan_map: Vec<u32>,
    /// 0-based channel indices
    #[serde(rename = "chanMap0ind")]
    pub chan_map_0ind: Vec<u32>,
    /// Usable-channel mask
    pub connected: Vec<bool>,
    /// Horizontal positions
    pub xcoords: Vec<f64>,
    /// Vertical positions
    pub ycoords: Vec<f64>,
    /// Shank / group ids
    pub kcoords: Vec<u32>,
}

impl From<&ChannelMap> for ChannelMapFile {
    fn from(map: &ChannelMap) -> Self {
        Self {
            chan_map: map.chan_map(),
            chan_map_0ind: map.chan_map_0ind(),
            connected: map.connected(),
            xcoords: map.xcoords(),
            ycoords: map.ycoords(),
            kcoords: map.kcoords(),
        }
    }
}

impl ChannelMapFile {
    /// Rebuild the channel map, checking the columns agree.
    ///
    /// # Errors
    ///
    /// Returns [`ChanMapError::Layout`] if column lengths or indices disagree.
    pub fn into_channel_map(self) -> ChanMapResult<ChannelMap> {
        Ok(ChannelMap::from_columns(
            &self.chan_map,
            &self.chan_map_0ind,
            &self.connected,
            &self.xcoords,
            &self.ycoords,
            &self.kcoords,
        )?)
    }
}

/// Encode `map` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ChanMapError::Json`] if serialization fails.
pub fn encode(map: &ChannelMap) -> ChanMapResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&ChannelMapFile::from(map))?)
}

/// Read a JSON channel map artifact.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a channel map, or its
/// columns disagree.
pub fn read_channel_map_json(path: &Path) -> ChanMapResult<ChannelMap> {
    let text = fs::read_to_string(path)?;
    let file: ChannelMapFile =
        serde_json::from_str(&text).map_err(|e| ChanMapError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    file.into_channel_map()
}
