//! JSON session record import
//!
//! Expected shape (unknown fields are ignored):
//!
//! ```json
//! {
//!   "session": {
//!     "extracellular": {
//!       "equipment": "poly3",
//!       "electrodeGroups": { "channels": [[0, 1, 2], [3, 4, 5]] },
//!       "spikeGroups":     { "channels": [[0, 1, 2], [3, 4]] }
//!     }
//!   }
//! }
//! ```
//!
//! `spikeGroups` is optional; a listing with no channels is ignored.

use std::path::Path;

use chanmap_core::{ElectrodeGroups, RawParams};
use serde::Deserialize;

use super::SessionMetadata;
use crate::error::{ChanMapError, ChanMapResult};

#[derive(Debug, Deserialize)]
struct SessionFile {
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct Session {
    extracellular: Option<Extracellular>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Extracellular {
    equipment: Option<String>,
    electrode_groups: Option<ChannelListing>,
    spike_groups: Option<ChannelListing>,
}

#[derive(Debug, Deserialize)]
struct ChannelListing {
    channels: Option<Vec<Vec<u32>>>,
}

/// Parse a JSON session record.
///
/// # Errors
///
/// Returns [`ChanMapError::Json`] for malformed JSON and
/// [`ChanMapError::MissingField`] naming the first absent required field.
pub fn parse_session_str(json: &str, path: &Path) -> ChanMapResult<SessionMetadata> {
    let missing = |field: &'static str| ChanMapError::MissingField { field, path: path.to_path_buf() };

    let file: SessionFile = serde_json::from_str(json)?;
    let session = file.session.ok_or_else(|| missing("session"))?;
    let extracellular = session
        .extracellular
        .ok_or_else(|| missing("session.extracellular"))?;
    let family = extracellular
        .equipment
        .ok_or_else(|| missing("session.extracellular.equipment"))?;
    let channels = extracellular
        .electrode_groups
        .and_then(|g| g.channels)
        .ok_or_else(|| missing("session.extracellular.electrodeGroups.channels"))?;

    let raw_params = extracellular
        .spike_groups
        .and_then(|g| g.channels)
        .filter(|spike| spike.iter().any(|g| !g.is_empty()))
        .map(|spike| RawParams::new(channels.clone(), spike));

    Ok(SessionMetadata {
        family,
        groups: ElectrodeGroups::new(channels),
        raw_params,
    })
}
