//! Channel map pipeline
//!
//! ```text
//! ChanMapRequest ──► resolve ──┬─► metadata::load ─► ProbeFamily ─► legacy::layout ─┐
//!                              │                                                     ├─► write_channel_map
//!                              └─► LocalProbe ─────────────────────► local::layout ──┘
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use chanmap_core::{legacy, local, ChannelMap, ProbeFamily, ResolvedProbe};
use tracing::{debug, info};

use crate::config::ChanMapConfig;
use crate::error::ChanMapResult;
use crate::metadata;
use crate::resolver::{self, ChanMapRequest, Resolution};
use crate::writer;

/// Result of a successful run
#[derive(Clone, Debug, PartialEq)]
pub struct ChanMapOutput {
    /// Absolute path of the written artifact
    pub path: PathBuf,
    /// Probe or family the map was built for
    pub probe: ResolvedProbe,
    /// The map that was written
    pub map: ChannelMap,
}

/// Build the channel map for `request` without writing it.
///
/// An empty or relative `save_path` is taken relative to the current
/// directory.
///
/// # Errors
///
/// Returns an error if resolution fails, the metadata cannot be read, the
/// probe family is unsupported, or the electrode groups are invalid.
pub fn build_channel_map(
    request: &ChanMapRequest,
    config: &ChanMapConfig,
) -> ChanMapResult<(ChannelMap, ResolvedProbe)> {
    build(&anchor_save_path(request)?, config)
}

/// Copy of `request` with an absolute `save_path` in which `.` and `..`
/// are resolved to real directory names.
fn anchor_save_path(request: &ChanMapRequest) -> ChanMapResult<ChanMapRequest> {
    let save_path = if request.save_path.as_os_str().is_empty() {
        env::current_dir()?
    } else {
        match fs::canonicalize(&request.save_path) {
            Ok(path) => path,
            // Missing directories surface later as a write error
            Err(_) => env::current_dir()?.join(&request.save_path),
        }
    };
    debug!("Session directory {}", save_path.display());
    Ok(ChanMapRequest { save_path, ..request.clone() })
}

fn build(request: &ChanMapRequest, config: &ChanMapConfig) -> ChanMapResult<(ChannelMap, ResolvedProbe)> {
    match resolver::resolve(request, config)? {
        Resolution::Metadata(source) => {
            info!("Loading metadata from {}", source.path.display());
            let meta = metadata::load(&source)?;
            let family: ProbeFamily = meta.family.parse()?;

            info!(
                "Building channel map: {} layout, {} groups, {} channels",
                family,
                meta.groups.group_count(),
                meta.groups.channel_count()
            );
            let map = legacy::layout(family, &meta.groups, meta.raw_params.as_ref())?;
            Ok((map, ResolvedProbe::Legacy(family)))
        }
        Resolution::Local(probe) => {
            info!("Building channel map for {}", probe);
            Ok((local::layout(probe), ResolvedProbe::Local(probe)))
        }
    }
}

/// Build the channel map for `request` and write it into its session
/// directory (see [`build_channel_map`] for how `save_path` is anchored).
///
/// # Errors
///
/// Returns the first error from [`build_channel_map`] or the writer; no
/// file is written if building fails.
pub fn create_channel_map(request: &ChanMapRequest, config: &ChanMapConfig) -> ChanMapResult<ChanMapOutput> {
    let request = anchor_save_path(request)?;
    let (map, probe) = build(&request, config)?;
    debug!(
        "{} channels, {} connected, shanks {:?}",
        map.len(),
        map.connected_count(),
        map.shanks()
    );

    let format = request.output_format.unwrap_or(config.output_format);
    info!("Saving channel map ({}) to {}", format, request.save_path.display());
    let path = writer::write_channel_map(&request.save_path, &map, format)?;

    Ok(ChanMapOutput { path, probe, map })
}
