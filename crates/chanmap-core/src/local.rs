//! Built-in probe layouts
//!
//! Layouts for probes whose geometry does not depend on session metadata.
//! Entries are returned already in final channel order.

use alloc::vec::Vec;

use crate::probe::LocalProbe;
use crate::types::{ChannelMap, ChannelRecord};

/// Neuropixels 1.0 recording sites in bank 0
pub const NP1_SITE_COUNT: u32 = 384;

/// Checkerboard column positions (µm), repeating every four sites
pub const NP1_CHECKERBOARD_X: [f64; 4] = [43.0, 11.0, 59.0, 27.0];

/// Vertical pitch between site rows (µm)
pub const NP1_ROW_PITCH: f64 = 20.0;

/// 1-based site wired to the internal reference
pub const NP1_REFERENCE_SITE: u32 = 192;

/// Layout for a built-in probe.
#[must_use]
pub fn layout(probe: LocalProbe) -> ChannelMap {
    match probe {
        LocalProbe::NeuroPixels1Checkerboard => neuropixels1_checkerboard(),
    }
}

fn neuropixels1_checkerboard() -> ChannelMap {
    let channels: Vec<ChannelRecord> = (0..NP1_SITE_COUNT)
        .map(|site| {
            let x = NP1_CHECKERBOARD_X[(site % 4) as usize];
            let y = NP1_ROW_PITCH * f64::from(site / 2 + 1);
            let mut record = ChannelRecord::new(site, x, y, 1);
            record.connected = site + 1 != NP1_REFERENCE_SITE;
            record
        })
        .collect();

    ChannelMap::from_records(channels)
}
