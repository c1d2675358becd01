//! Core data types for channel maps
//!
//! A channel map is stored as one [`ChannelRecord`] per recording channel.
//! The column views expected by spike sorters (`chanMap`, `xcoords`, ...)
//! are derived from the records, so every column always has the same length
//! and the same channel ordering.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

// ============================================================================
// Channel Records
// ============================================================================

/// Layout of a single recording channel.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// 1-based position index (`chanMap`)
    pub index: u32,
    /// 0-based position index (`chanMap0ind`), always `index - 1`
    pub index0: u32,
    /// Whether the channel is used downstream
    pub connected: bool,
    /// Horizontal position in layout units
    pub x: f64,
    /// Vertical position in layout units
    pub y: f64,
    /// 1-based shank / electrode group id (`kcoords`)
    pub group: u32,
}

impl ChannelRecord {
    /// Create a connected record at 0-based `position`.
    #[inline]
    #[must_use]
    pub const fn new(position: u32, x: f64, y: f64, group: u32) -> Self {
        Self {
            index: position + 1,
            index0: position,
            connected: true,
            x,
            y,
            group,
        }
    }
}

// ============================================================================
// Channel Map
// ============================================================================

/// Complete channel map in final channel order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMap {
    channels: Vec<ChannelRecord>,
}

impl ChannelMap {
    /// Build a map from records already in final order.
    ///
    /// Indices are rewritten to the identity sequence `1..=N`.
    #[must_use]
    pub fn from_records(mut channels: Vec<ChannelRecord>) -> Self {
        for (position, record) in channels.iter_mut().enumerate() {
            let position = position_u32(position);
            record.index = position + 1;
            record.index0 = position;
        }
        Self { channels }
    }

    /// Reassemble a map from the six columns of a written artifact.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ColumnLengthMismatch`] if any column differs in
    /// length from `chan_map`, or [`LayoutError::IndexMismatch`] if
    /// `chan_map_0ind[i] != chan_map[i] - 1`.
    pub fn from_columns(
        chan_map: &[u32],
        chan_map_0ind: &[u32],
        connected: &[bool],
        xcoords: &[f64],
        ycoords: &[f64],
        kcoords: &[u32],
    ) -> Result<Self, LayoutError> {
        let expected = chan_map.len();
        let lengths = [
            ("chanMap0ind", chan_map_0ind.len()),
            ("connected", connected.len()),
            ("xcoords", xcoords.len()),
            ("ycoords", ycoords.len()),
            ("kcoords", kcoords.len()),
        ];
        if let Some(&(column, got)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(LayoutError::ColumnLengthMismatch { column, expected, got });
        }

        let mut channels = Vec::with_capacity(expected);
        for position in 0..expected {
            let (index, index0) = (chan_map[position], chan_map_0ind[position]);
            if index == 0 || index0 != index - 1 {
                return Err(LayoutError::IndexMismatch { position, index, index0 });
            }
            channels.push(ChannelRecord {
                index,
                index0,
                connected: connected[position],
                x: xcoords[position],
                y: ycoords[position],
                group: kcoords[position],
            });
        }

        Ok(Self { channels })
    }

    /// Number of channels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the map has no channels
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Per-channel records in final order
    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    /// Iterate over channel records
    pub fn iter(&self) -> core::slice::Iter<'_, ChannelRecord> {
        self.channels.iter()
    }

    /// 1-based channel indices (`chanMap`)
    #[must_use]
    pub fn chan_map(&self) -> Vec<u32> {
        self.channels.iter().map(|c| c.index).collect()
    }

    /// 0-based channel indices (`chanMap0ind`)
    #[must_use]
    pub fn chan_map_0ind(&self) -> Vec<u32> {
        self.channels.iter().map(|c| c.index0).collect()
    }

    /// Connectivity mask (`connected`)
    #[must_use]
    pub fn connected(&self) -> Vec<bool> {
        self.channels.iter().map(|c| c.connected).collect()
    }

    /// Horizontal coordinates (`xcoords`)
    #[must_use]
    pub fn xcoords(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.x).collect()
    }

    /// Vertical coordinates (`ycoords`)
    #[must_use]
    pub fn ycoords(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.y).collect()
    }

    /// Shank / group ids (`kcoords`)
    #[must_use]
    pub fn kcoords(&self) -> Vec<u32> {
        self.channels.iter().map(|c| c.group).collect()
    }

    /// Number of channels marked connected
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.channels.iter().filter(|c| c.connected).count()
    }

    /// Distinct shank ids in ascending order
    #[must_use]
    pub fn shanks(&self) -> Vec<u32> {
        let ids: BTreeSet<u32> = self.channels.iter().map(|c| c.group).collect();
        ids.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a ChannelMap {
    type Item = &'a ChannelRecord;
    type IntoIter = core::slice::Iter<'a, ChannelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

// ============================================================================
// Metadata Inputs
// ============================================================================

/// Electrode groups as listed in session metadata.
///
/// Each group is one shank (or sub-array) and lists 0-based channel indices
/// in the order the contacts run along it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectrodeGroups {
    groups: Vec<Vec<u32>>,
}

impl ElectrodeGroups {
    /// Wrap per-group channel lists
    #[must_use]
    pub fn new(groups: Vec<Vec<u32>>) -> Self {
        Self { groups }
    }

    /// Per-group channel lists
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[Vec<u32>] {
        &self.groups
    }

    /// Number of groups
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of channels across all groups
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// All channels in group order, position order within each group
    pub fn flatten(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().flatten().copied()
    }

    /// Check the groups describe a usable layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmptyGroups`] if there are no channels and
    /// [`LayoutError::DuplicateChannel`] if a channel is listed twice.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.channel_count() == 0 {
            return Err(LayoutError::EmptyGroups);
        }
        let mut seen = BTreeSet::new();
        for channel in self.flatten() {
            if !seen.insert(channel) {
                return Err(LayoutError::DuplicateChannel { channel });
            }
        }
        Ok(())
    }
}

impl From<Vec<Vec<u32>>> for ElectrodeGroups {
    fn from(groups: Vec<Vec<u32>>) -> Self {
        Self::new(groups)
    }
}

/// Raw group listings used to prune channels from sorting.
///
/// Channels that belong to an anatomical group but to no spike group are
/// marked disconnected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParams {
    /// Anatomical group channel lists (`AnatGrps[].Channels`)
    pub anatomical_groups: Vec<Vec<u32>>,
    /// Spike group channel lists (`SpkGrps[].Channels`)
    pub spike_groups: Vec<Vec<u32>>,
}

impl RawParams {
    /// Create from the two listings
    #[must_use]
    pub fn new(anatomical_groups: Vec<Vec<u32>>, spike_groups: Vec<Vec<u32>>) -> Self {
        Self { anatomical_groups, spike_groups }
    }

    /// Channels present in the anatomical listing but absent from every
    /// spike group
    #[must_use]
    pub fn excluded_channels(&self) -> BTreeSet<u32> {
        let spiking: BTreeSet<u32> = self.spike_groups.iter().flatten().copied().collect();
        self.anatomical_groups
            .iter()
            .flatten()
            .copied()
            .filter(|ch| !spiking.contains(ch))
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
#[inline]
pub(crate) fn position_u32(position: usize) -> u32 {
    position as u32
}
