//! Metadata-derived probe layouts
//!
//! Computes channel coordinates from the electrode groups listed in session
//! metadata. Each [`ProbeFamily`] has one pure coordinate rule taking the
//! 1-based group number `a` and the group length `n`; positions `i` within a
//! group are 1-based.
//!
//! # Layout Rules
//!
//! ```text
//! family      x                              y
//! ─────────   ────────────────────────────   ──────────────────────────
//! staggered   ±20 by parity, +200·a          −20·i
//! poly2       as staggered                   as staggered
//! poly3       {−18, 0, 18} zig-zag, +200·a   −20·k (centre: −10 + 20·extra)
//! poly5       {−36..36} zig-zag, +200·a      −28·k (±18 columns: −14)
//! neurogrid   (n − i) + 50·a                 −50·i
//! twohundred  200·(a − 1)                    0 / 200 by parity
//! ```
//!
//! `k` is a per-column counter. Records are finally sorted by their original
//! channel number, so position `p` in the output holds channel `p` of the
//! recording.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::error::LayoutError;
use crate::probe::ProbeFamily;
use crate::types::{position_u32, ChannelMap, ChannelRecord, ElectrodeGroups, RawParams};

/// Horizontal distance between shanks for the zig-zag families
const SHANK_PITCH: f64 = 200.0;

/// Horizontal distance between neurogrid groups
const NEUROGRID_PITCH: f64 = 50.0;

/// Build a channel map for `family` from metadata electrode groups.
///
/// When `raw_params` is given, channels listed in an anatomical group but in
/// no spike group are marked disconnected.
///
/// # Errors
///
/// Returns [`LayoutError::EmptyGroups`] when there are no channels and
/// [`LayoutError::DuplicateChannel`] when a channel is listed twice.
pub fn layout(
    family: ProbeFamily,
    groups: &ElectrodeGroups,
    raw_params: Option<&RawParams>,
) -> Result<ChannelMap, LayoutError> {
    groups.validate()?;

    let excluded = raw_params.map(RawParams::excluded_channels).unwrap_or_default();

    let mut tagged: Vec<(u32, ChannelRecord)> = Vec::with_capacity(groups.channel_count());
    for (g, channels) in groups.groups().iter().enumerate() {
        let a = position_u32(g) + 1;
        let shank = family.shank_for_group(a);
        let coords = group_coordinates(family, a, channels.len());

        for (&channel, (x, y)) in channels.iter().zip(coords) {
            let mut record = ChannelRecord::new(0, x, y, shank);
            record.connected = !excluded.contains(&channel);
            tagged.push((channel, record));
        }
    }

    tagged.sort_by_key(|(channel, _)| *channel);

    Ok(ChannelMap::from_records(tagged.into_iter().map(|(_, r)| r).collect()))
}

/// Coordinates of the `len` contacts of 1-based group `group`, in position
/// order.
#[must_use]
pub fn group_coordinates(family: ProbeFamily, group: u32, len: usize) -> Vec<(f64, f64)> {
    let n = position_u32(len);
    match family {
        ProbeFamily::Staggered | ProbeFamily::Poly2 => staggered(group, n),
        ProbeFamily::Poly3 => poly3(group, n),
        ProbeFamily::Poly5 => poly5(group, n),
        ProbeFamily::Neurogrid => neurogrid(group, n),
        ProbeFamily::TwoHundred => two_hundred(group, n),
    }
}

fn staggered(a: u32, n: u32) -> Vec<(f64, f64)> {
    let offset = f64::from(a) * SHANK_PITCH;
    (1..=n)
        .map(|i| {
            let x = if i % 2 == 1 { 20.0 } else { -20.0 };
            (x + offset, -20.0 * f64::from(i))
        })
        .collect()
}

fn poly3(a: u32, n: u32) -> Vec<(f64, f64)> {
    let extra = n % 3;
    let columns = (1..=n).map(|p| {
        if p <= extra {
            0
        } else {
            match (p - extra) % 3 {
                1 => -18,
                2 => 0,
                _ => 18,
            }
        }
    });

    let centre_offset = -10.0 + 20.0 * f64::from(extra);
    zigzag(columns, a, |x, k| {
        let y = -20.0 * f64::from(k);
        if x == 0 { y + centre_offset } else { y }
    })
}

fn poly5(a: u32, n: u32) -> Vec<(f64, f64)> {
    let extra = n % 5;
    let columns = (1..=n).map(|p| {
        if p <= extra {
            if p % 2 == 1 { -18 } else { 18 }
        } else {
            match (p - extra) % 5 {
                1 => -36,
                2 => -18,
                3 => 0,
                4 => 18,
                _ => 36,
            }
        }
    });

    zigzag(columns, a, |x, k| {
        let y = -28.0 * f64::from(k);
        if x.abs() == 18 { y - 14.0 } else { y }
    })
}

/// Place contacts on integer columns, numbering each column's contacts from
/// the top so `y_for(column, k)` can step down per column.
fn zigzag(
    columns: impl Iterator<Item = i32>,
    a: u32,
    y_for: impl Fn(i32, u32) -> f64,
) -> Vec<(f64, f64)> {
    let offset = f64::from(a) * SHANK_PITCH;
    let mut counters: BTreeMap<i32, u32> = BTreeMap::new();
    columns
        .map(|x| {
            let k = counters.entry(x).or_insert(0);
            *k += 1;
            (f64::from(x) + offset, y_for(x, *k))
        })
        .collect()
}

fn neurogrid(a: u32, n: u32) -> Vec<(f64, f64)> {
    let offset = f64::from(a) * NEUROGRID_PITCH;
    (1..=n)
        .map(|i| (f64::from(n - i) + offset, -50.0 * f64::from(i)))
        .collect()
}

fn two_hundred(a: u32, n: u32) -> Vec<(f64, f64)> {
    let x = f64::from(a - 1) * SHANK_PITCH;
    (1..=n)
        .map(|i| (x, if i % 2 == 1 { 0.0 } else { 200.0 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn single_group(n: u32) -> ElectrodeGroups {
        ElectrodeGroups::new(vec![(0..n).collect()])
    }

    #[test]
    fn test_staggered_single_shank() {
        let map = layout(ProbeFamily::Staggered, &single_group(4), None).unwrap();

        assert_eq!(map.xcoords(), vec![220.0, 180.0, 220.0, 180.0]);
        assert_eq!(map.ycoords(), vec![-20.0, -40.0, -60.0, -80.0]);
        assert_eq!(map.kcoords(), vec![1, 1, 1, 1]);
        assert!(map.connected().iter().all(|&c| c));
    }

    #[test]
    fn test_poly2_matches_staggered() {
        let groups = ElectrodeGroups::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let poly2 = layout(ProbeFamily::Poly2, &groups, None).unwrap();
        let staggered = layout(ProbeFamily::Staggered, &groups, None).unwrap();
        assert_eq!(poly2, staggered);
    }

    #[test]
    fn test_twohundred_rows() {
        let map = layout(ProbeFamily::TwoHundred, &single_group(4), None).unwrap();

        assert_eq!(map.xcoords(), vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(map.ycoords(), vec![0.0, 200.0, 0.0, 200.0]);
    }

    #[test]
    fn test_poly3_with_leftover_channel() {
        let coords = group_coordinates(ProbeFamily::Poly3, 1, 4);

        assert_eq!(
            coords,
            vec![(200.0, -10.0), (182.0, -20.0), (200.0, -30.0), (218.0, -20.0)]
        );
    }

    #[test]
    fn test_poly3_exact_rows() {
        let coords = group_coordinates(ProbeFamily::Poly3, 2, 6);
        let xs: Vec<f64> = coords.iter().map(|c| c.0).collect();
        let ys: Vec<f64> = coords.iter().map(|c| c.1).collect();

        assert_eq!(xs, vec![382.0, 400.0, 418.0, 382.0, 400.0, 418.0]);
        assert_eq!(ys, vec![-20.0, -30.0, -20.0, -40.0, -50.0, -40.0]);
    }

    #[test]
    fn test_poly5_with_leftover_channels() {
        let coords = group_coordinates(ProbeFamily::Poly5, 1, 7);

        assert_eq!(
            coords,
            vec![
                (182.0, -42.0),
                (218.0, -42.0),
                (164.0, -28.0),
                (182.0, -70.0),
                (200.0, -28.0),
                (218.0, -70.0),
                (236.0, -28.0),
            ]
        );
    }

    #[test]
    fn test_neurogrid_layout_and_shanks() {
        let groups: Vec<Vec<u32>> = (0..5).map(|g| vec![g * 3, g * 3 + 1, g * 3 + 2]).collect();
        let map = layout(ProbeFamily::Neurogrid, &ElectrodeGroups::new(groups), None).unwrap();

        assert_eq!(&map.xcoords()[..3], &[52.0, 51.0, 50.0]);
        assert_eq!(&map.ycoords()[..3], &[-50.0, -100.0, -150.0]);
        assert_eq!(map.kcoords(), vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_reindex_sorts_by_original_channel() {
        let groups = ElectrodeGroups::new(vec![vec![2, 0], vec![1, 3]]);
        let map = layout(ProbeFamily::Staggered, &groups, None).unwrap();

        assert_eq!(map.chan_map(), vec![1, 2, 3, 4]);
        assert_eq!(map.chan_map_0ind(), vec![0, 1, 2, 3]);
        assert_eq!(map.xcoords(), vec![180.0, 420.0, 220.0, 380.0]);
        assert_eq!(map.ycoords(), vec![-40.0, -20.0, -20.0, -40.0]);
        assert_eq!(map.kcoords(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_spike_group_pruning() {
        let groups = ElectrodeGroups::new(vec![vec![3, 1], vec![0, 2]]);
        let params = RawParams::new(groups.groups().to_vec(), vec![vec![3], vec![0, 2]]);
        let map = layout(ProbeFamily::Poly3, &groups, Some(&params)).unwrap();

        // Channel 1 has no spike group
        assert_eq!(map.connected(), vec![true, false, true, true]);
        assert_eq!(map.connected_count(), 3);
    }

    #[test]
    fn test_rejects_bad_groups() {
        assert_eq!(
            layout(ProbeFamily::Poly5, &ElectrodeGroups::default(), None),
            Err(LayoutError::EmptyGroups)
        );
        let dup = ElectrodeGroups::new(vec![vec![0, 1], vec![1]]);
        assert_eq!(
            layout(ProbeFamily::Poly5, &dup, None),
            Err(LayoutError::DuplicateChannel { channel: 1 })
        );
    }
}
