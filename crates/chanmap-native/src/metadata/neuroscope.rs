//! Neuroscope parameter XML import.
//!
//! Reads the probe family and the channel groups from a Neuroscope
//! `<basename>.xml` parameter file:
//!
//! ```text
//! parameters
//! ├── generalInfo/probeType                       probe family name
//! ├── anatomicalDescription/channelGroups/group*  AnatGrps[].Channels
//! │   └── channel*
//! └── spikeDetection/channelGroups/group*         SpkGrps[].Channels (optional)
//!     └── channels/channel*
//! ```

use std::path::Path;

use chanmap_core::{ElectrodeGroups, RawParams};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::SessionMetadata;
use crate::error::{ChanMapError, ChanMapResult};

const PROBE_TYPE: &[&str] = &["parameters", "generalInfo", "probeType"];
const ANAT_GROUP: &[&str] = &["anatomicalDescription", "channelGroups", "group"];
const ANAT_CHANNEL: &[&str] = &["anatomicalDescription", "channelGroups", "group", "channel"];
const SPIKE_GROUP: &[&str] = &["spikeDetection", "channelGroups", "group"];
const SPIKE_CHANNEL: &[&str] = &["spikeDetection", "channelGroups", "group", "channels", "channel"];

/// Parse a Neuroscope parameter XML document.
///
/// # Errors
///
/// Returns [`ChanMapError::Xml`] for malformed XML,
/// [`ChanMapError::MissingField`] if the probe type or the anatomical groups
/// are absent, and [`ChanMapError::InvalidField`] for non-numeric channels.
pub fn parse_neuroscope_str(xml: &str, path: &Path) -> ChanMapResult<SessionMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut probe_type: Option<String> = None;
    let mut anat_groups: Vec<Vec<u32>> = Vec::new();
    let mut spike_groups: Vec<Vec<u32>> = Vec::new();
    let mut saw_anatomy = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                open_element(&stack, &mut anat_groups, &mut spike_groups);
                saw_anatomy |= ends_with(&stack, &["anatomicalDescription", "channelGroups"]);
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing element: open and close in one step
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                open_element(&stack, &mut anat_groups, &mut spike_groups);
                saw_anatomy |= ends_with(&stack, &["anatomicalDescription", "channelGroups"]);
                stack.pop();
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| xml_error(path, &e))?;
                let text = text.trim();
                if stack.iter().map(String::as_str).eq(PROBE_TYPE.iter().copied()) {
                    probe_type = Some(text.to_string());
                } else if ends_with(&stack, ANAT_CHANNEL) {
                    push_channel(&mut anat_groups, text, "parameters.anatomicalDescription", path)?;
                } else if ends_with(&stack, SPIKE_CHANNEL) {
                    push_channel(&mut spike_groups, text, "parameters.spikeDetection", path)?;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(path, &e)),
        }
    }

    let missing = |field: &'static str| ChanMapError::MissingField { field, path: path.to_path_buf() };
    let family = probe_type
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("parameters.generalInfo.probeType"))?;
    if !saw_anatomy {
        return Err(missing("parameters.anatomicalDescription.channelGroups"));
    }

    // An empty spike listing would disconnect every channel
    let has_spike_channels = spike_groups.iter().any(|g| !g.is_empty());
    let raw_params = has_spike_channels.then(|| RawParams::new(anat_groups.clone(), spike_groups));

    Ok(SessionMetadata {
        family,
        groups: ElectrodeGroups::new(anat_groups),
        raw_params,
    })
}

/// Start a new channel list when a group element opens.
fn open_element(stack: &[String], anat_groups: &mut Vec<Vec<u32>>, spike_groups: &mut Vec<Vec<u32>>) {
    if ends_with(stack, ANAT_GROUP) {
        anat_groups.push(Vec::new());
    } else if ends_with(stack, SPIKE_GROUP) {
        spike_groups.push(Vec::new());
    }
}

fn push_channel(
    groups: &mut [Vec<u32>],
    text: &str,
    field: &'static str,
    path: &Path,
) -> ChanMapResult<()> {
    let channel = text.parse::<u32>().map_err(|_| ChanMapError::InvalidField {
        field,
        path: path.to_path_buf(),
        reason: format!("channel '{text}' is not a non-negative integer"),
    })?;
    if let Some(group) = groups.last_mut() {
        group.push(channel);
    }
    Ok(())
}

fn ends_with(stack: &[String], suffix: &[&str]) -> bool {
    stack.len() >= suffix.len()
        && stack[stack.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn xml_error(path: &Path, e: &impl std::fmt::Display) -> ChanMapError {
    ChanMapError::Xml { path: path.to_path_buf(), reason: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "rat01/rat01.xml";

    const PARAMS: &str = r#"<?xml version="1.0"?>
<parameters creator="neuroscope-2.0.0" version="1.0">
  <generalInfo>
    <date>2024-03-01</date>
    <probeType>poly3</probeType>
  </generalInfo>
  <acquisitionSystem>
    <nBits>16</nBits>
    <nChannels>6</nChannels>
  </acquisitionSystem>
  <anatomicalDescription>
    <channelGroups>
      <group>
        <channel>2</channel>
        <channel>0</channel>
        <channel>1</channel>
      </group>
      <group>
        <channel>3</channel>
        <channel>4</channel>
        <channel>5</channel>
      </group>
    </channelGroups>
  </anatomicalDescription>
  <spikeDetection>
    <channelGroups>
      <group>
        <channels>
          <channel>2</channel>
          <channel>0</channel>
          <channel>1</channel>
        </channels>
        <nSamples>32</nSamples>
      </group>
      <group>
        <channels>
          <channel>3</channel>
          <channel>4</channel>
        </channels>
      </group>
    </channelGroups>
  </spikeDetection>
</parameters>"#;

    #[test]
    fn test_parse_groups_and_probe_type() {
        let meta = parse_neuroscope_str(PARAMS, Path::new(PATH)).unwrap();

        assert_eq!(meta.family, "poly3");
        assert_eq!(meta.groups, ElectrodeGroups::new(vec![vec![2, 0, 1], vec![3, 4, 5]]));
    }

    #[test]
    fn test_spike_groups_become_raw_params() {
        let meta = parse_neuroscope_str(PARAMS, Path::new(PATH)).unwrap();
        let raw = meta.raw_params.unwrap();

        assert_eq!(raw.spike_groups, vec![vec![2, 0, 1], vec![3, 4]]);
        assert_eq!(raw.excluded_channels().into_iter().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_no_spike_detection_section() {
        let xml = r"<parameters>
            <generalInfo><probeType>staggered</probeType></generalInfo>
            <anatomicalDescription><channelGroups>
                <group><channel>0</channel><channel>1</channel></group>
                <group/>
            </channelGroups></anatomicalDescription>
        </parameters>";

        let meta = parse_neuroscope_str(xml, Path::new(PATH)).unwrap();
        assert!(meta.raw_params.is_none());
        assert_eq!(meta.groups.group_count(), 2);
        assert_eq!(meta.groups.channel_count(), 2);
    }

    #[test]
    fn test_empty_spike_detection_keeps_channels_connected() {
        let xml = r"<parameters>
            <generalInfo><probeType>staggered</probeType></generalInfo>
            <anatomicalDescription><channelGroups>
                <group><channel>0</channel><channel>1</channel></group>
            </channelGroups></anatomicalDescription>
            <spikeDetection><channelGroups/></spikeDetection>
        </parameters>";

        let meta = parse_neuroscope_str(xml, Path::new(PATH)).unwrap();
        assert!(meta.raw_params.is_none());

        let family = meta.family.parse().unwrap();
        let map = chanmap_core::legacy::layout(family, &meta.groups, meta.raw_params.as_ref()).unwrap();
        assert_eq!(map.connected(), vec![true, true]);
    }

    #[test]
    fn test_missing_probe_type() {
        let xml = "<parameters><anatomicalDescription><channelGroups>\
                   <group><channel>0</channel></group>\
                   </channelGroups></anatomicalDescription></parameters>";

        let err = parse_neuroscope_str(xml, Path::new(PATH)).unwrap_err();
        assert!(matches!(
            err,
            ChanMapError::MissingField { field: "parameters.generalInfo.probeType", .. }
        ));
    }

    #[test]
    fn test_missing_anatomical_groups() {
        let xml = "<parameters><generalInfo><probeType>poly5</probeType></generalInfo></parameters>";

        let err = parse_neuroscope_str(xml, Path::new(PATH)).unwrap_err();
        assert!(err.to_string().contains("anatomicalDescription"));
    }

    #[test]
    fn test_non_numeric_channel() {
        let xml = "<parameters><generalInfo><probeType>poly5</probeType></generalInfo>\
                   <anatomicalDescription><channelGroups>\
                   <group><channel>A1</channel></group>\
                   </channelGroups></anatomicalDescription></parameters>";

        let err = parse_neuroscope_str(xml, Path::new(PATH)).unwrap_err();
        assert!(matches!(err, ChanMapError::InvalidField { .. }));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_neuroscope_str("<parameters><generalInfo></parameters>", Path::new(PATH))
            .unwrap_err();
        assert!(matches!(err, ChanMapError::Xml { .. }));
    }
}
