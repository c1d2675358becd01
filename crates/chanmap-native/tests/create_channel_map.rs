//! End-to-end channel map generation against scratch session directories.

use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use chanmap_core::{LocalProbe, ProbeFamily, ResolvedProbe};
use chanmap_native::{
    build_channel_map, create_channel_map, read_channel_map, ChanMapConfig, ChanMapError, ChanMapRequest,
    OutputFormat,
};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

fn session_dir(name: &str) -> (TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(name);
    fs::create_dir(&dir).unwrap();
    (root, dir)
}

fn write_session_json(dir: &Path, basename: &str, equipment: &str, groups: &str) -> PathBuf {
    let path = dir.join(format!("{basename}.session.json"));
    let json = format!(
        r#"{{"session": {{"extracellular": {{
            "equipment": "{equipment}",
            "electrodeGroups": {{"channels": {groups}}}
        }}}}}}"#
    );
    fs::write(&path, json).unwrap();
    path
}

fn write_neuroscope_xml(dir: &Path, basename: &str) -> PathBuf {
    let path = dir.join(format!("{basename}.xml"));
    let xml = r#"<?xml version="1.0"?>
<parameters>
  <generalInfo><probeType>staggered</probeType></generalInfo>
  <anatomicalDescription>
    <channelGroups>
      <group><channel>1</channel><channel>0</channel><channel>3</channel><channel>2</channel></group>
    </channelGroups>
  </anatomicalDescription>
  <spikeDetection>
    <channelGroups>
      <group><channels><channel>1</channel><channel>0</channel><channel>3</channel></channels></group>
    </channelGroups>
  </spikeDetection>
</parameters>"#;
    fs::write(&path, xml).unwrap();
    path
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Resolution paths
// =============================================================================

#[test]
fn test_fallback_probe_when_nothing_on_disk() {
    let (_root, dir) = session_dir("rat07");

    let output = create_channel_map(&ChanMapRequest::new(&dir), &ChanMapConfig::default()).unwrap();

    assert_eq!(output.probe, ResolvedProbe::Local(LocalProbe::NeuroPixels1Checkerboard));
    assert_eq!(output.path, dir.join("chanMap.mat").canonicalize().unwrap());
    assert_eq!(output.map.len(), 384);
}

#[test]
fn test_default_session_json_is_picked_up() {
    let (_root, dir) = session_dir("rat07");
    write_session_json(&dir, "rat07", "twohundred", "[[0, 1, 2, 3]]");

    let request = ChanMapRequest::new(&dir).with_output_format(OutputFormat::Json);
    let output = create_channel_map(&request, &ChanMapConfig::default()).unwrap();

    assert_eq!(output.probe, ResolvedProbe::Legacy(ProbeFamily::TwoHundred));
    let written = read_channel_map(&output.path).unwrap();
    assert_eq!(written.xcoords(), vec![0.0, 0.0, 0.0, 0.0]);
    assert_eq!(written.ycoords(), vec![0.0, 200.0, 0.0, 200.0]);
}

#[test]
fn test_default_xml_prunes_unsorted_channels() {
    let (_root, dir) = session_dir("rat07");
    write_neuroscope_xml(&dir, "rat07");

    let output = create_channel_map(&ChanMapRequest::new(&dir), &ChanMapConfig::default()).unwrap();

    assert_eq!(output.probe, ResolvedProbe::Legacy(ProbeFamily::Staggered));
    let written = read_channel_map(&output.path).unwrap();
    assert_eq!(written, output.map);
    assert_eq!(written.connected(), vec![true, true, false, true]);
    // Channel 1 is first on the shank, channel 0 second
    assert_relative_eq!(written.xcoords()[1], 220.0);
    assert_relative_eq!(written.xcoords()[0], 180.0);
    assert_relative_eq!(written.ycoords()[2], -80.0);
}

#[test]
fn test_probe_name_ignores_metadata() {
    let (_root, dir) = session_dir("rat07");
    write_session_json(&dir, "rat07", "poly3", "[[0, 1, 2]]");

    let request = ChanMapRequest::new(&dir).with_probe_name("NeuroPixels1_checkerboard");
    let output = create_channel_map(&request, &ChanMapConfig::default()).unwrap();

    assert_eq!(output.probe.name(), "NeuroPixels1_checkerboard");
}

#[test]
fn test_config_output_format_used() {
    let (_root, dir) = session_dir("rat07");
    let config = ChanMapConfig::default().with_output_format(OutputFormat::Json);

    let output = create_channel_map(&ChanMapRequest::new(&dir), &config).unwrap();
    assert!(output.path.ends_with("chanMap.json"));
}

#[test]
fn test_dot_and_empty_save_path_use_current_directory() {
    let (_root, dir) = session_dir("rat07");
    write_neuroscope_xml(&dir, "rat07");

    // Only test in this file that touches the working directory
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(&dir).unwrap();
    let dot = build_channel_map(&ChanMapRequest::new("."), &ChanMapConfig::default());
    let empty = create_channel_map(&ChanMapRequest::new(""), &ChanMapConfig::default());
    std::env::set_current_dir(previous).unwrap();

    let (_, probe) = dot.unwrap();
    assert_eq!(probe, ResolvedProbe::Legacy(ProbeFamily::Staggered));

    let output = empty.unwrap();
    assert_eq!(output.probe, ResolvedProbe::Legacy(ProbeFamily::Staggered));
    assert_eq!(output.path, dir.join("chanMap.mat").canonicalize().unwrap());
}

#[test]
fn test_parent_component_resolves_to_session_name() {
    let (_root, dir) = session_dir("rat07");
    write_session_json(&dir, "rat07", "poly3", "[[0, 1, 2]]");
    fs::create_dir(dir.join("kilosort")).unwrap();

    let request = ChanMapRequest::new(dir.join("kilosort").join(".."));
    let output = create_channel_map(&request, &ChanMapConfig::default()).unwrap();

    assert_eq!(output.probe, ResolvedProbe::Legacy(ProbeFamily::Poly3));
    assert_eq!(output.path, dir.join("chanMap.mat").canonicalize().unwrap());
}

// =============================================================================
// Failures write nothing
// =============================================================================

#[test]
fn test_missing_metadata_file_writes_nothing() {
    let (_root, dir) = session_dir("rat07");
    let request = ChanMapRequest::new(&dir).with_metadata_file(dir.join("rat07.xml"));

    let err = create_channel_map(&request, &ChanMapConfig::default()).unwrap_err();

    assert!(matches!(err, ChanMapError::MetadataNotFound { .. }));
    assert!(err.to_string().contains("does not exist"));
    assert!(listing(&dir).is_empty());
}

#[test]
fn test_unsupported_family_lists_valid_names() {
    let (_root, dir) = session_dir("rat07");
    let file = write_session_json(&dir, "rat07", "tetrode", "[[0, 1, 2, 3]]");

    let request = ChanMapRequest::new(&dir).with_metadata_file(&file);
    let err = create_channel_map(&request, &ChanMapConfig::default()).unwrap_err();

    let msg = err.to_string();
    for family in ProbeFamily::ALL {
        assert!(msg.contains(family.name()), "{msg}");
    }
    assert_eq!(listing(&dir), vec!["rat07.session.json".to_string()]);
}

#[test]
fn test_duplicate_channel_rejected() {
    let (_root, dir) = session_dir("rat07");
    write_session_json(&dir, "rat07", "poly5", "[[0, 1, 2], [2, 3]]");

    let err = create_channel_map(&ChanMapRequest::new(&dir), &ChanMapConfig::default()).unwrap_err();
    assert!(matches!(err, ChanMapError::Layout(_)));
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_mat_and_json_round_trip_agree() {
    let (_root, dir) = session_dir("rat07");
    write_session_json(&dir, "rat07", "poly5", "[[4, 0, 8, 2, 6, 1, 3], [5, 7, 9]]");

    let mat = create_channel_map(&ChanMapRequest::new(&dir), &ChanMapConfig::default()).unwrap();
    let json = create_channel_map(
        &ChanMapRequest::new(&dir).with_output_format(OutputFormat::Json),
        &ChanMapConfig::default(),
    )
    .unwrap();

    let from_mat = read_channel_map(&mat.path).unwrap();
    let from_json = read_channel_map(&json.path).unwrap();
    assert_eq!(from_mat, from_json);
    assert_eq!(from_mat, mat.map);
    assert_eq!(from_mat.chan_map_0ind(), (0..10).collect::<Vec<u32>>());
}
