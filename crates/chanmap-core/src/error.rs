//! Error types for channel map construction
//!
//! These errors work in `no_std` environments and carry enough context to
//! name the offending channel, column or probe without a logging backend.

use alloc::string::String;
use core::fmt;

use crate::probe::{LocalProbe, ProbeFamily};

// ============================================================================
// Layout Errors
// ============================================================================

/// Errors raised while building or reassembling a channel map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No electrode groups, or groups that hold no channels at all
    EmptyGroups,
    /// A channel index is listed in more than one place
    DuplicateChannel {
        /// The repeated 0-based channel index
        channel: u32,
    },
    /// A column does not have the same length as the first column
    ColumnLengthMismatch {
        /// Column name as written to the output artifact
        column: &'static str,
        /// Length of the `chanMap` column
        expected: usize,
        /// Length of the offending column
        got: usize,
    },
    /// `chanMap0ind` is not `chanMap - 1` at some position
    IndexMismatch {
        /// 0-based position in the map
        position: usize,
        /// 1-based index at that position
        index: u32,
        /// 0-based index at that position
        index0: u32,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroups => write!(f, "Electrode groups contain no channels"),
            Self::DuplicateChannel { channel } => {
                write!(f, "Channel {channel} appears in more than one electrode group position")
            }
            Self::ColumnLengthMismatch { column, expected, got } => {
                write!(f, "Column '{column}' has {got} entries, expected {expected}")
            }
            Self::IndexMismatch { position, index, index0 } => {
                write!(
                    f,
                    "chanMap0ind mismatch at position {position}: chanMap={index}, chanMap0ind={index0}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

// ============================================================================
// Probe Name Errors
// ============================================================================

/// Errors raised when a probe or probe family name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeNameError {
    /// Name is not one of the built-in probes
    UnknownProbe {
        /// The rejected name
        name: String,
    },
    /// Name is not one of the metadata-derived probe families
    UnsupportedFamily {
        /// The rejected name
        name: String,
    },
}

impl fmt::Display for ProbeNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProbe { name } => {
                write!(f, "Unknown probe name '{name}'. Supported probes: ")?;
                write_names(f, LocalProbe::ALL.iter().map(|p| p.name()))
            }
            Self::UnsupportedFamily { name } => {
                write!(f, "Probe family '{name}' is not supported. Supported families: ")?;
                write_names(f, ProbeFamily::ALL.iter().map(|p| p.name()))
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProbeNameError {}

fn write_names<'a>(
    f: &mut fmt::Formatter<'_>,
    names: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    for (i, name) in names.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_family_error_lists_all_families() {
        let err = ProbeNameError::UnsupportedFamily { name: "tetrode".to_string() };
        let msg = err.to_string();

        assert!(msg.contains("'tetrode'"));
        for family in ProbeFamily::ALL {
            assert!(msg.contains(family.name()), "missing {}", family.name());
        }
    }

    #[test]
    fn test_probe_error_lists_local_probes() {
        let err = ProbeNameError::UnknownProbe { name: "np2".to_string() };
        assert!(err.to_string().ends_with("NeuroPixels1_checkerboard"));
    }
}
