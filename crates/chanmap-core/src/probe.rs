//! Probe identities
//!
//! Two closed enumerations: probes with a fixed, built-in layout
//! ([`LocalProbe`]) and probe families whose layout is derived from the
//! electrode groups found in session metadata ([`ProbeFamily`]).

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProbeNameError;

// ============================================================================
// Built-in Probes
// ============================================================================

/// Probe with a pre-registered layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalProbe {
    /// Neuropixels 1.0, 384 sites in the checkerboard bank-0 pattern
    #[default]
    #[serde(rename = "NeuroPixels1_checkerboard")]
    NeuroPixels1Checkerboard,
}

impl LocalProbe {
    /// All built-in probes
    pub const ALL: [Self; 1] = [Self::NeuroPixels1Checkerboard];

    /// Canonical probe name, as accepted on the command line
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NeuroPixels1Checkerboard => "NeuroPixels1_checkerboard",
        }
    }
}

impl fmt::Display for LocalProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalProbe {
    type Err = ProbeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ProbeNameError::UnknownProbe { name: s.to_string() })
    }
}

// ============================================================================
// Metadata-Derived Probe Families
// ============================================================================

/// Probe family whose geometry is computed per electrode group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFamily {
    /// Two-column zig-zag, 20 µm pitch
    Staggered,
    /// Two-column zig-zag (same geometry as `staggered`)
    Poly2,
    /// Three-column zig-zag, 18 µm column spacing
    Poly3,
    /// Five-column zig-zag, 18 µm column spacing
    Poly5,
    /// Surface grid; four groups share one shank id
    Neurogrid,
    /// Two rows 200 µm apart, one column per group
    TwoHundred,
}

impl ProbeFamily {
    /// All supported families
    pub const ALL: [Self; 6] = [
        Self::Staggered,
        Self::Poly2,
        Self::Poly3,
        Self::Poly5,
        Self::Neurogrid,
        Self::TwoHundred,
    ];

    /// Family name as written in session metadata
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Staggered => "staggered",
            Self::Poly2 => "poly2",
            Self::Poly3 => "poly3",
            Self::Poly5 => "poly5",
            Self::Neurogrid => "neurogrid",
            Self::TwoHundred => "twohundred",
        }
    }

    /// Shank id for the 1-based electrode group `group`.
    ///
    /// Neurogrid arrays pack four electrode groups onto one shank id.
    #[inline]
    #[must_use]
    pub const fn shank_for_group(self, group: u32) -> u32 {
        match self {
            Self::Neurogrid => (group - 1) / 4 + 1,
            _ => group,
        }
    }
}

impl fmt::Display for ProbeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProbeFamily {
    type Err = ProbeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ProbeNameError::UnsupportedFamily { name: s.to_string() })
    }
}

// ============================================================================
// Resolved Probe
// ============================================================================

/// The probe a channel map was actually built for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "name", rename_all = "lowercase")]
pub enum ResolvedProbe {
    /// Built-in registry entry
    Local(LocalProbe),
    /// Family named by session metadata
    Legacy(ProbeFamily),
}

impl ResolvedProbe {
    /// Probe or family name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Local(p) => p.name(),
            Self::Legacy(f) => f.name(),
        }
    }
}

impl fmt::Display for ResolvedProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
