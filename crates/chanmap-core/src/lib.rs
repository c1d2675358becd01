//! Chanmap Core - `no_std` probe geometry and channel map types
//!
//! This crate provides the data model and the geometry rules used to build
//! spike-sorter channel maps. It has no file system access and needs only
//! `alloc`, so the same layouts can be computed on the host or embedded in
//! other tooling.
//!
//! # Modules
//!
//! - [`types`]: Per-channel records, channel maps, electrode groups
//! - [`probe`]: Closed enumerations of supported probes and probe families
//! - [`legacy`]: Layouts computed from session metadata (shank rules)
//! - [`local`]: Built-in registry of pre-defined probe layouts
//! - [`error`]: Error types for layout construction and name parsing
//!
//! # Example
//!
//! ```rust
//! use chanmap_core::legacy;
//! use chanmap_core::probe::ProbeFamily;
//! use chanmap_core::types::ElectrodeGroups;
//!
//! let groups = ElectrodeGroups::new(vec![vec![0, 1, 2, 3]]);
//! let map = legacy::layout(ProbeFamily::TwoHundred, &groups, None).unwrap();
//!
//! assert_eq!(map.ycoords(), vec![0.0, 200.0, 0.0, 200.0]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod legacy;
pub mod local;
pub mod probe;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{LayoutError, ProbeNameError};
pub use probe::{LocalProbe, ProbeFamily, ResolvedProbe};
pub use types::{ChannelMap, ChannelRecord, ElectrodeGroups, RawParams};
