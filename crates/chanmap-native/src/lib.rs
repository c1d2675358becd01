//! Chanmap Native - Host-side channel map generation
//!
//! This crate turns a probe name or a recording session's metadata into a
//! spike-sorter channel map file:
//! - Metadata resolution (explicit probe, explicit file, session defaults)
//! - Session metadata import (JSON session record, Neuroscope XML)
//! - Channel map writers (MAT v5, JSON)
//!
//! # Modules
//!
//! - [`resolver`]: Choose the layout source for a request
//! - [`metadata`]: Parse session metadata files
//! - [`writer`]: Encode and write `chanMap.<ext>` artifacts
//! - [`orchestrator`]: Resolve → build → write pipeline
//! - [`config`]: Defaults injected at startup
//!
//! # Example
//!
//! ```rust,no_run
//! use chanmap_native::{create_channel_map, ChanMapConfig, ChanMapRequest};
//!
//! let request = ChanMapRequest::new("/data/rat01").with_probe_name("NeuroPixels1_checkerboard");
//! let output = create_channel_map(&request, &ChanMapConfig::default())?;
//! println!("{} -> {}", output.probe, output.path.display());
//! # Ok::<(), chanmap_native::ChanMapError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod resolver;
pub mod writer;

// Re-export key types
pub use config::ChanMapConfig;
pub use error::{ChanMapError, ChanMapResult};
pub use orchestrator::{build_channel_map, create_channel_map, ChanMapOutput};
pub use resolver::{resolve, ChanMapRequest, Resolution};
pub use writer::{read_channel_map, write_channel_map, OutputFormat};
