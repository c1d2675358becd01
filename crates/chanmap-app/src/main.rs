//! Chanmap Application
//!
//! Command-line entry point for generating spike-sorter channel maps.
//!
//! # Usage
//!
//! ```bash
//! # Channel map for the current directory (default if no subcommand)
//! chanmap
//!
//! # Session directory with metadata discovered automatically
//! chanmap create --save-path /data/rat01_day2
//!
//! # Built-in probe, JSON output
//! chanmap create --probe NeuroPixels1_checkerboard --format json
//!
//! # List supported probes and families
//! chanmap probes
//!
//! # Inspect a written artifact
//! chanmap show /data/rat01_day2/chanMap.mat
//! ```

use std::path::{Path, PathBuf};

use chanmap_core::{LocalProbe, ProbeFamily};
use chanmap_native::{create_channel_map, read_channel_map, ChanMapConfig, ChanMapRequest, OutputFormat};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Chanmap Application
#[derive(Parser, Debug)]
#[command(name = "chanmap")]
#[command(author, version, about = "Channel map generator for extracellular probes", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a channel map (default if no subcommand)
    Create {
        /// Session directory; defaults to the current directory
        #[arg(short, long)]
        save_path: Option<PathBuf>,

        /// Explicit session metadata file (.json or .xml)
        #[arg(short, long)]
        metadata_file: Option<PathBuf>,

        /// Built-in probe name; session metadata is ignored when given
        #[arg(short, long)]
        probe: Option<String>,

        /// Output format: mat or json
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Session basename used to find default metadata files
        #[arg(short, long)]
        basename: Option<String>,

        /// JSON file overriding the default configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List built-in probes and metadata probe families
    Probes,

    /// Print the contents of a chanMap.mat or chanMap.json file
    Show {
        /// Path to the channel map artifact
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        None => run_create(None, None, None, None, None, None)?,
        Some(Commands::Create {
            save_path,
            metadata_file,
            probe,
            format,
            basename,
            config,
        }) => run_create(save_path, metadata_file, probe, format, basename, config)?,
        Some(Commands::Probes) => list_probes(),
        Some(Commands::Show { path }) => show(&path)?,
    }

    Ok(())
}

/// Resolve, build and write a channel map
fn run_create(
    save_path: Option<PathBuf>,
    metadata_file: Option<PathBuf>,
    probe: Option<String>,
    format: Option<OutputFormat>,
    basename: Option<String>,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => ChanMapConfig::from_json_file(&path)?,
        None => ChanMapConfig::default(),
    };

    let mut request = ChanMapRequest::new(save_path.unwrap_or_default());
    if let Some(file) = metadata_file {
        request = request.with_metadata_file(file);
    }
    if let Some(name) = probe {
        request = request.with_probe_name(name);
    }
    if let Some(name) = basename {
        request = request.with_basename(name);
    }
    if let Some(format) = format {
        request = request.with_output_format(format);
    }

    let output = create_channel_map(&request, &config)?;

    info!(
        "Wrote {} channels ({} connected) for {}",
        output.map.len(),
        output.map.connected_count(),
        output.probe
    );
    println!("{}", output.path.display());

    Ok(())
}

fn list_probes() {
    println!("Built-in probes:");
    for probe in LocalProbe::ALL {
        println!("  {probe}");
    }
    println!("Metadata probe families:");
    for family in ProbeFamily::ALL {
        println!("  {family}");
    }
}

/// Print a written artifact as one row per channel
fn show(path: &Path) -> anyhow::Result<()> {
    let map = read_channel_map(path)?;

    println!(
        "{}: {} channels, {} connected, shanks {:?}",
        path.display(),
        map.len(),
        map.connected_count(),
        map.shanks()
    );
    println!("{:>8} {:>8} {:>10} {:>10} {:>10} {:>8}", "chanMap", "0ind", "connected", "x", "y", "k");
    for record in &map {
        println!(
            "{:>8} {:>8} {:>10} {:>10.1} {:>10.1} {:>8}",
            record.index, record.index0, record.connected, record.x, record.y, record.group
        );
    }

    Ok(())
}
