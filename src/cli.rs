//! Command-line arguments of the replay binary.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mouthguard-tracker", author, version, about, long_about = None)]
pub struct Args {
    /// Landmark trace to replay (YAML)
    #[arg(short, long, required_unless_present = "write_config")]
    pub trace: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Write the example configuration to this path and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,

    /// Overlay asset to load (overrides the configured path)
    #[arg(short, long)]
    pub asset: Option<PathBuf>,

    /// Treat neither the source video nor the overlay canvas as mirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Positional smoothing filter (none, exponential:<alpha>, moving_average:<window>)
    #[arg(short, long)]
    pub smoothing: Option<String>,

    /// Missed detections tolerated before the overlay is hidden
    #[arg(short, long)]
    pub grace: Option<u32>,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if self.no_mirror {
            config.pose.source_mirrored = false;
            config.pose.canvas_mirrored = false;
        }
        if let Some(filter) = &self.smoothing {
            config.smoothing.filter.clone_from(filter);
        }
        if let Some(grace) = self.grace {
            config.tracking.grace_misses = grace;
        }
        if let Some(asset) = &self.asset {
            config.asset.path = Some(asset.clone());
        }
    }
}
