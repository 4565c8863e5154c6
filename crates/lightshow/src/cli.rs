//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "lightshow")]
#[command(about = "Drive two RGB fixtures from live microphone input", long_about = None)]
#[command(
    after_help = "If no input device is given, all devices are tested until one works."
)]
pub struct Cli {
    /// Capture device to use (see --list-devices)
    #[arg(value_name = "INPUT-DEVICE-NAME")]
    pub device: Option<String>,

    /// Configuration file [default: <config dir>/lightshow/config.yaml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Drive simulated outputs instead of GPIO pins
    #[arg(long)]
    pub dry_run: bool,

    /// Print the capture devices found and exit
    #[arg(long)]
    pub list_devices: bool,
}
