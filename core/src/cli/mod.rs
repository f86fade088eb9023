pub mod report;

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for skullstrip
#[derive(Parser, Debug)]
#[command(name = "skullstrip")]
#[command(about = "Brain extraction for MINC volumes: writes <base>_mesh.vtk and <base>_seg.mnc")]
#[command(version)]
pub struct Cli {
    /// Path to the MINC volume
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
