use std::path::PathBuf;

use clap::Parser;

/// Load a data directory and print what ended up in the catalog.
///
/// Settings not given on the command line come from the environment
/// (`GEOCAT_*`, optionally prefixed by `GEOCAT_PROFILE`) or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "geocat", about = "Load a GeoServer-style data directory")]
pub struct CliArgs {
    /// Root of the data directory (overrides GEOCAT_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Migrate legacy layouts in memory only, never writing to disk
    #[arg(long)]
    pub legacy: bool,

    /// Skip the store connectivity probe
    #[arg(long)]
    pub no_probe: bool,

    /// Service types loaded from `<type>.xml` descriptors
    #[arg(long, value_delimiter = ',', default_value = "WMS,WFS,WCS")]
    pub services: Vec<String>,

    /// Run a reload right after the first load
    #[arg(long)]
    pub reload: bool,

    /// Print the load report as JSON instead of a text summary
    #[arg(long, env = "GEOCAT_JSON")]
    pub json: bool,
}
