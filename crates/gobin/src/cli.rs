//! CLI structure using clap

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gobin")]
#[command(version, about = "Build and cache versioned Go tools", long_about = None)]
pub struct Cli {
    /// Module reference, e.g. github.com/org/tool/cmd/tool@v1.2.3
    pub reference: String,

    /// Print the built binary's path to stdout
    #[arg(short, long)]
    pub print_path: bool,

    /// Directory to build from, relative to the repository root
    #[arg(long, value_name = "DIR", default_value = "")]
    pub build_dir: String,

    /// Package path passed to `go build`
    #[arg(long, value_name = "PATH", default_value = "")]
    pub build_path: String,

    /// Run the built binary (not supported)
    #[arg(long)]
    pub run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Cache root directory
    #[arg(long, value_name = "DIR", env = "GOBIN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}
