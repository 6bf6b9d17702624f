//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Makemend - rewrites a tree of hand-written Makefiles in place
#[derive(Parser)]
#[command(name = "makemend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Survey the tree and report names defined in more than one
    /// Makefile, without rewriting anything
    #[arg(long, conflicts_with = "dump")]
    pub report: bool,

    /// Parse one Makefile and print its model, without rewriting
    /// anything
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", default_value = "makemend.toml")]
    pub config: PathBuf,

    /// Root of the Makefile tree
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}
