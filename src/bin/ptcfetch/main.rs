//! ptcfetch CLI - downloads and tags the chord practice tracks

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use makemend::chords::tag::TagError;
use makemend::ops;

/// Download the "Playing the Changes" practice tracks and write their
/// ID3 tags
#[derive(Parser)]
#[command(name = "ptcfetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Directory to download into
    #[arg(value_name = "DIR", default_value = ".")]
    dest: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("makemend=debug")
    } else {
        EnvFilter::new("makemend=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = ops::fetch_tracks(&cli.dest) {
        eprintln!("error: {:#}", e);
        // A failed tagger run surfaces the child's exit code.
        let code = match e.downcast_ref::<TagError>() {
            Some(TagError::CommandFailed { code, .. }) if *code > 0 => *code,
            _ => 1,
        };
        std::process::exit(code);
    }
}
