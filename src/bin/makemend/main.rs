//! Makemend CLI - in-place Makefile tree rewriter

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use makemend::ops;
use makemend::Config;

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
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

    if let Some(path) = &cli.dump {
        print!("{}", ops::dump(path)?);
        return Ok(());
    }

    if cli.report {
        print!("{}", ops::report(&cli.root)?);
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config);
    ops::update(&cli.root, &config)?;
    Ok(())
}
