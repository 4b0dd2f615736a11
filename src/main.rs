// src/main.rs
use anyhow::Result;
use clap::Parser;

use setlistr::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the default filter
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    cli::run(args)
}
