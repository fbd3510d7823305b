//! Crown - print-quality PDF books from Markdown.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod observer;
mod pipeline;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::CrownConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose_log);

    // Scaffolding runs before there is a config to load
    if let Commands::Create { name, template } = &cli.command {
        return cli::create::create_project(name, template).map(|_| ());
    }

    let config = Arc::new(CrownConfig::load(&cli)?);

    match &cli.command {
        Commands::Build { .. } => cli::build::build_book(config).map(|_| ()),
        Commands::Watch => cli::watch::watch(config),
        Commands::Dev { .. } => cli::dev::dev(config),
        Commands::Preview { target } => cli::preview::preview(&config, *target),
        Commands::Create { .. } => Ok(()),
    }
}
