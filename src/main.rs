//! wikiup - publish local web assets to a wiki-style content host.

#![allow(dead_code)]

mod asset;
mod cli;
mod config;
mod logger;
mod rewrite;
mod title;
mod wiki;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{Config, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);
    logger::set_quiet(cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("cannot load configuration")?;

    match &cli.command {
        Commands::Upload { patterns, args } => {
            let settings = Settings::resolve(&cli, Some(args), &config);
            if settings.dry_run {
                log!("upload"; "executing in dry-run mode");
            }
            cli::upload::run(patterns, &settings)
        }
        Commands::Search { args } => {
            let settings = Settings::resolve(&cli, None, &config);
            cli::search::run(args, &settings)
        }
        Commands::Delete { args } => {
            let settings = Settings::resolve(&cli, None, &config);
            cli::delete::run(args, &settings)
        }
    }
}
