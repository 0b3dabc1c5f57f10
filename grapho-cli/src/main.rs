// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Grapho CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v takes precedence over --log-level; RUST_LOG can still override
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "Grapho".bold().green(), grapho::VERSION);
            println!("In-memory graph database with a durable commit log");
            Ok(())
        }
        Commands::Serve {
            addr,
            data,
            log_format,
        } => cli::handle_serve(addr, data, log_format),
        Commands::Connect { addr } => cli::handle_connect(addr),
    }
}
