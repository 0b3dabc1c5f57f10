// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI argument definitions and command handlers

mod render;

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use grapho::catalog::{FileStore, Registry};
use grapho::server::{CommitLog, LogFormat, Server};

use render::MatchRenderer;

#[derive(Parser)]
#[command(name = "grapho", about = "Grapho graph database", version = grapho::VERSION)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print version information
    Version,

    /// Run the Grapho server
    Serve {
        /// TCP address to listen on (":8080" binds all interfaces)
        #[arg(long, default_value = ":8080")]
        addr: String,

        /// Directory for catalog data and the commit log
        #[arg(long, default_value = "./data")]
        data: PathBuf,

        /// Commit log framing
        #[arg(long = "log-format", value_enum, default_value = "binary")]
        log_format: LogFormatArg,
    },

    /// Connect to a running server interactively
    Connect {
        /// Server address to connect to
        #[arg(long, default_value = "localhost:8080")]
        addr: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Binary,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Binary => LogFormat::Binary,
        }
    }
}

/// Accept the ":8080" shorthand for "listen on every interface".
fn normalize_addr(addr: &str) -> String {
    if let Some(port) = addr.strip_prefix(':') {
        format!("0.0.0.0:{}", port)
    } else {
        addr.to_string()
    }
}

pub fn handle_serve(
    addr: String,
    data: PathBuf,
    log_format: LogFormatArg,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&data)?;
    let registry = Arc::new(Registry::open(Box::new(store))?);

    let commit_log = Arc::new(CommitLog::open(&data, log_format.into())?);
    commit_log.start();

    let server = Server::bind(&normalize_addr(&addr), registry, Some(commit_log.clone()))?;
    println!(
        "{} listening on {}",
        "Grapho".bold().green(),
        server.local_addr()
    );
    server.run()?;

    commit_log.stop()?;
    Ok(())
}

pub fn handle_connect(addr: String) -> Result<(), Box<dyn std::error::Error>> {
    let conn = TcpStream::connect(&addr).map_err(|e| {
        format!("failed to connect to server at {}: {}", addr, e)
    })?;
    println!("Connected to Grapho server at {}", addr.bold());
    println!("Type statements or 'quit' to exit");

    // reader thread renders server responses while we read stdin
    let reader_conn = conn.try_clone()?;
    let reader = std::thread::spawn(move || {
        let mut renderer = MatchRenderer::new();
        let reader = BufReader::new(reader_conn);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            renderer.feed(&line);
        }
    });

    let stdin = std::io::stdin();
    let mut conn_writer = conn.try_clone()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            let _ = writeln!(conn_writer, "quit");
            break;
        }
        writeln!(conn_writer, "{}", line)?;
    }

    let _ = conn.shutdown(std::net::Shutdown::Both);
    let _ = reader.join();
    Ok(())
}
