// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Line-oriented TCP front end
//!
//! Clients send statements terminated by `;`; the server buffers lines
//! until a command is complete, parses it, executes it, and writes response
//! lines back. Mutating commands are appended to the commit log after
//! successful execution. On startup, before any client is accepted, the
//! commit log is replayed through the executor with output suppressed; a
//! replay failure is fatal so the server never serves from a
//! possibly-corrupted state.

mod commit_log;

pub use commit_log::{CommitLog, CommitLogError, CommitLogResult, LogFormat};

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::ast::parser::parse_script;
use crate::catalog::Registry;
use crate::exec::Executor;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("replay commit log failed: {0}")]
    Replay(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

struct Shared {
    registry: Arc<Registry>,
    executor: Mutex<Executor>,
    commit_log: Option<Arc<CommitLog>>,
    replaying: AtomicBool,
    shutdown: AtomicBool,
    clients: Mutex<Vec<TcpStream>>,
}

/// TCP server executing RDCL commands against a catalog registry
pub struct Server {
    listener: TcpListener,
    local_addr: std::net::SocketAddr,
    shared: Arc<Shared>,
}

impl Server {
    /// Bind the listener and replay the commit log (if one is attached)
    /// so the graph is reconstructed before any client connects.
    pub fn bind(
        addr: &str,
        registry: Arc<Registry>,
        commit_log: Option<Arc<CommitLog>>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let shared = Arc::new(Shared {
            executor: Mutex::new(Executor::new(registry.clone())),
            registry,
            commit_log,
            replaying: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            clients: Mutex::new(Vec::new()),
        });

        let server = Self {
            listener,
            local_addr,
            shared,
        };
        server.replay_commit_log()?;
        Ok(server)
    }

    /// The bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Registry backing this server.
    pub fn registry(&self) -> Arc<Registry> {
        self.shared.registry.clone()
    }

    fn replay_commit_log(&self) -> Result<(), ServerError> {
        let Some(commit_log) = &self.shared.commit_log else {
            return Ok(());
        };
        self.shared.replaying.store(true, Ordering::SeqCst);
        let shared = &self.shared;
        let mut replayed = 0u64;
        let result = commit_log.replay(|line| {
            let (stmts, errs) = parse_script(line);
            if !errs.is_empty() {
                return Err(format!("replay parse error: {:?}", errs).into());
            }
            let mut sink = std::io::sink();
            let mut exec = shared.executor.lock();
            for stmt in &stmts {
                // the catalog store already reconstructed all DDL; replaying
                // it again would collide with the loaded schema
                if stmt.is_ddl() {
                    continue;
                }
                exec.execute_statement(&mut sink, stmt)
                    .map_err(|e| format!("replay exec error: {}", e))?;
            }
            replayed += 1;
            Ok(())
        });
        self.shared.replaying.store(false, Ordering::SeqCst);
        match result {
            Ok(()) => {
                log::info!("commit log replayed: {} command(s)", replayed);
                Ok(())
            }
            Err(e) => Err(ServerError::Replay(e.to_string())),
        }
    }

    /// Accept connections until [`Handle::stop`] is called. Each client is
    /// served on its own thread.
    pub fn run(self) -> Result<(), ServerError> {
        log::info!("server listening on {}", self.local_addr);
        for stream in self.listener.incoming() {
            if self.shared.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let shared = self.shared.clone();
                    if let Ok(clone) = stream.try_clone() {
                        shared.clients.lock().push(clone);
                    }
                    std::thread::spawn(move || handle_connection(shared, stream));
                }
                Err(e) => {
                    log::warn!("failed to accept connection: {}", e);
                }
            }
        }
        Ok(())
    }

    /// A handle that can stop the accept loop from another thread.
    pub fn handle(&self) -> Handle {
        Handle {
            shared: self.shared.clone(),
            addr: self.local_addr,
        }
    }
}

/// Stops a running server: closes the listener and all client connections.
pub struct Handle {
    shared: Arc<Shared>,
    addr: std::net::SocketAddr,
}

impl Handle {
    pub fn stop(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        // wake the accept loop so it observes the flag
        let _ = TcpStream::connect(self.addr);
        for client in self.shared.clients.lock().drain(..) {
            let _ = client.shutdown(std::net::Shutdown::Both);
        }
    }
}

fn handle_connection(shared: Arc<Shared>, stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    log::info!("client connected: {}", peer);

    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(e) => {
            log::warn!("failed to clone stream for {}: {}", peer, e);
            return;
        }
    };
    let reader = BufReader::new(stream);

    let _ = writeln!(writer, "Welcome to Grapho");
    let _ = writeln!(
        writer,
        "Enter statements terminated by a semicolon; type 'quit' to exit"
    );
    let _ = writeln!(writer);

    let mut command = String::new();
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("error reading from client {}: {}", peer, e);
                break;
            }
        };
        let line = line.trim();

        if line == "quit" || line == "exit" {
            let _ = writeln!(writer, "Goodbye!");
            break;
        }
        if line.is_empty() {
            continue;
        }

        command.push_str(line);
        command.push(' ');

        // a command is complete once a line ends with ';'
        if line.ends_with(';') {
            let full = std::mem::take(&mut command);
            execute_command(&shared, &mut writer, &full);
        }
    }

    log::info!("client disconnected: {}", peer);
}

fn execute_command(shared: &Shared, out: &mut dyn Write, command: &str) {
    let command = command.trim();
    if command.is_empty() {
        return;
    }
    log::debug!("executing command: {}", command);

    let (stmts, errs) = parse_script(command);
    if !errs.is_empty() {
        let _ = writeln!(out, "Parse errors:");
        for err in &errs {
            let _ = writeln!(out, "  {}", err);
        }
        let _ = writeln!(out);
        return;
    }
    if stmts.is_empty() {
        let _ = writeln!(out, "No statements to execute\n");
        return;
    }

    let mutated = {
        let mut exec = shared.executor.lock();
        match exec.execute_statements(out, &stmts) {
            Ok(mutated) => mutated,
            Err(_) => return, // error already written to the client
        }
    };

    // mutations are persisted after successful execution, never during replay
    if mutated && !shared.replaying.load(Ordering::SeqCst) {
        if let Some(commit_log) = &shared.commit_log {
            let mut to_append = command.to_string();
            if !to_append.ends_with(';') {
                to_append.push(';');
            }
            if let Err(e) = commit_log.append(&to_append) {
                log::warn!("commit log append failed: {}", e);
            }
        }
    }
}
