// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Test fixture running a full Grapho server over a real TCP socket
//!
//! Each fixture binds to an ephemeral port on localhost with its own data
//! directory. `ServerFixture::start` can be pointed at an existing
//! directory to simulate a server restart over the same state.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use grapho::catalog::{FileStore, Registry};
use grapho::server::{CommitLog, LogFormat, Server, ServerError};

pub struct ServerFixture {
    addr: SocketAddr,
    handle: grapho::server::Handle,
    join: Option<JoinHandle<()>>,
    commit_log: Arc<CommitLog>,
}

impl std::fmt::Debug for ServerFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerFixture")
            .field("addr", &self.addr)
            .finish()
    }
}

impl ServerFixture {
    /// Start a server over `data_dir`, replaying whatever state is there.
    pub fn start(data_dir: &Path, format: LogFormat) -> Result<Self, ServerError> {
        let store = FileStore::new(data_dir).expect("create file store");
        let registry = Arc::new(Registry::open(Box::new(store)).expect("open registry"));

        let commit_log =
            Arc::new(CommitLog::open(data_dir, format).expect("open commit log"));
        commit_log.start();

        let server = Server::bind("127.0.0.1:0", registry, Some(commit_log.clone()))?;
        let addr = server.local_addr();
        let handle = server.handle();
        let join = std::thread::spawn(move || {
            let _ = server.run();
        });

        Ok(Self {
            addr,
            handle,
            join: Some(join),
            commit_log,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> Client {
        Client::connect(self.addr)
    }

    /// Clean shutdown: close the listener and clients, then stop the
    /// commit log so every accepted entry is durable.
    pub fn stop(mut self) {
        self.handle.stop();
        if let Some(join) = self.join.take() {
            join.join().expect("server thread");
        }
        self.commit_log.stop().expect("stop commit log");
    }
}

/// Minimal line-protocol client for tests
pub struct Client {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    pub fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut client = Self {
            writer: stream,
            reader,
        };
        // consume the three welcome lines
        for _ in 0..3 {
            client.read_line();
        }
        client
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read line");
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Send one command and collect the full response block.
    pub fn send(&mut self, command: &str) -> Vec<String> {
        writeln!(self.writer, "{}", command).expect("write command");
        let mut lines = Vec::new();
        loop {
            let line = self.read_line();
            if line.starts_with("OK - ") || line.starts_with("No statements") {
                lines.push(line);
                // trailing blank line after the completion marker
                self.read_line();
                return lines;
            }
            if line.starts_with("Error executing") {
                lines.push(line);
                return lines;
            }
            if line.is_empty()
                && lines
                    .first()
                    .map_or(false, |l: &String| l.starts_with("Parse errors:"))
            {
                return lines;
            }
            lines.push(line);
        }
    }

    pub fn quit(mut self) {
        let _ = writeln!(self.writer, "quit");
        let _ = self.read_line(); // Goodbye!
    }
}

/// Assert that some line of `response` contains `needle`.
pub fn assert_response_contains(response: &[String], needle: &str) {
    assert!(
        response.iter().any(|line| line.contains(needle)),
        "expected a line containing {:?} in {:#?}",
        needle,
        response
    );
}
