// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable commit log for mutating commands
//!
//! Every mutating command the server accepts is appended here as its
//! original text, in acceptance order, so replaying the log through the
//! executor reproduces the live graph. A single background thread drains a
//! bounded queue and writes through a buffered writer; a periodic tick
//! flushes and fsyncs. When the queue is full, `append` falls back to a
//! synchronous write under the same lock that guards the background
//! writer's buffer, so no entry is lost and the total order is preserved.
//!
//! Two framings are supported: newline-terminated text, and binary records
//! of a 4-byte big-endian length followed by the raw bytes (10 MiB cap).

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, tick, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use thiserror::Error;

const COMMIT_LOG_FILE: &str = "commit.log";
const QUEUE_CAPACITY: usize = 1024;
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);
/// Maximum size of a single record on replay (10 MiB)
const MAX_RECORD_LEN: u32 = 10 << 20;

#[derive(Error, Debug)]
pub enum CommitLogError {
    #[error("empty command")]
    EmptyCommand,

    #[error("commit log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record length: {0}")]
    InvalidRecordLength(u32),

    #[error("replay read body: record truncated")]
    TruncatedRecord,

    #[error("replay apply failed: {0}")]
    Apply(String),
}

pub type CommitLogResult<T> = Result<T, CommitLogError>;

/// How entries are framed on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Text,
    #[default]
    Binary,
}

struct Inner {
    writer: BufWriter<File>,
}

impl Inner {
    fn write_entry(&mut self, line: &str, format: LogFormat) -> std::io::Result<()> {
        match format {
            LogFormat::Binary => {
                let bytes = line.as_bytes();
                self.writer.write_all(&(bytes.len() as u32).to_be_bytes())?;
                self.writer.write_all(bytes)?;
            }
            LogFormat::Text => {
                self.writer.write_all(line.as_bytes())?;
                if !line.ends_with('\n') {
                    self.writer.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }

    fn flush_and_sync(&mut self) -> std::io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()
    }
}

/// Append-only log of mutating command text with a background writer
pub struct CommitLog {
    path: PathBuf,
    format: LogFormat,
    inner: Arc<Mutex<Inner>>,
    queue_tx: Sender<String>,
    // taken by start(); consumed by the writer thread
    queue_rx: Mutex<Option<Receiver<String>>>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CommitLog {
    /// Open (or create) the commit log at `data_dir/commit.log`.
    pub fn open(data_dir: impl AsRef<Path>, format: LogFormat) -> CommitLogResult<Self> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let path = data_dir.as_ref().join(COMMIT_LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;
        let (queue_tx, queue_rx) = bounded(QUEUE_CAPACITY);
        Ok(Self {
            path,
            format,
            inner: Arc::new(Mutex::new(Inner {
                writer: BufWriter::with_capacity(64 << 10, file),
            })),
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            shutdown_tx: Mutex::new(None),
            handle: Mutex::new(None),
        })
    }

    /// Start the background writer thread. Idempotent.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            return;
        }
        let queue_rx = match self.queue_rx.lock().take() {
            Some(rx) => rx,
            None => return, // already ran once
        };
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        *self.shutdown_tx.lock() = Some(shutdown_tx);

        let inner = self.inner.clone();
        let format = self.format;
        *handle = Some(std::thread::spawn(move || {
            run_writer(inner, queue_rx, shutdown_rx, format);
        }));
    }

    /// Stop the background writer: drain the queue, flush, fsync, join.
    ///
    /// Shutdown must wait for this to guarantee no accepted entry is lost.
    pub fn stop(&self) -> CommitLogResult<()> {
        let handle = self.handle.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        // dropping the sender signals the writer thread
        self.shutdown_tx.lock().take();
        if handle.join().is_err() {
            log::error!("commit log writer thread panicked");
        }
        self.inner.lock().flush_and_sync()?;
        Ok(())
    }

    /// Enqueue one command for the background writer.
    ///
    /// When the queue is full (or the writer is not running) the command is
    /// written synchronously instead, preserving order relative to the
    /// writer thread via the shared buffer lock.
    pub fn append(&self, command: &str) -> CommitLogResult<()> {
        if command.is_empty() {
            return Err(CommitLogError::EmptyCommand);
        }
        match self.queue_tx.try_send(command.to_string()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) | Err(TrySendError::Disconnected(cmd)) => {
                let mut inner = self.inner.lock();
                inner.write_entry(&cmd, self.format)?;
                inner.writer.flush()?;
                Ok(())
            }
        }
    }

    /// Read the log from the beginning, invoking `apply` for each recorded
    /// command. Entries are trimmed and empty entries skipped; replay stops
    /// at the first `apply` error.
    pub fn replay<F>(&self, mut apply: F) -> CommitLogResult<()>
    where
        F: FnMut(&str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>,
    {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        match self.format {
            LogFormat::Binary => loop {
                let mut hdr = [0u8; 4];
                match reader.read_exact(&mut hdr) {
                    Ok(()) => {}
                    // a clean or mid-header EOF ends replay
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
                    Err(e) => return Err(e.into()),
                }
                let len = u32::from_be_bytes(hdr);
                if len > MAX_RECORD_LEN {
                    return Err(CommitLogError::InvalidRecordLength(len));
                }
                let mut buf = vec![0u8; len as usize];
                match reader.read_exact(&mut buf) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                        return Err(CommitLogError::TruncatedRecord);
                    }
                    Err(e) => return Err(e.into()),
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                apply(line).map_err(|e| CommitLogError::Apply(e.to_string()))?;
            },
            LogFormat::Text => {
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    let read =
                        std::io::BufRead::read_until(&mut reader, b'\n', &mut buf)?;
                    if read == 0 {
                        return Ok(());
                    }
                    if buf.len() as u32 > MAX_RECORD_LEN {
                        return Err(CommitLogError::InvalidRecordLength(buf.len() as u32));
                    }
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    apply(line).map_err(|e| CommitLogError::Apply(e.to_string()))?;
                }
            }
        }
    }
}

fn run_writer(
    inner: Arc<Mutex<Inner>>,
    queue_rx: Receiver<String>,
    shutdown_rx: Receiver<()>,
    format: LogFormat,
) {
    let ticker = tick(FLUSH_INTERVAL);
    loop {
        crossbeam_channel::select! {
            recv(shutdown_rx) -> _ => {
                // drain remaining entries before exiting
                let mut inner = inner.lock();
                while let Ok(line) = queue_rx.try_recv() {
                    if let Err(e) = inner.write_entry(&line, format) {
                        log::error!("commit log write failed during drain: {}", e);
                    }
                }
                if let Err(e) = inner.flush_and_sync() {
                    log::error!("commit log final flush failed: {}", e);
                }
                return;
            }
            recv(queue_rx) -> msg => {
                match msg {
                    Ok(line) => {
                        let mut inner = inner.lock();
                        if let Err(e) = inner.write_entry(&line, format) {
                            log::error!("commit log write failed: {}", e);
                        }
                    }
                    Err(_) => return, // log dropped
                }
            }
            recv(ticker) -> _ => {
                let mut inner = inner.lock();
                if let Err(e) = inner.flush_and_sync() {
                    log::warn!("commit log periodic flush failed: {}", e);
                }
            }
        }
    }
}

impl Drop for CommitLog {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("commit log stop on drop failed: {}", e);
        }
    }
}
