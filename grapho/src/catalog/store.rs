// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog persistence: snapshot + append-only DDL log + manifest
//!
//! On-disk layout inside the data directory:
//!
//! - `catalog-ddl.jsonl` - append-only stream of DDL events, one JSON
//!   object per line, fsynced on every append
//! - `catalog-snap-NNNNNN.json` - pretty-printed catalog snapshot at
//!   version NNNNNN
//! - `CATALOG-MANIFEST.json` - names the current snapshot and the DDL-log
//!   line offset replay continues from; replaced via temp file + rename
//!
//! Loading reads the manifest (missing means a fresh install), the snapshot
//! if one is named, then replays DDL lines past the recorded offset. Replay
//! stops at the first malformed line or apply error and returns the catalog
//! built so far together with the number of lines read.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::ddl::{apply_event, DdlEvent};
use super::error::{CatalogError, CatalogResult};
use super::types::Catalog;

const DDL_LOG_FILE: &str = "catalog-ddl.jsonl";
const MANIFEST_FILE: &str = "CATALOG-MANIFEST.json";
const SNAPSHOT_PREFIX: &str = "catalog-snap-";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub snapshot: String,
    pub version: u64,
    pub ddl_offset: u64,
}

/// Persistence interface consumed by the registry.
///
/// Abstracting over the store keeps the registry testable against failing
/// or in-memory implementations.
pub trait CatalogStore: Send + Sync {
    /// Load the catalog and the DDL-log offset replay has reached.
    fn load(&self) -> CatalogResult<(Catalog, u64)>;

    /// Append one event, fsync, and return the new line count.
    fn append_ddl(&self, ev: &DdlEvent) -> CatalogResult<u64>;

    /// Write a full snapshot of `cat` and point the manifest at it.
    fn snapshot(&self, cat: &Catalog, ddl_offset: u64) -> CatalogResult<()>;

    fn update_manifest(&self, version: u64, ddl_offset: u64) -> CatalogResult<()>;
}

/// File-backed [`CatalogStore`] rooted at a data directory
pub struct FileStore {
    dir: PathBuf,
    // serializes writers; readers only run during load
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> CatalogResult<Self> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err(CatalogError::Io("empty data directory".to_string()));
        }
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn ddl_path(&self) -> PathBuf {
        self.dir.join(DDL_LOG_FILE)
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn snap_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn read_manifest(&self) -> CatalogResult<Manifest> {
        match fs::read(self.manifest_path()) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| CatalogError::BadManifest(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CatalogStore for FileStore {
    fn load(&self) -> CatalogResult<(Catalog, u64)> {
        let _guard = self.lock.lock();

        let manifest = self.read_manifest()?;

        let mut cat = if manifest.snapshot.is_empty() {
            Catalog::new_empty()
        } else {
            let bytes = fs::read(self.snap_path(&manifest.snapshot))
                .map_err(|e| CatalogError::Snapshot(e.to_string()))?;
            serde_json::from_slice(&bytes).map_err(|e| CatalogError::Snapshot(e.to_string()))?
        };

        // replay DDL lines past the manifest offset
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(self.ddl_path())?;
        let reader = BufReader::new(file);

        let mut pos: u64 = 0;
        for line in reader.lines() {
            let line = line?;
            pos += 1;
            if pos <= manifest.ddl_offset {
                continue; // already reflected in the snapshot
            }
            let ev: DdlEvent = match serde_json::from_str(&line) {
                Ok(ev) => ev,
                Err(e) => {
                    // stop at corruption, return the catalog built so far
                    log::warn!("catalog DDL log corrupted at line {}: {}", pos, e);
                    break;
                }
            };
            match apply_event(&cat, &ev) {
                Ok(next) => cat = next,
                Err(e) => {
                    log::warn!("catalog DDL replay stopped at line {}: {}", pos, e);
                    break;
                }
            }
        }

        Ok((cat, pos))
    }

    fn append_ddl(&self, ev: &DdlEvent) -> CatalogResult<u64> {
        let _guard = self.lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ddl_path())?;
        let mut line = serde_json::to_vec(ev)?;
        line.push(b'\n');
        file.write_all(&line)?;
        file.sync_all()?;

        count_lines(&self.ddl_path())
    }

    fn snapshot(&self, cat: &Catalog, ddl_offset: u64) -> CatalogResult<()> {
        {
            let _guard = self.lock.lock();
            let name = format!("{}{:06}.json", SNAPSHOT_PREFIX, cat.version);
            let bytes = serde_json::to_vec_pretty(cat)?;
            fs::write(self.snap_path(&name), bytes)?;
        }
        // bind the snapshot to the offset it covers
        self.update_manifest(cat.version, ddl_offset)
    }

    fn update_manifest(&self, version: u64, ddl_offset: u64) -> CatalogResult<()> {
        let _guard = self.lock.lock();

        // point at the latest snapshot on disk, if any
        let mut snapshot = String::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_file() && name.starts_with(SNAPSHOT_PREFIX) && name > snapshot
            {
                snapshot = name;
            }
        }

        let manifest = Manifest {
            snapshot,
            version,
            ddl_offset,
        };
        let bytes = serde_json::to_vec_pretty(&manifest)?;
        let tmp = self.manifest_path().with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.manifest_path())?;
        Ok(())
    }
}

fn count_lines(path: &Path) -> CatalogResult<u64> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut n = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(n);
        }
        n += 1;
    }
}
