// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog registry: wait-free readers, serialized durable writers
//!
//! The registry publishes the current [`Catalog`] through an atomic pointer
//! swap. `current()` is a single atomic load and never blocks; any number
//! of readers may keep holding older snapshots, which stay alive for as
//! long as their `Arc` does. All DDL goes through `apply`, which holds the
//! writer lock across: compute new catalog -> append to the DDL log
//! (fsync) -> publish -> refresh the manifest.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::ddl::{apply_event, DdlEvent};
use super::error::CatalogResult;
use super::store::CatalogStore;
use super::types::Catalog;

pub struct Registry {
    store: Box<dyn CatalogStore>,
    /// Immutable snapshot for readers
    current: ArcSwap<Catalog>,
    /// Serializes writers; guards the DDL-log offset
    write_lock: Mutex<u64>,
}

impl Registry {
    /// Initialize the registry by loading the snapshot and replaying the
    /// DDL log from the store.
    pub fn open(store: Box<dyn CatalogStore>) -> CatalogResult<Self> {
        let (cat, ddl_offset) = store.load()?;
        log::info!(
            "catalog loaded at version {} (ddl offset {})",
            cat.version,
            ddl_offset
        );
        Ok(Self {
            store,
            current: ArcSwap::from_pointee(cat),
            write_lock: Mutex::new(ddl_offset),
        })
    }

    /// The currently published catalog. Wait-free.
    pub fn current(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Validate, persist, and publish one DDL event.
    ///
    /// On success the returned catalog is the newly published snapshot. On
    /// any validation or persistence error nothing is published and the
    /// previous snapshot stays current. A manifest refresh failure does not
    /// fail the apply: the event is already durable in the DDL log, and
    /// loading re-derives everything past a stale manifest offset.
    pub fn apply(&self, ev: DdlEvent) -> CatalogResult<Arc<Catalog>> {
        let mut offset = self.write_lock.lock();

        let old = self.current.load_full();
        let new_cat = apply_event(&old, &ev)?;

        // persist before publication
        let new_offset = self.store.append_ddl(&ev)?;

        let published = Arc::new(new_cat);
        self.current.store(published.clone());
        *offset = new_offset;
        log::debug!(
            "applied {} -> catalog version {} (ddl offset {})",
            ev.op,
            published.version,
            new_offset
        );

        if let Err(e) = self.store.update_manifest(published.version, new_offset) {
            log::warn!("manifest update failed after {}: {}", ev.op, e);
        }
        Ok(published)
    }

    /// Write a full snapshot of the current catalog and point the manifest
    /// at it.
    pub fn snapshot(&self) -> CatalogResult<()> {
        let offset = self.write_lock.lock();
        let cat = self.current.load_full();
        self.store.snapshot(&cat, *offset)
    }
}
