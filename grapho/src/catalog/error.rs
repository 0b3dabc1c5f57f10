// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog subsystem

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    /// DDL validation failure; the catalog is left unchanged.
    #[error("{0}")]
    Validation(String),

    #[error("unsupported DDL op {0}")]
    UnsupportedOp(String),

    #[error("catalog io error: {0}")]
    Io(String),

    #[error("catalog serialization error: {0}")]
    Serialization(String),

    #[error("bad manifest: {0}")]
    BadManifest(String),

    #[error("read snapshot: {0}")]
    Snapshot(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
