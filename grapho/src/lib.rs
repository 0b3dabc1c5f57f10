// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Grapho - an in-memory graph database with a durable commit log
//!
//! Grapho accepts the RDCL statement language over a line-oriented TCP
//! protocol, maintains a versioned catalog of node and edge types, and
//! records every mutating command in an append-only commit log so the
//! in-memory graph can be rebuilt after a restart.
//!
//! # Features
//!
//! - **RDCL parser**: recursive-descent parser with per-statement error
//!   recovery over a hand-written lexer
//! - **Versioned catalog**: copy-on-write schema snapshots with wait-free
//!   readers and serialized, durably-logged writers
//! - **Commit log**: single-writer background pipeline with text or
//!   length-prefixed binary framing and ordered replay
//! - **Executor**: dispatches DDL to the catalog registry and DML to the
//!   in-memory graph
//!
//! # Usage
//!
//! Grapho is primarily used as a standalone server via the CLI:
//!
//! ```bash
//! # Start the server
//! grapho serve --addr :8080 --data ./data --log-format binary
//!
//! # Connect interactively
//! grapho connect --addr localhost:8080
//! ```

pub mod ast;
pub mod catalog;
pub mod exec;
pub mod server;

pub use catalog::{Catalog, FileStore, Registry};
pub use exec::Executor;
pub use server::{CommitLog, LogFormat, Server};

/// Grapho version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
