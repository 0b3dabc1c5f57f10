// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statement execution: DDL dispatch to the catalog registry, DML against
//! the in-memory graph

mod executor;
mod graph;

pub use executor::{ExecError, Executor};
pub use graph::{EdgeInstance, GraphData, PropMap, PropValue};
