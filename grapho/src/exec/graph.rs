// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory graph data: nodes and edges keyed by type
//!
//! Graph data lives only in memory; it is rebuilt on startup by replaying
//! the commit log. Property maps are ordered so scans and MATCH output are
//! deterministic.

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::{Literal, LiteralKind};

/// An evaluated property value.
///
/// String and number literals keep their text; booleans coerce; null is a
/// distinct marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Text(String),
    Bool(bool),
    Null,
}

impl PropValue {
    pub fn from_literal(lit: &Literal) -> Self {
        match lit.kind {
            LiteralKind::String | LiteralKind::Number => PropValue::Text(lit.text.clone()),
            LiteralKind::Bool => PropValue::Bool(lit.text == "true"),
            LiteralKind::Null => PropValue::Null,
        }
    }

    /// Interpret a schema-level raw default the same way literals are
    /// evaluated.
    pub fn from_default_raw(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("null") {
            PropValue::Null
        } else if raw == "true" {
            PropValue::Bool(true)
        } else if raw == "false" {
            PropValue::Bool(false)
        } else {
            PropValue::Text(raw.to_string())
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(s) => f.write_str(s),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Null => f.write_str("null"),
        }
    }
}

/// Ordered property map of one node or edge instance
pub type PropMap = BTreeMap<String, PropValue>;

/// Render a property map as `{k: v, ...}` with keys in order.
pub fn format_props(props: &PropMap) -> String {
    let mut out = String::from("{");
    for (i, (k, v)) in props.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(k);
        out.push_str(": ");
        out.push_str(&v.to_string());
    }
    out.push('}');
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInstance {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub properties: PropMap,
}

/// All live graph data, keyed by node/edge type name
#[derive(Debug, Default)]
pub struct GraphData {
    pub nodes: BTreeMap<String, BTreeMap<String, PropMap>>,
    pub edges: BTreeMap<String, Vec<EdgeInstance>>,
    pub next_id: u64,
}

impl GraphData {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next entity id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;

    fn lit(kind: LiteralKind, text: &str) -> Literal {
        Literal {
            kind,
            text: text.to_string(),
            location: Location::default(),
        }
    }

    #[test]
    fn literal_evaluation() {
        assert_eq!(
            PropValue::from_literal(&lit(LiteralKind::String, "Alice")),
            PropValue::Text("Alice".to_string())
        );
        assert_eq!(
            PropValue::from_literal(&lit(LiteralKind::Number, "30")),
            PropValue::Text("30".to_string())
        );
        assert_eq!(
            PropValue::from_literal(&lit(LiteralKind::Bool, "true")),
            PropValue::Bool(true)
        );
        assert_eq!(
            PropValue::from_literal(&lit(LiteralKind::Null, "null")),
            PropValue::Null
        );
    }

    #[test]
    fn default_raw_evaluation() {
        assert_eq!(PropValue::from_default_raw("NULL"), PropValue::Null);
        assert_eq!(PropValue::from_default_raw("true"), PropValue::Bool(true));
        assert_eq!(
            PropValue::from_default_raw("guest"),
            PropValue::Text("guest".to_string())
        );
    }

    #[test]
    fn props_format_deterministically() {
        let mut props = PropMap::new();
        props.insert("name".to_string(), PropValue::Text("Alice".to_string()));
        props.insert("_id".to_string(), PropValue::Text("1".to_string()));
        props.insert("ok".to_string(), PropValue::Bool(false));
        assert_eq!(format_props(&props), "{_id: 1, name: Alice, ok: false}");
    }

    #[test]
    fn id_allocation_is_sequential() {
        let mut g = GraphData::new();
        assert_eq!(g.allocate_id(), 1);
        assert_eq!(g.allocate_id(), 2);
        assert_eq!(g.next_id, 3);
    }
}
