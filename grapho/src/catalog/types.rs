// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed schema model: catalogs, node types, edge types, fields, indexes
//!
//! A published [`Catalog`] is immutable. DDL never mutates in place; the
//! apply functions in [`super::ddl`] clone the whole value and return a new
//! catalog with the version bumped. All types here are plain owned data so
//! `Clone` is a deep copy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    One,
    Many,
}

/// Base type of a field. `Array` carries its element type in
/// [`TypeSpec::elem`], `Enum` its closed value set in
/// [`TypeSpec::enum_vals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseType {
    String,
    Text,
    Int,
    Float,
    Bool,
    Uuid,
    Date,
    Time,
    DateTime,
    Json,
    Blob,
    Array,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub base: BaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<TypeSpec>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_vals: Vec<String>,
}

impl TypeSpec {
    pub fn scalar(base: BaseType) -> Self {
        Self {
            base,
            elem: None,
            enum_vals: Vec::new(),
        }
    }

    /// Scalar types are the only ones allowed as primary keys.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.base,
            BaseType::String
                | BaseType::Text
                | BaseType::Int
                | BaseType::Float
                | BaseType::Bool
                | BaseType::Uuid
                | BaseType::Date
                | BaseType::Time
                | BaseType::DateTime
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeSpec,
    pub unique: bool,
    pub not_null: bool,
    // Defaults are stored in raw string form; coercion happens in the DML layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub field: String,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,
    pub fields: HashMap<String, FieldSpec>,
    /// Primary-key field name; empty means the internal id only.
    pub pk: String,
    /// Index metadata by field name (runtime index handles live elsewhere).
    pub indexes: HashMap<String, IndexSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    pub label: String,
    pub card: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeType {
    pub name: String,
    pub from: EdgeEndpoint,
    pub to: EdgeEndpoint,
    pub props: HashMap<String, FieldSpec>,
}

/// A versioned, immutable schema snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u64,
    pub nodes: HashMap<String, NodeType>,
    pub edges: HashMap<String, EdgeType>,
}

impl Catalog {
    /// An initial empty catalog at version 0.
    pub fn new_empty() -> Self {
        Self {
            version: 0,
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut cat = Catalog::new_empty();
        let mut fields = HashMap::new();
        fields.insert(
            "id".to_string(),
            FieldSpec {
                name: "id".to_string(),
                ty: TypeSpec::scalar(BaseType::Uuid),
                unique: false,
                not_null: true,
                default_raw: Some("x".to_string()),
            },
        );
        let mut indexes = HashMap::new();
        indexes.insert(
            "id".to_string(),
            IndexSpec {
                field: "id".to_string(),
                unique: true,
            },
        );
        cat.nodes.insert(
            "Person".to_string(),
            NodeType {
                name: "Person".to_string(),
                fields,
                pk: "id".to_string(),
                indexes,
            },
        );
        cat.edges.insert(
            "KNOWS".to_string(),
            EdgeType {
                name: "KNOWS".to_string(),
                from: EdgeEndpoint {
                    label: "Person".to_string(),
                    card: Cardinality::Many,
                },
                to: EdgeEndpoint {
                    label: "Person".to_string(),
                    card: Cardinality::Many,
                },
                props: HashMap::new(),
            },
        );
        cat
    }

    #[test]
    fn clone_is_deep() {
        let original = sample_catalog();
        let mut copy = original.clone();

        let node = copy.nodes.get_mut("Person").unwrap();
        node.pk = "other".to_string();
        node.fields.get_mut("id").unwrap().default_raw = Some("y".to_string());
        copy.edges.get_mut("KNOWS").unwrap().from.label = "Company".to_string();
        copy.version = 42;

        assert_eq!(original.nodes["Person"].pk, "id");
        assert_eq!(
            original.nodes["Person"].fields["id"].default_raw.as_deref(),
            Some("x")
        );
        assert_eq!(original.edges["KNOWS"].from.label, "Person");
        assert_eq!(original.version, 0);
    }

    #[test]
    fn nested_type_specs_clone_deeply() {
        let ty = TypeSpec {
            base: BaseType::Array,
            elem: Some(Box::new(TypeSpec {
                base: BaseType::Enum,
                elem: None,
                enum_vals: vec!["a".to_string()],
            })),
            enum_vals: Vec::new(),
        };
        let mut copy = ty.clone();
        copy.elem.as_mut().unwrap().enum_vals.push("b".to_string());
        assert_eq!(ty.elem.as_ref().unwrap().enum_vals, vec!["a"]);
    }

    #[test]
    fn scalar_classification() {
        for base in [
            BaseType::String,
            BaseType::Text,
            BaseType::Int,
            BaseType::Float,
            BaseType::Bool,
            BaseType::Uuid,
            BaseType::Date,
            BaseType::Time,
            BaseType::DateTime,
        ] {
            assert!(TypeSpec::scalar(base).is_scalar(), "{:?}", base);
        }
        for base in [BaseType::Json, BaseType::Blob, BaseType::Array, BaseType::Enum] {
            assert!(!TypeSpec::scalar(base).is_scalar(), "{:?}", base);
        }
    }

    #[test]
    fn new_empty_has_version_zero() {
        let cat = Catalog::new_empty();
        assert_eq!(cat.version, 0);
        assert!(cat.nodes.is_empty());
        assert!(cat.edges.is_empty());
    }

    #[test]
    fn catalog_json_round_trip() {
        let cat = sample_catalog();
        let encoded = serde_json::to_string_pretty(&cat).unwrap();
        let decoded: Catalog = serde_json::from_str(&encoded).unwrap();
        assert_eq!(cat, decoded);
    }
}
