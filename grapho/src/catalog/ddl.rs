// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! DDL events and pure apply functions
//!
//! Each `apply_*` function validates its payload against a catalog and, on
//! success, returns a deep-cloned catalog with the change applied and the
//! version bumped by one. Failure leaves the input catalog untouched, so a
//! registry can publish the result (or not) atomically.
//!
//! Events are what the DDL log persists: one JSON object per line with a
//! stable `"Op"` discriminator and the payload under `"Stmt"`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CatalogResult};
use super::types::{
    Catalog, EdgeEndpoint, EdgeType, FieldSpec, IndexSpec, NodeType, TypeSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DdlOp {
    CreateNode,
    CreateEdge,
    AlterNode,
    AlterEdge,
    DropNode,
    DropEdge,
}

impl std::fmt::Display for DdlOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            DdlOp::CreateNode => "CREATE_NODE",
            DdlOp::CreateEdge => "CREATE_EDGE",
            DdlOp::AlterNode => "ALTER_NODE",
            DdlOp::AlterEdge => "ALTER_EDGE",
            DdlOp::DropNode => "DROP_NODE",
            DdlOp::DropEdge => "DROP_EDGE",
        };
        f.write_str(tag)
    }
}

/// A persisted DDL event: `{"Op": <tag>, "Stmt": <payload>}`.
///
/// The payload is kept as a JSON value so events decoded from the DDL log
/// and events built from typed payloads go through the same path; payloads
/// are normalized via a serde round-trip on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdlEvent {
    #[serde(rename = "Op")]
    pub op: DdlOp,
    #[serde(rename = "Stmt")]
    pub stmt: serde_json::Value,
}

impl DdlEvent {
    pub fn new<T: Serialize>(op: DdlOp, payload: &T) -> CatalogResult<Self> {
        Ok(Self {
            op,
            stmt: serde_json::to_value(payload)?,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> CatalogResult<T> {
        Ok(serde_json::from_value(self.stmt.clone())?)
    }
}

/* -------------------- payloads -------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPayload {
    pub name: String,
    pub ty: TypeSpec,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub default_raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNodePayload {
    pub name: String,
    pub fields: Vec<FieldPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEdgePayload {
    pub name: String,
    pub from: EdgeEndpoint,
    pub to: EdgeEndpoint,
    #[serde(default)]
    pub props: Vec<FieldPayload>,
}

/// ALTER NODE actions, tagged the way the DDL log spells them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum NodeAlterAction {
    #[serde(rename = "ADD_FIELD")]
    AddField { field: FieldPayload },
    #[serde(rename = "DROP_FIELD")]
    DropField { field_name: String },
    #[serde(rename = "MODIFY_FIELD")]
    ModifyField { field: FieldPayload },
    #[serde(rename = "SET_PRIMARY_KEY")]
    SetPrimaryKey { field_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterNodePayload {
    pub name: String,
    pub actions: Vec<NodeAlterAction>,
}

/// Which side of an edge a CHANGE_ENDPOINT action replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointSide {
    #[serde(rename = "FROM")]
    From,
    #[serde(rename = "TO")]
    To,
}

impl std::fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EndpointSide::From => "FROM",
            EndpointSide::To => "TO",
        })
    }
}

/// ALTER EDGE actions, tagged the way the DDL log spells them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum EdgeAlterAction {
    #[serde(rename = "ADD_PROP")]
    AddProp { prop: FieldPayload },
    #[serde(rename = "DROP_PROP")]
    DropProp { prop_name: String },
    #[serde(rename = "MODIFY_PROP")]
    ModifyProp { prop: FieldPayload },
    #[serde(rename = "CHANGE_ENDPOINT")]
    ChangeEndpoint {
        endpoint: EndpointSide,
        new_endpoint: EdgeEndpoint,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterEdgePayload {
    pub name: String,
    pub actions: Vec<EdgeAlterAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropNodePayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEdgePayload {
    pub name: String,
}

fn validation(msg: String) -> CatalogError {
    CatalogError::Validation(msg)
}

impl FieldPayload {
    fn to_spec(&self) -> FieldSpec {
        FieldSpec {
            name: self.name.clone(),
            ty: self.ty.clone(),
            unique: self.unique,
            not_null: self.not_null,
            default_raw: self.default_raw.clone(),
        }
    }

    /// A NOT NULL field may not default to the literal `null`
    /// (case-insensitive), and enum fields need at least one value.
    fn check_constraints(&self, noun: &str) -> CatalogResult<()> {
        if self.name.is_empty() {
            return Err(validation(format!("{} name required", noun)));
        }
        if self.not_null
            && self
                .default_raw
                .as_deref()
                .map_or(false, |d| d.eq_ignore_ascii_case("null"))
        {
            return Err(validation(format!(
                "{} {:?} NOT NULL but default null",
                noun, self.name
            )));
        }
        if self.ty.base == super::types::BaseType::Enum && self.ty.enum_vals.is_empty() {
            return Err(validation(format!(
                "enum {} {:?} must have values",
                noun, self.name
            )));
        }
        Ok(())
    }
}

/* -------------------- CREATE NODE -------------------- */

/// Returns a new catalog (copy-on-write) with the node type added.
pub fn apply_create_node(cat: &Catalog, p: &CreateNodePayload) -> CatalogResult<Catalog> {
    validate_create_node(cat, p)?;

    let mut out = cat.clone();
    let mut nt = NodeType {
        name: p.name.clone(),
        fields: Default::default(),
        pk: String::new(),
        indexes: Default::default(),
    };
    for f in &p.fields {
        nt.fields.insert(f.name.clone(), f.to_spec());
        if f.primary_key {
            nt.pk = f.name.clone();
            nt.indexes.insert(
                f.name.clone(),
                IndexSpec {
                    field: f.name.clone(),
                    unique: true,
                },
            );
        } else if f.unique {
            nt.indexes.insert(
                f.name.clone(),
                IndexSpec {
                    field: f.name.clone(),
                    unique: true,
                },
            );
        }
    }
    out.nodes.insert(p.name.clone(), nt);
    out.version += 1;
    Ok(out)
}

fn validate_create_node(cat: &Catalog, p: &CreateNodePayload) -> CatalogResult<()> {
    if p.name.is_empty() {
        return Err(validation("node name required".to_string()));
    }
    if cat.nodes.contains_key(&p.name) {
        return Err(validation(format!("node {:?} already exists", p.name)));
    }
    if p.fields.is_empty() {
        return Err(validation(
            "node must define at least one field".to_string(),
        ));
    }
    let mut pk_count = 0;
    let mut seen = std::collections::HashSet::new();
    for f in &p.fields {
        if f.name.is_empty() {
            return Err(validation("field with empty name".to_string()));
        }
        if !seen.insert(f.name.as_str()) {
            return Err(validation(format!("duplicate field {:?}", f.name)));
        }
        if f.primary_key {
            pk_count += 1;
            if !f.ty.is_scalar() {
                return Err(validation(format!(
                    "primary key {:?} must be scalar",
                    f.name
                )));
            }
        }
        f.check_constraints("field")?;
    }
    if pk_count > 1 {
        return Err(validation("multiple PRIMARY KEY fields".to_string()));
    }
    Ok(())
}

/* -------------------- CREATE EDGE -------------------- */

pub fn apply_create_edge(cat: &Catalog, p: &CreateEdgePayload) -> CatalogResult<Catalog> {
    validate_create_edge(cat, p)?;

    let mut out = cat.clone();
    let mut et = EdgeType {
        name: p.name.clone(),
        from: p.from.clone(),
        to: p.to.clone(),
        props: Default::default(),
    };
    for f in &p.props {
        et.props.insert(f.name.clone(), f.to_spec());
    }
    out.edges.insert(p.name.clone(), et);
    out.version += 1;
    Ok(out)
}

fn validate_create_edge(cat: &Catalog, p: &CreateEdgePayload) -> CatalogResult<()> {
    if p.name.is_empty() {
        return Err(validation("edge name required".to_string()));
    }
    if cat.edges.contains_key(&p.name) {
        return Err(validation(format!("edge {:?} already exists", p.name)));
    }
    // endpoints must resolve to existing node types
    if !cat.nodes.contains_key(&p.from.label) {
        return Err(validation(format!(
            "FROM node type {:?} not found",
            p.from.label
        )));
    }
    if !cat.nodes.contains_key(&p.to.label) {
        return Err(validation(format!(
            "TO node type {:?} not found",
            p.to.label
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for f in &p.props {
        if f.name.is_empty() {
            return Err(validation("edge prop with empty name".to_string()));
        }
        if !seen.insert(f.name.as_str()) {
            return Err(validation(format!("duplicate edge prop {:?}", f.name)));
        }
        f.check_constraints("prop")?;
    }
    Ok(())
}

/* -------------------- ALTER NODE -------------------- */

/// Returns a new catalog with the node type modified. Actions are applied
/// in order against the running copy, so a later action sees the effect of
/// an earlier one.
pub fn apply_alter_node(cat: &Catalog, p: &AlterNodePayload) -> CatalogResult<Catalog> {
    validate_alter_node(cat, p)?;

    let mut out = cat.clone();
    let nt = out
        .nodes
        .get_mut(&p.name)
        .expect("validated to exist");

    for action in &p.actions {
        match action {
            NodeAlterAction::AddField { field } => {
                if nt.fields.contains_key(&field.name) {
                    return Err(validation(format!(
                        "field {:?} already exists",
                        field.name
                    )));
                }
                nt.fields.insert(field.name.clone(), field.to_spec());
                if field.primary_key {
                    if !nt.pk.is_empty() {
                        return Err(validation(
                            "node already has a primary key".to_string(),
                        ));
                    }
                    nt.pk = field.name.clone();
                    nt.indexes.insert(
                        field.name.clone(),
                        IndexSpec {
                            field: field.name.clone(),
                            unique: true,
                        },
                    );
                } else if field.unique {
                    nt.indexes.insert(
                        field.name.clone(),
                        IndexSpec {
                            field: field.name.clone(),
                            unique: true,
                        },
                    );
                }
            }

            NodeAlterAction::DropField { field_name } => {
                if !nt.fields.contains_key(field_name) {
                    return Err(validation(format!(
                        "field {:?} does not exist",
                        field_name
                    )));
                }
                if nt.pk == *field_name {
                    return Err(validation(format!(
                        "cannot drop primary key field {:?}",
                        field_name
                    )));
                }
                nt.fields.remove(field_name);
                nt.indexes.remove(field_name);
            }

            NodeAlterAction::ModifyField { field } => {
                if !nt.fields.contains_key(&field.name) {
                    return Err(validation(format!(
                        "field {:?} does not exist",
                        field.name
                    )));
                }
                let is_pk = nt.pk == field.name;
                if is_pk && field.primary_key {
                    // the field stays the primary key, so it must stay scalar
                    if !field.ty.is_scalar() {
                        return Err(validation(format!(
                            "primary key {:?} must be scalar",
                            field.name
                        )));
                    }
                } else if is_pk && !field.primary_key {
                    return Err(validation(format!(
                        "cannot remove primary key from field {:?}",
                        field.name
                    )));
                } else if !is_pk && field.primary_key {
                    return Err(validation(format!(
                        "cannot set primary key on field {:?} when {:?} is already primary key",
                        field.name, nt.pk
                    )));
                }

                nt.fields.insert(field.name.clone(), field.to_spec());
                if field.unique || field.primary_key {
                    nt.indexes.insert(
                        field.name.clone(),
                        IndexSpec {
                            field: field.name.clone(),
                            unique: true,
                        },
                    );
                } else {
                    nt.indexes.remove(&field.name);
                }
            }

            NodeAlterAction::SetPrimaryKey { field_name } => {
                let field = match nt.fields.get(field_name) {
                    Some(f) => f,
                    None => {
                        return Err(validation(format!(
                            "field {:?} does not exist",
                            field_name
                        )));
                    }
                };
                if !field.ty.is_scalar() {
                    return Err(validation(format!(
                        "primary key {:?} must be scalar",
                        field_name
                    )));
                }

                // the old PK index goes away unless the field is unique on its own
                if !nt.pk.is_empty() {
                    let keep = nt.fields.get(&nt.pk).map_or(false, |old| old.unique);
                    if !keep {
                        let old_pk = nt.pk.clone();
                        nt.indexes.remove(&old_pk);
                    }
                }

                nt.pk = field_name.clone();
                nt.indexes.insert(
                    field_name.clone(),
                    IndexSpec {
                        field: field_name.clone(),
                        unique: true,
                    },
                );
            }
        }
    }

    out.version += 1;
    Ok(out)
}

fn validate_alter_node(cat: &Catalog, p: &AlterNodePayload) -> CatalogResult<()> {
    if p.name.is_empty() {
        return Err(validation("node name required".to_string()));
    }
    if !cat.nodes.contains_key(&p.name) {
        return Err(validation(format!("node {:?} does not exist", p.name)));
    }
    if p.actions.is_empty() {
        return Err(validation("at least one action required".to_string()));
    }

    for action in &p.actions {
        match action {
            NodeAlterAction::AddField { field } | NodeAlterAction::ModifyField { field } => {
                field.check_constraints("field")?;
                if field.primary_key && !field.ty.is_scalar() {
                    return Err(validation(format!(
                        "primary key {:?} must be scalar",
                        field.name
                    )));
                }
            }
            NodeAlterAction::DropField { field_name }
            | NodeAlterAction::SetPrimaryKey { field_name } => {
                if field_name.is_empty() {
                    return Err(validation("field name required".to_string()));
                }
            }
        }
    }
    Ok(())
}

/* -------------------- ALTER EDGE -------------------- */

pub fn apply_alter_edge(cat: &Catalog, p: &AlterEdgePayload) -> CatalogResult<Catalog> {
    validate_alter_edge(cat, p)?;

    let mut out = cat.clone();
    let et = out
        .edges
        .get_mut(&p.name)
        .expect("validated to exist");

    for action in &p.actions {
        match action {
            EdgeAlterAction::AddProp { prop } => {
                if et.props.contains_key(&prop.name) {
                    return Err(validation(format!("prop {:?} already exists", prop.name)));
                }
                et.props.insert(prop.name.clone(), prop.to_spec());
            }
            EdgeAlterAction::DropProp { prop_name } => {
                if !et.props.contains_key(prop_name) {
                    return Err(validation(format!(
                        "prop {:?} does not exist",
                        prop_name
                    )));
                }
                et.props.remove(prop_name);
            }
            EdgeAlterAction::ModifyProp { prop } => {
                if !et.props.contains_key(&prop.name) {
                    return Err(validation(format!(
                        "prop {:?} does not exist",
                        prop.name
                    )));
                }
                et.props.insert(prop.name.clone(), prop.to_spec());
            }
            EdgeAlterAction::ChangeEndpoint {
                endpoint,
                new_endpoint,
            } => {
                if !cat.nodes.contains_key(&new_endpoint.label) {
                    return Err(validation(format!(
                        "{} node type {:?} not found",
                        endpoint, new_endpoint.label
                    )));
                }
                match endpoint {
                    EndpointSide::From => et.from = new_endpoint.clone(),
                    EndpointSide::To => et.to = new_endpoint.clone(),
                }
            }
        }
    }

    out.version += 1;
    Ok(out)
}

fn validate_alter_edge(cat: &Catalog, p: &AlterEdgePayload) -> CatalogResult<()> {
    if p.name.is_empty() {
        return Err(validation("edge name required".to_string()));
    }
    if !cat.edges.contains_key(&p.name) {
        return Err(validation(format!("edge {:?} does not exist", p.name)));
    }
    if p.actions.is_empty() {
        return Err(validation("at least one action required".to_string()));
    }

    for action in &p.actions {
        match action {
            EdgeAlterAction::AddProp { prop } | EdgeAlterAction::ModifyProp { prop } => {
                prop.check_constraints("prop")?;
            }
            EdgeAlterAction::DropProp { prop_name } => {
                if prop_name.is_empty() {
                    return Err(validation("prop name required".to_string()));
                }
            }
            EdgeAlterAction::ChangeEndpoint { new_endpoint, .. } => {
                if new_endpoint.label.is_empty() {
                    return Err(validation("endpoint label required".to_string()));
                }
                if !cat.nodes.contains_key(&new_endpoint.label) {
                    return Err(validation(format!(
                        "endpoint node type {:?} not found",
                        new_endpoint.label
                    )));
                }
            }
        }
    }
    Ok(())
}

/* -------------------- DROP NODE -------------------- */

/// Returns a new catalog with the node type removed. A node type that is
/// still referenced by any edge endpoint cannot be dropped.
pub fn apply_drop_node(cat: &Catalog, p: &DropNodePayload) -> CatalogResult<Catalog> {
    if p.name.is_empty() {
        return Err(validation("node name required".to_string()));
    }
    if !cat.nodes.contains_key(&p.name) {
        return Err(validation(format!("node {:?} does not exist", p.name)));
    }
    for (edge_name, edge) in &cat.edges {
        if edge.from.label == p.name || edge.to.label == p.name {
            return Err(validation(format!(
                "cannot drop node {:?}: referenced by edge {:?}",
                p.name, edge_name
            )));
        }
    }

    let mut out = cat.clone();
    out.nodes.remove(&p.name);
    out.version += 1;
    Ok(out)
}

/* -------------------- DROP EDGE -------------------- */

pub fn apply_drop_edge(cat: &Catalog, p: &DropEdgePayload) -> CatalogResult<Catalog> {
    if p.name.is_empty() {
        return Err(validation("edge name required".to_string()));
    }
    if !cat.edges.contains_key(&p.name) {
        return Err(validation(format!("edge {:?} does not exist", p.name)));
    }

    let mut out = cat.clone();
    out.edges.remove(&p.name);
    out.version += 1;
    Ok(out)
}

/* -------------------- event dispatch -------------------- */

/// Route an event to its apply function. Used by both the registry (live
/// DDL) and the store (log replay).
pub fn apply_event(cat: &Catalog, ev: &DdlEvent) -> CatalogResult<Catalog> {
    match ev.op {
        DdlOp::CreateNode => apply_create_node(cat, &ev.decode()?),
        DdlOp::CreateEdge => apply_create_edge(cat, &ev.decode()?),
        DdlOp::AlterNode => apply_alter_node(cat, &ev.decode()?),
        DdlOp::AlterEdge => apply_alter_edge(cat, &ev.decode()?),
        DdlOp::DropNode => apply_drop_node(cat, &ev.decode()?),
        DdlOp::DropEdge => apply_drop_edge(cat, &ev.decode()?),
    }
}
