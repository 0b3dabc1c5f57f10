// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AST nodes for the RDCL statement language

use serde::{Deserialize, Serialize};

/// Source position of an AST node (1-based line and column)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Top-level statement kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    CreateNode(CreateNodeStmt),
    CreateEdge(CreateEdgeStmt),
    AlterNode(AlterNodeStmt),
    AlterEdge(AlterEdgeStmt),
    DropNode(DropNodeStmt),
    DropEdge(DropEdgeStmt),
    InsertNode(InsertNodeStmt),
    InsertEdge(InsertEdgeStmt),
    UpdateNode(UpdateNodeStmt),
    UpdateEdge(UpdateEdgeStmt),
    DeleteNode(DeleteNodeStmt),
    DeleteEdge(DeleteEdgeStmt),
    Match(MatchStmt),
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::CreateNode(s) => s.location,
            Statement::CreateEdge(s) => s.location,
            Statement::AlterNode(s) => s.location,
            Statement::AlterEdge(s) => s.location,
            Statement::DropNode(s) => s.location,
            Statement::DropEdge(s) => s.location,
            Statement::InsertNode(s) => s.location,
            Statement::InsertEdge(s) => s.location,
            Statement::UpdateNode(s) => s.location,
            Statement::UpdateEdge(s) => s.location,
            Statement::DeleteNode(s) => s.location,
            Statement::DeleteEdge(s) => s.location,
            Statement::Match(s) => s.location,
        }
    }

    /// True for statements that only read state. Everything else drives the
    /// durability pipeline.
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Match(_))
    }

    /// True for statements that mutate the catalog rather than graph data.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            Statement::CreateNode(_)
                | Statement::CreateEdge(_)
                | Statement::AlterNode(_)
                | Statement::AlterEdge(_)
                | Statement::DropNode(_)
                | Statement::DropEdge(_)
        )
    }
}

/// Base type of a field's type spec.
///
/// `Array` carries its element in [`TypeSpec::elem`]; `Enum` carries its
/// value set in [`TypeSpec::enum_vals`].
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
    pub elem: Option<Box<TypeSpec>>,
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
    Bool,
    Null,
}

/// A literal value, carrying its original text (strings already unescaped)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeSpec,
    pub primary_key: bool,
    pub unique: bool,
    pub not_null: bool,
    pub default: Option<Literal>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    One,
    Many,
}

/// One side of an edge type: a node label plus a cardinality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub label: String,
    pub card: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNodeStmt {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEdgeStmt {
    pub name: String,
    pub from: Endpoint,
    pub to: Endpoint,
    pub props: Vec<FieldDef>,
    pub location: Location,
}

/// A single ALTER NODE action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeAlterAction {
    AddField(FieldDef),
    DropField(String),
    ModifyField(FieldDef),
    SetPrimaryKey(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterNodeStmt {
    pub name: String,
    pub actions: Vec<NodeAlterAction>,
    pub location: Location,
}

/// A single ALTER EDGE action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeAlterAction {
    AddProp(FieldDef),
    DropProp(String),
    ModifyProp(FieldDef),
    SetEndpoints { from: Endpoint, to: Endpoint },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterEdgeStmt {
    pub name: String,
    pub actions: Vec<EdgeAlterAction>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropNodeStmt {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEdgeStmt {
    pub name: String,
    pub location: Location,
}

/// `name: literal` pair used by property lists in DML statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Literal,
    pub location: Location,
}

/// Reference to a node by direct id or by property equality match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub node_type: String,
    pub id: Option<Literal>,
    pub properties: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertNodeStmt {
    pub node_type: String,
    pub properties: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertEdgeStmt {
    pub edge_type: String,
    pub from: NodeRef,
    pub to: NodeRef,
    pub properties: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNodeStmt {
    pub node_type: String,
    pub set: Vec<Property>,
    pub where_clause: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEdgeStmt {
    pub edge_type: String,
    pub set: Vec<Property>,
    pub where_clause: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNodeStmt {
    pub node_type: String,
    pub where_clause: Vec<Property>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEdgeStmt {
    pub edge_type: String,
    pub where_clause: Vec<Property>,
    pub location: Location,
}

/// One element of a MATCH pattern. Only node elements are executed; edge
/// elements are accepted by the grammar and ignored by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchElement {
    pub label: String,
    pub alias: Option<String>,
    pub is_edge: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStmt {
    pub pattern: Vec<MatchElement>,
    pub where_clause: Vec<Property>,
    pub return_fields: Vec<String>,
    pub location: Location,
}
