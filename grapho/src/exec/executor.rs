// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statement executor
//!
//! Dispatches parsed statements: DDL becomes catalog registry events, DML
//! mutates the in-memory graph, MATCH reads it. Output lines go to the
//! writer handle the caller provides; replay passes a sink so reconstruction
//! stays silent.

use std::io::Write;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::{self, Statement};
use crate::catalog::ddl::{
    AlterEdgePayload, AlterNodePayload, CreateEdgePayload, CreateNodePayload, DdlEvent, DdlOp,
    DropEdgePayload, DropNodePayload, EdgeAlterAction, EndpointSide, FieldPayload,
    NodeAlterAction,
};
use crate::catalog::types as cat;
use crate::catalog::{CatalogError, Registry};

use super::graph::{format_props, EdgeInstance, GraphData, PropMap, PropValue};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("node type '{0}' does not exist")]
    UnknownNodeType(String),

    #[error("edge type '{0}' does not exist")]
    UnknownEdgeType(String),

    #[error("FROM node not found: {0}")]
    FromNodeNotFound(String),

    #[error("TO node not found: {0}")]
    ToNodeNotFound(String),

    #[error("FROM node type '{0}' does not match edge FROM type '{1}'")]
    FromTypeMismatch(String, String),

    #[error("TO node type '{0}' does not match edge TO type '{1}'")]
    ToTypeMismatch(String, String),

    #[error("required field '{0}' is missing")]
    MissingRequiredField(String),

    #[error("no nodes of type '{0}' found")]
    NoNodesOfType(String),

    #[error("node with ID '{0}' not found")]
    NodeIdNotFound(String),

    #[error("no matching node found")]
    NoMatchingNode,

    #[error("composite primary keys are not supported")]
    CompositePrimaryKey,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type ExecResult<T> = Result<T, ExecError>;

/// Executes statements against a catalog registry and the in-memory graph.
///
/// The executor is single-writer: callers serialize access to it (the
/// server wraps it in a mutex).
pub struct Executor {
    registry: Arc<Registry>,
    graph: GraphData,
}

impl Executor {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            graph: GraphData::new(),
        }
    }

    /// Read access to the live graph data (used by tests and diagnostics).
    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    /// Run a batch of statements in order, short-circuiting on the first
    /// error. Returns whether any executed statement mutated state; errors
    /// abort the batch but earlier statements are not rolled back.
    pub fn execute_statements(
        &mut self,
        out: &mut dyn Write,
        stmts: &[Statement],
    ) -> ExecResult<bool> {
        let mut mutated = false;
        for (i, stmt) in stmts.iter().enumerate() {
            if let Err(err) = self.execute_statement(out, stmt) {
                let _ = writeln!(out, "Error executing statement {}: {}", i + 1, err);
                return Err(err);
            }
            if !stmt.is_query() {
                mutated = true;
            }
        }
        let _ = writeln!(
            out,
            "OK - {} statement(s) executed successfully\n",
            stmts.len()
        );
        Ok(mutated)
    }

    /// Execute a single statement.
    pub fn execute_statement(&mut self, out: &mut dyn Write, stmt: &Statement) -> ExecResult<()> {
        match stmt {
            Statement::CreateNode(s) => self.execute_create_node(s),
            Statement::CreateEdge(s) => self.execute_create_edge(s),
            Statement::AlterNode(s) => self.execute_alter_node(s),
            Statement::AlterEdge(s) => self.execute_alter_edge(s),
            Statement::DropNode(s) => self.execute_drop_node(s),
            Statement::DropEdge(s) => self.execute_drop_edge(s),
            Statement::InsertNode(s) => self.execute_insert_node(out, s),
            Statement::InsertEdge(s) => self.execute_insert_edge(out, s),
            Statement::UpdateNode(s) => self.execute_update_node(out, s),
            Statement::UpdateEdge(s) => self.execute_update_edge(out, s),
            Statement::DeleteNode(s) => self.execute_delete_node(out, s),
            Statement::DeleteEdge(s) => self.execute_delete_edge(out, s),
            Statement::Match(s) => self.execute_match(out, s),
        }
    }

    /* ---------------------- DDL ---------------------- */

    fn execute_create_node(&mut self, stmt: &ast::CreateNodeStmt) -> ExecResult<()> {
        let payload = CreateNodePayload {
            name: stmt.name.clone(),
            fields: stmt.fields.iter().map(convert_field).collect(),
        };
        let ev = DdlEvent::new(DdlOp::CreateNode, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    fn execute_create_edge(&mut self, stmt: &ast::CreateEdgeStmt) -> ExecResult<()> {
        let payload = CreateEdgePayload {
            name: stmt.name.clone(),
            from: convert_endpoint(&stmt.from),
            to: convert_endpoint(&stmt.to),
            props: stmt.props.iter().map(convert_field).collect(),
        };
        let ev = DdlEvent::new(DdlOp::CreateEdge, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    fn execute_alter_node(&mut self, stmt: &ast::AlterNodeStmt) -> ExecResult<()> {
        let mut actions = Vec::with_capacity(stmt.actions.len());
        for action in &stmt.actions {
            actions.push(match action {
                ast::NodeAlterAction::AddField(field) => NodeAlterAction::AddField {
                    field: convert_field(field),
                },
                ast::NodeAlterAction::DropField(name) => NodeAlterAction::DropField {
                    field_name: name.clone(),
                },
                ast::NodeAlterAction::ModifyField(field) => NodeAlterAction::ModifyField {
                    field: convert_field(field),
                },
                ast::NodeAlterAction::SetPrimaryKey(fields) => {
                    // single-field primary keys only
                    if fields.len() != 1 {
                        return Err(ExecError::CompositePrimaryKey);
                    }
                    NodeAlterAction::SetPrimaryKey {
                        field_name: fields[0].clone(),
                    }
                }
            });
        }
        let payload = AlterNodePayload {
            name: stmt.name.clone(),
            actions,
        };
        let ev = DdlEvent::new(DdlOp::AlterNode, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    fn execute_alter_edge(&mut self, stmt: &ast::AlterEdgeStmt) -> ExecResult<()> {
        let mut actions = Vec::new();
        for action in &stmt.actions {
            match action {
                ast::EdgeAlterAction::AddProp(prop) => actions.push(EdgeAlterAction::AddProp {
                    prop: convert_field(prop),
                }),
                ast::EdgeAlterAction::DropProp(name) => {
                    actions.push(EdgeAlterAction::DropProp {
                        prop_name: name.clone(),
                    })
                }
                ast::EdgeAlterAction::ModifyProp(prop) => {
                    actions.push(EdgeAlterAction::ModifyProp {
                        prop: convert_field(prop),
                    })
                }
                // SET FROM ... TO ... replaces both endpoints
                ast::EdgeAlterAction::SetEndpoints { from, to } => {
                    actions.push(EdgeAlterAction::ChangeEndpoint {
                        endpoint: EndpointSide::From,
                        new_endpoint: convert_endpoint(from),
                    });
                    actions.push(EdgeAlterAction::ChangeEndpoint {
                        endpoint: EndpointSide::To,
                        new_endpoint: convert_endpoint(to),
                    });
                }
            }
        }
        let payload = AlterEdgePayload {
            name: stmt.name.clone(),
            actions,
        };
        let ev = DdlEvent::new(DdlOp::AlterEdge, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    fn execute_drop_node(&mut self, stmt: &ast::DropNodeStmt) -> ExecResult<()> {
        let payload = DropNodePayload {
            name: stmt.name.clone(),
        };
        let ev = DdlEvent::new(DdlOp::DropNode, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    fn execute_drop_edge(&mut self, stmt: &ast::DropEdgeStmt) -> ExecResult<()> {
        let payload = DropEdgePayload {
            name: stmt.name.clone(),
        };
        let ev = DdlEvent::new(DdlOp::DropEdge, &payload)?;
        self.registry.apply(ev)?;
        Ok(())
    }

    /* ---------------------- DML ---------------------- */

    fn execute_insert_node(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::InsertNodeStmt,
    ) -> ExecResult<()> {
        let catalog = self.registry.current();
        let node_type = catalog
            .nodes
            .get(&stmt.node_type)
            .ok_or_else(|| ExecError::UnknownNodeType(stmt.node_type.clone()))?;

        let mut properties = eval_properties(&stmt.properties);
        apply_defaults(&mut properties, node_type.fields.values());

        // required fields must be present after defaulting
        for (field_name, field_spec) in &node_type.fields {
            if field_spec.not_null && !properties.contains_key(field_name) {
                return Err(ExecError::MissingRequiredField(field_name.clone()));
            }
        }

        let node_id = self.graph.allocate_id().to_string();
        properties.insert("_id".to_string(), PropValue::Text(node_id.clone()));
        self.graph
            .nodes
            .entry(stmt.node_type.clone())
            .or_default()
            .insert(node_id.clone(), properties);

        let _ = writeln!(out, "Node inserted with ID: {}", node_id);
        Ok(())
    }

    fn execute_insert_edge(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::InsertEdgeStmt,
    ) -> ExecResult<()> {
        let catalog = self.registry.current();
        let edge_type = catalog
            .edges
            .get(&stmt.edge_type)
            .ok_or_else(|| ExecError::UnknownEdgeType(stmt.edge_type.clone()))?;

        let from_node_id = self
            .find_node_id(&stmt.from)
            .map_err(|e| ExecError::FromNodeNotFound(e.to_string()))?;
        let to_node_id = self
            .find_node_id(&stmt.to)
            .map_err(|e| ExecError::ToNodeNotFound(e.to_string()))?;

        // declared endpoint labels bind the reference types
        if stmt.from.node_type != edge_type.from.label {
            return Err(ExecError::FromTypeMismatch(
                stmt.from.node_type.clone(),
                edge_type.from.label.clone(),
            ));
        }
        if stmt.to.node_type != edge_type.to.label {
            return Err(ExecError::ToTypeMismatch(
                stmt.to.node_type.clone(),
                edge_type.to.label.clone(),
            ));
        }

        let mut properties = eval_properties(&stmt.properties);
        apply_defaults(&mut properties, edge_type.props.values());
        for (prop_name, prop_spec) in &edge_type.props {
            if prop_spec.not_null && !properties.contains_key(prop_name) {
                return Err(ExecError::MissingRequiredField(prop_name.clone()));
            }
        }

        let edge_id = format!("edge_{}", self.graph.allocate_id());
        self.graph
            .edges
            .entry(stmt.edge_type.clone())
            .or_default()
            .push(EdgeInstance {
                id: edge_id.clone(),
                from_node_id,
                to_node_id,
                properties,
            });

        let _ = writeln!(out, "Edge inserted with ID: {}", edge_id);
        Ok(())
    }

    fn execute_update_node(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::UpdateNodeStmt,
    ) -> ExecResult<()> {
        let nodes = self
            .graph
            .nodes
            .get_mut(&stmt.node_type)
            .ok_or_else(|| ExecError::NoNodesOfType(stmt.node_type.clone()))?;

        let mut updated = 0;
        for props in nodes.values_mut() {
            if matches_conditions(props, &stmt.where_clause) {
                for set_prop in &stmt.set {
                    props.insert(
                        set_prop.name.clone(),
                        PropValue::from_literal(&set_prop.value),
                    );
                }
                updated += 1;
            }
        }
        let _ = writeln!(out, "Updated {} node(s)", updated);
        Ok(())
    }

    fn execute_update_edge(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::UpdateEdgeStmt,
    ) -> ExecResult<()> {
        let mut updated = 0;
        if let Some(edges) = self.graph.edges.get_mut(&stmt.edge_type) {
            for edge in edges.iter_mut() {
                if matches_conditions(&edge.properties, &stmt.where_clause) {
                    for set_prop in &stmt.set {
                        edge.properties.insert(
                            set_prop.name.clone(),
                            PropValue::from_literal(&set_prop.value),
                        );
                    }
                    updated += 1;
                }
            }
        }
        let _ = writeln!(out, "Updated {} edge(s)", updated);
        Ok(())
    }

    fn execute_delete_node(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::DeleteNodeStmt,
    ) -> ExecResult<()> {
        let nodes = self
            .graph
            .nodes
            .get_mut(&stmt.node_type)
            .ok_or_else(|| ExecError::NoNodesOfType(stmt.node_type.clone()))?;

        let before = nodes.len();
        nodes.retain(|_, props| !matches_conditions(props, &stmt.where_clause));
        let _ = writeln!(out, "Deleted {} node(s)", before - nodes.len());
        Ok(())
    }

    fn execute_delete_edge(
        &mut self,
        out: &mut dyn Write,
        stmt: &ast::DeleteEdgeStmt,
    ) -> ExecResult<()> {
        let mut deleted = 0;
        if let Some(edges) = self.graph.edges.get_mut(&stmt.edge_type) {
            let before = edges.len();
            edges.retain(|edge| !matches_conditions(&edge.properties, &stmt.where_clause));
            deleted = before - edges.len();
        }
        let _ = writeln!(out, "Deleted {} edge(s)", deleted);
        Ok(())
    }

    /// Only node pattern elements are executed; edge elements and RETURN
    /// projections are accepted by the grammar but not evaluated here.
    fn execute_match(&mut self, out: &mut dyn Write, stmt: &ast::MatchStmt) -> ExecResult<()> {
        let _ = writeln!(out, "MATCH Results:");
        for element in &stmt.pattern {
            if element.is_edge {
                continue;
            }
            if let Some(nodes) = self.graph.nodes.get(&element.label) {
                let _ = writeln!(out, "\nNodes of type '{}':", element.label);
                for (node_id, props) in nodes {
                    if matches_conditions(props, &stmt.where_clause) {
                        let _ = writeln!(
                            out,
                            "  ID: {}, Properties: {}",
                            node_id,
                            format_props(props)
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /* ---------------------- helpers ---------------------- */

    /// Resolve a node reference to a node id: a direct id if one is given,
    /// otherwise the first node whose properties satisfy every equality.
    fn find_node_id(&self, node_ref: &ast::NodeRef) -> ExecResult<String> {
        let nodes = self
            .graph
            .nodes
            .get(&node_ref.node_type)
            .ok_or_else(|| ExecError::NoNodesOfType(node_ref.node_type.clone()))?;

        if let Some(id_lit) = &node_ref.id {
            let node_id = &id_lit.text;
            if nodes.contains_key(node_id) {
                return Ok(node_id.clone());
            }
            return Err(ExecError::NodeIdNotFound(node_id.clone()));
        }

        for (node_id, props) in nodes {
            if matches_conditions(props, &node_ref.properties) {
                return Ok(node_id.clone());
            }
        }
        Err(ExecError::NoMatchingNode)
    }
}

/// Equality-only condition matching; a missing property fails the match,
/// an empty condition list matches everything.
fn matches_conditions(props: &PropMap, conditions: &[ast::Property]) -> bool {
    for condition in conditions {
        match props.get(&condition.name) {
            Some(value) if *value == PropValue::from_literal(&condition.value) => {}
            _ => return false,
        }
    }
    true
}

fn eval_properties(props: &[ast::Property]) -> PropMap {
    props
        .iter()
        .map(|p| (p.name.clone(), PropValue::from_literal(&p.value)))
        .collect()
}

/// Fill in declared defaults for fields absent from the property list.
fn apply_defaults<'a>(props: &mut PropMap, fields: impl Iterator<Item = &'a cat::FieldSpec>) {
    for field in fields {
        if props.contains_key(&field.name) {
            continue;
        }
        if let Some(raw) = &field.default_raw {
            props.insert(field.name.clone(), PropValue::from_default_raw(raw));
        }
    }
}

/* ---------------------- AST -> catalog conversions ---------------------- */

fn convert_field(field: &ast::FieldDef) -> FieldPayload {
    FieldPayload {
        name: field.name.clone(),
        ty: convert_type_spec(&field.ty),
        primary_key: field.primary_key,
        unique: field.unique,
        not_null: field.not_null,
        default_raw: field.default.as_ref().map(|lit| lit.text.clone()),
    }
}

fn convert_type_spec(ty: &ast::TypeSpec) -> cat::TypeSpec {
    cat::TypeSpec {
        base: convert_base_type(ty.base),
        elem: ty
            .elem
            .as_ref()
            .map(|elem| Box::new(convert_type_spec(elem))),
        enum_vals: ty.enum_vals.clone(),
    }
}

fn convert_base_type(base: ast::BaseType) -> cat::BaseType {
    match base {
        ast::BaseType::String => cat::BaseType::String,
        ast::BaseType::Text => cat::BaseType::Text,
        ast::BaseType::Int => cat::BaseType::Int,
        ast::BaseType::Float => cat::BaseType::Float,
        ast::BaseType::Bool => cat::BaseType::Bool,
        ast::BaseType::Uuid => cat::BaseType::Uuid,
        ast::BaseType::Date => cat::BaseType::Date,
        ast::BaseType::Time => cat::BaseType::Time,
        ast::BaseType::DateTime => cat::BaseType::DateTime,
        ast::BaseType::Json => cat::BaseType::Json,
        ast::BaseType::Blob => cat::BaseType::Blob,
        ast::BaseType::Array => cat::BaseType::Array,
        ast::BaseType::Enum => cat::BaseType::Enum,
    }
}

fn convert_endpoint(ep: &ast::Endpoint) -> cat::EdgeEndpoint {
    cat::EdgeEndpoint {
        label: ep.label.clone(),
        card: match ep.card {
            ast::Cardinality::One => cat::Cardinality::One,
            ast::Cardinality::Many => cat::Cardinality::Many,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parser::parse_script;
    use crate::catalog::FileStore;

    struct Harness {
        _dir: tempfile::TempDir,
        exec: Executor,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let registry =
                Arc::new(Registry::open(Box::new(FileStore::new(dir.path()).unwrap())).unwrap());
            Self {
                _dir: dir,
                exec: Executor::new(registry),
            }
        }

        fn run(&mut self, script: &str) -> ExecResult<String> {
            let (stmts, errs) = parse_script(script);
            assert!(errs.is_empty(), "parse errors in {:?}: {:?}", script, errs);
            let mut out = Vec::new();
            self.exec.execute_statements(&mut out, &stmts)?;
            Ok(String::from_utf8(out).unwrap())
        }

        fn run_err(&mut self, script: &str) -> ExecError {
            self.run(script).unwrap_err()
        }
    }

    #[test]
    fn create_and_insert_node() {
        let mut h = Harness::new();
        let out = h
            .run("CREATE NODE Person(name: STRING, age: INT); INSERT NODE Person (name: 'Alice', age: 30);")
            .unwrap();
        assert!(out.contains("Node inserted with ID: 1"), "{}", out);
        assert!(
            out.contains("OK - 2 statement(s) executed successfully"),
            "{}",
            out
        );

        let nodes = &h.exec.graph().nodes["Person"];
        assert_eq!(nodes.len(), 1);
        let props = &nodes["1"];
        assert_eq!(props["name"], PropValue::Text("Alice".to_string()));
        assert_eq!(props["age"], PropValue::Text("30".to_string()));
        assert_eq!(props["_id"], PropValue::Text("1".to_string()));
    }

    #[test]
    fn insert_into_unknown_type_fails() {
        let mut h = Harness::new();
        let err = h.run_err("INSERT NODE Ghost (x: 1);");
        assert!(matches!(err, ExecError::UnknownNodeType(_)));
    }

    #[test]
    fn missing_required_field_fails() {
        let mut h = Harness::new();
        h.run("CREATE NODE P(name: STRING NOT NULL, age: INT);")
            .unwrap();
        let err = h.run_err("INSERT NODE P (age: 1);");
        assert!(
            matches!(err, ExecError::MissingRequiredField(ref f) if f == "name"),
            "{:?}",
            err
        );
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let mut h = Harness::new();
        h.run("CREATE NODE P(name: STRING NOT NULL DEFAULT 'guest', vip: BOOL DEFAULT false);")
            .unwrap();
        h.run("INSERT NODE P;").unwrap();
        let props = &h.exec.graph().nodes["P"]["1"];
        assert_eq!(props["name"], PropValue::Text("guest".to_string()));
        assert_eq!(props["vip"], PropValue::Bool(false));
    }

    #[test]
    fn edge_insert_with_declared_endpoints() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE A(x: INT); CREATE NODE B(x: INT);
             CREATE EDGE R(FROM A ONE, TO B ONE);
             INSERT NODE A(x: 1); INSERT NODE B(x: 2);",
        )
        .unwrap();
        let out = h.run("INSERT EDGE R FROM A(x: 1) TO B(x: 2);").unwrap();
        assert!(out.contains("Edge inserted with ID: edge_3"), "{}", out);
        let edges = &h.exec.graph().edges["R"];
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from_node_id, "1");
        assert_eq!(edges[0].to_node_id, "2");
    }

    #[test]
    fn edge_insert_endpoint_type_mismatch() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE A(x: INT); CREATE NODE B(x: INT);
             CREATE EDGE R(FROM A ONE, TO B ONE);
             INSERT NODE A(x: 1); INSERT NODE B(x: 2);",
        )
        .unwrap();
        let err = h.run_err("INSERT EDGE R FROM B(x: 2) TO A(x: 1);");
        assert!(
            err.to_string()
                .contains("FROM node type 'B' does not match edge FROM type 'A'"),
            "{}",
            err
        );
    }

    #[test]
    fn edge_insert_by_direct_id() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE A(x: INT);
             CREATE EDGE R(FROM A ONE, TO A ONE);
             INSERT NODE A(x: 1); INSERT NODE A(x: 2);",
        )
        .unwrap();
        h.run("INSERT EDGE R FROM A(2) TO A(1);").unwrap();
        let edges = &h.exec.graph().edges["R"];
        assert_eq!(edges[0].from_node_id, "2");
        assert_eq!(edges[0].to_node_id, "1");

        let err = h.run_err("INSERT EDGE R FROM A(99) TO A(2);");
        assert!(err.to_string().contains("FROM node not found"), "{}", err);
    }

    #[test]
    fn update_nodes_with_where() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE P(name: STRING, age: INT);
             INSERT NODE P(name: 'Alice', age: 30);
             INSERT NODE P(name: 'Bob', age: 30);",
        )
        .unwrap();
        let out = h
            .run("UPDATE NODE P SET age: 31 WHERE name: 'Alice';")
            .unwrap();
        assert!(out.contains("Updated 1 node(s)"), "{}", out);
        let nodes = &h.exec.graph().nodes["P"];
        assert_eq!(nodes["2"]["age"], PropValue::Text("31".to_string()));
        assert_eq!(nodes["3"]["age"], PropValue::Text("30".to_string()));
    }

    #[test]
    fn update_with_empty_where_matches_all() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE P(name: STRING, age: INT);
             INSERT NODE P(name: 'Alice', age: 30);
             INSERT NODE P(name: 'Bob', age: 40);",
        )
        .unwrap();
        let out = h.run("UPDATE NODE P SET age: 0;").unwrap();
        assert!(out.contains("Updated 2 node(s)"), "{}", out);
    }

    #[test]
    fn delete_nodes_and_edges() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE P(name: STRING);
             CREATE EDGE R(FROM P ONE, TO P ONE, PROPS(kind: STRING));
             INSERT NODE P(name: 'Alice');
             INSERT NODE P(name: 'Bob');
             INSERT EDGE R FROM P(name: 'Alice') TO P(name: 'Bob') (kind: 'friend');",
        )
        .unwrap();

        let out = h.run("DELETE EDGE R WHERE kind: 'friend';").unwrap();
        assert!(out.contains("Deleted 1 edge(s)"), "{}", out);
        assert!(h.exec.graph().edges["R"].is_empty());

        let out = h.run("DELETE NODE P WHERE name: 'Alice';").unwrap();
        assert!(out.contains("Deleted 1 node(s)"), "{}", out);
        assert_eq!(h.exec.graph().nodes["P"].len(), 1);
    }

    #[test]
    fn match_emits_nodes_with_filter() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE P(name: STRING, age: INT);
             INSERT NODE P(name: 'Alice', age: 30);
             INSERT NODE P(name: 'Bob', age: 40);",
        )
        .unwrap();
        let out = h.run("MATCH P WHERE name: 'Alice';").unwrap();
        assert!(out.contains("MATCH Results:"), "{}", out);
        assert!(out.contains("Nodes of type 'P':"), "{}", out);
        assert!(out.contains("name: Alice"), "{}", out);
        assert!(!out.contains("name: Bob"), "{}", out);
    }

    #[test]
    fn match_does_not_set_mutation_bit() {
        let mut h = Harness::new();
        h.run("CREATE NODE P(name: STRING);").unwrap();

        let (stmts, errs) = parse_script("MATCH P;");
        assert!(errs.is_empty());
        let mut out = Vec::new();
        let mutated = h.exec.execute_statements(&mut out, &stmts).unwrap();
        assert!(!mutated);

        let (stmts, _) = parse_script("INSERT NODE P(name: 'A');");
        let mutated = h.exec.execute_statements(&mut out, &stmts).unwrap();
        assert!(mutated);
    }

    #[test]
    fn batch_short_circuits_on_error() {
        let mut h = Harness::new();
        let err = h.run_err("CREATE NODE P(name: STRING); INSERT NODE Ghost (x: 1);");
        assert!(matches!(err, ExecError::UnknownNodeType(_)));
        // the first statement's effect stays (no rollback)
        assert!(h.exec.registry.current().nodes.contains_key("P"));
    }

    #[test]
    fn composite_set_primary_key_is_rejected() {
        let mut h = Harness::new();
        h.run("CREATE NODE P(a: INT, b: INT);").unwrap();
        let err = h.run_err("ALTER NODE P SET PRIMARY KEY (a, b);");
        assert!(matches!(err, ExecError::CompositePrimaryKey));

        h.run("ALTER NODE P SET PRIMARY KEY (a);").unwrap();
        assert_eq!(h.exec.registry.current().nodes["P"].pk, "a");
    }

    #[test]
    fn alter_edge_set_endpoints_changes_both_sides() {
        let mut h = Harness::new();
        h.run(
            "CREATE NODE A(x: INT); CREATE NODE B(x: INT);
             CREATE EDGE R(FROM A ONE, TO A ONE);
             ALTER EDGE R SET FROM B MANY TO B;",
        )
        .unwrap();
        let cat = h.exec.registry.current();
        assert_eq!(cat.edges["R"].from.label, "B");
        assert_eq!(cat.edges["R"].from.card, cat::Cardinality::Many);
        assert_eq!(cat.edges["R"].to.label, "B");
    }

    #[test]
    fn ddl_validation_error_surfaces_message() {
        let mut h = Harness::new();
        let err = h.run_err("CREATE NODE P(id1: UUID PRIMARY KEY, id2: UUID PRIMARY KEY);");
        assert!(
            err.to_string().contains("multiple PRIMARY KEY"),
            "{}",
            err
        );
    }
}
