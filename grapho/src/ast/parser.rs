// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recursive-descent parser for the RDCL statement language
//!
//! The parser keeps one token of lookahead. Any syntactic mismatch records a
//! [`ParseError`] and recovery consumes tokens up to and including the next
//! `;` (or EOF), after which parsing continues with the next statement.
//! Statements successfully produced before an error are kept. The parser
//! never panics and always leaves the lexer at EOF.

use std::fmt;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};

/// A recorded parse error with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub msg: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.msg)
    }
}

impl std::error::Error for ParseError {}

/// Internal result type: the error has already been recorded when `Err` is
/// returned, so it carries no payload.
type PResult<T> = Result<T, ()>;

pub struct Parser {
    lexer: Lexer,
    tok: Token,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let tok = lexer.next_token();
        Self {
            lexer,
            tok,
            errors: Vec::new(),
        }
    }

    /// Parse a full script: `( ';' | statement ';' )*`.
    ///
    /// Returns the statements that parsed cleanly and every error collected
    /// along the way.
    pub fn parse_script(mut self) -> (Vec<Statement>, Vec<ParseError>) {
        let mut out = Vec::new();
        while self.tok.kind != TokenKind::Eof {
            // stray semicolons between statements are tolerated
            if self.eat(TokenKind::Semi) {
                continue;
            }
            match self.parse_stmt() {
                Ok(stmt) => {
                    out.push(stmt);
                    if !self.eat(TokenKind::Semi) {
                        let t = self.tok.clone();
                        self.record(t.line, t.column, "missing ';' after statement".to_string());
                        self.recover();
                    }
                }
                Err(()) => self.recover(),
            }
        }
        (out, self.errors)
    }

    fn next(&mut self) {
        self.tok = self.lexer.next_token();
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.tok.kind == kind {
            self.next();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.tok.kind == kind {
            let t = self.tok.clone();
            self.next();
            return Ok(t);
        }
        let t = self.tok.clone();
        self.record(
            t.line,
            t.column,
            format!("expected {}, found {} ({:?})", kind, t.kind, t.lexeme),
        );
        Err(())
    }

    fn record(&mut self, line: usize, col: usize, msg: String) {
        self.errors.push(ParseError { line, col, msg });
    }

    fn error_at<T>(&mut self, tok: &Token, msg: String) -> PResult<T> {
        self.record(tok.line, tok.column, msg);
        Err(())
    }

    /// Skip tokens up to and including the next `;`, or stop at EOF.
    fn recover(&mut self) {
        while self.tok.kind != TokenKind::Semi && self.tok.kind != TokenKind::Eof {
            self.next();
        }
        if self.tok.kind == TokenKind::Semi {
            self.next();
        }
    }

    fn location(tok: &Token) -> Location {
        Location {
            line: tok.line,
            column: tok.column,
        }
    }

    fn parse_stmt(&mut self) -> PResult<Statement> {
        match self.tok.kind {
            TokenKind::Create => self.parse_create(),
            TokenKind::Alter => self.parse_alter(),
            TokenKind::Drop => self.parse_drop(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Update => self.parse_update(),
            TokenKind::Delete => self.parse_delete(),
            TokenKind::Match => self.parse_match().map(Statement::Match),
            _ => {
                let t = self.tok.clone();
                self.error_at(
                    &t,
                    format!("unexpected token {} at start of statement", t.kind),
                )
            }
        }
    }

    /* ---------------------- CREATE ---------------------- */

    fn parse_create(&mut self) -> PResult<Statement> {
        let loc = Self::location(&self.tok);
        self.next(); // CREATE
        match self.tok.kind {
            TokenKind::Node => {
                self.next();
                self.parse_create_node(loc).map(Statement::CreateNode)
            }
            TokenKind::Edge => {
                self.next();
                self.parse_create_edge(loc).map(Statement::CreateEdge)
            }
            _ => {
                let t = self.tok.clone();
                self.error_at(&t, "expected NODE or EDGE after CREATE".to_string())
            }
        }
    }

    fn parse_create_node(&mut self, location: Location) -> PResult<CreateNodeStmt> {
        let name = self.expect(TokenKind::Ident)?;
        let mut stmt = CreateNodeStmt {
            name: name.lexeme,
            fields: Vec::new(),
            location,
        };
        self.expect(TokenKind::LParen)?;
        if self.tok.kind != TokenKind::RParen {
            loop {
                stmt.fields.push(self.parse_field_def()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                // trailing comma before the closing paren
                if self.tok.kind == TokenKind::RParen {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(stmt)
    }

    fn parse_create_edge(&mut self, location: Location) -> PResult<CreateEdgeStmt> {
        let name = self.expect(TokenKind::Ident)?;

        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::From)?;
        let from = self.parse_endpoint()?;
        self.expect(TokenKind::Comma)?;
        self.expect(TokenKind::To)?;
        let to = self.parse_endpoint()?;

        let mut props = Vec::new();
        if self.eat(TokenKind::Comma) {
            self.expect(TokenKind::Props)?;
            self.expect(TokenKind::LParen)?;
            if self.tok.kind != TokenKind::RParen {
                loop {
                    props.push(self.parse_field_def()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    if self.tok.kind == TokenKind::RParen {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        self.expect(TokenKind::RParen)?;

        Ok(CreateEdgeStmt {
            name: name.lexeme,
            from,
            to,
            props,
            location,
        })
    }

    fn parse_endpoint(&mut self) -> PResult<Endpoint> {
        let label = self.expect(TokenKind::Ident)?;
        // cardinality defaults to ONE
        let card = match self.tok.kind {
            TokenKind::One => {
                self.next();
                Cardinality::One
            }
            TokenKind::Many => {
                self.next();
                Cardinality::Many
            }
            _ => Cardinality::One,
        };
        Ok(Endpoint {
            label: label.lexeme,
            card,
        })
    }

    fn parse_field_def(&mut self) -> PResult<FieldDef> {
        let ident = self.expect(TokenKind::Ident)?;
        let location = Self::location(&ident);

        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type_spec()?;

        let mut fd = FieldDef {
            name: ident.lexeme,
            ty,
            primary_key: false,
            unique: false,
            not_null: false,
            default: None,
            location,
        };

        // zero or more field options
        loop {
            match self.tok.kind {
                TokenKind::Primary => {
                    self.next();
                    self.expect(TokenKind::Key)?;
                    fd.primary_key = true;
                }
                TokenKind::Unique => {
                    self.next();
                    fd.unique = true;
                }
                TokenKind::Not => {
                    self.next();
                    self.expect(TokenKind::Null)?;
                    fd.not_null = true;
                }
                TokenKind::Default => {
                    self.next();
                    fd.default = Some(self.parse_literal()?);
                }
                _ => break,
            }
        }
        Ok(fd)
    }

    fn parse_type_spec(&mut self) -> PResult<TypeSpec> {
        let scalar = |base| Ok(TypeSpec::scalar(base));
        match self.tok.kind {
            TokenKind::StringKw => {
                self.next();
                scalar(BaseType::String)
            }
            TokenKind::Text => {
                self.next();
                scalar(BaseType::Text)
            }
            TokenKind::Int => {
                self.next();
                scalar(BaseType::Int)
            }
            TokenKind::Float => {
                self.next();
                scalar(BaseType::Float)
            }
            TokenKind::BoolKw => {
                self.next();
                scalar(BaseType::Bool)
            }
            TokenKind::Uuid => {
                self.next();
                scalar(BaseType::Uuid)
            }
            TokenKind::Date => {
                self.next();
                scalar(BaseType::Date)
            }
            TokenKind::Time => {
                self.next();
                scalar(BaseType::Time)
            }
            TokenKind::DateTime => {
                self.next();
                scalar(BaseType::DateTime)
            }
            TokenKind::Json => {
                self.next();
                scalar(BaseType::Json)
            }
            TokenKind::Blob => {
                self.next();
                scalar(BaseType::Blob)
            }
            TokenKind::Array => {
                self.next();
                self.expect(TokenKind::Lt)?;
                let elem = self.parse_type_spec()?;
                self.expect(TokenKind::Gt)?;
                Ok(TypeSpec {
                    base: BaseType::Array,
                    elem: Some(Box::new(elem)),
                    enum_vals: Vec::new(),
                })
            }
            TokenKind::Enum => {
                self.next();
                self.expect(TokenKind::Lt)?;
                let mut vals = Vec::new();
                // at least one string value
                vals.push(self.expect(TokenKind::Str)?.lexeme);
                while self.eat(TokenKind::Comma) {
                    vals.push(self.expect(TokenKind::Str)?.lexeme);
                }
                self.expect(TokenKind::Gt)?;
                Ok(TypeSpec {
                    base: BaseType::Enum,
                    elem: None,
                    enum_vals: vals,
                })
            }
            _ => {
                let t = self.tok.clone();
                self.error_at(&t, format!("expected type, found {}", t.kind))
            }
        }
    }

    fn parse_literal(&mut self) -> PResult<Literal> {
        let t = self.tok.clone();
        let kind = match t.kind {
            TokenKind::Str => LiteralKind::String,
            TokenKind::Number => LiteralKind::Number,
            TokenKind::Bool => LiteralKind::Bool,
            TokenKind::Null => LiteralKind::Null,
            _ => {
                return self.error_at(&t, format!("expected literal, found {}", t.kind));
            }
        };
        self.next();
        let location = Self::location(&t);
        Ok(Literal {
            kind,
            text: if kind == LiteralKind::Null {
                "null".to_string()
            } else {
                t.lexeme
            },
            location,
        })
    }

    /* ---------------------- ALTER ---------------------- */

    fn parse_alter(&mut self) -> PResult<Statement> {
        let loc = Self::location(&self.tok);
        self.next(); // ALTER
        match self.tok.kind {
            TokenKind::Node => {
                self.next();
                self.parse_alter_node(loc).map(Statement::AlterNode)
            }
            TokenKind::Edge => {
                self.next();
                self.parse_alter_edge(loc).map(Statement::AlterEdge)
            }
            _ => {
                let t = self.tok.clone();
                self.error_at(&t, "expected NODE or EDGE after ALTER".to_string())
            }
        }
    }

    fn parse_alter_node(&mut self, location: Location) -> PResult<AlterNodeStmt> {
        let name = self.expect(TokenKind::Ident)?;
        let action = match self.tok.kind {
            TokenKind::Add => {
                self.next();
                NodeAlterAction::AddField(self.parse_field_def()?)
            }
            TokenKind::Drop => {
                self.next();
                NodeAlterAction::DropField(self.expect(TokenKind::Ident)?.lexeme)
            }
            TokenKind::Modify => {
                self.next();
                NodeAlterAction::ModifyField(self.parse_field_def()?)
            }
            TokenKind::Set => {
                self.next();
                self.expect(TokenKind::Primary)?;
                self.expect(TokenKind::Key)?;
                self.expect(TokenKind::LParen)?;
                let mut pk_fields = Vec::new();
                loop {
                    pk_fields.push(self.expect(TokenKind::Ident)?.lexeme);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                NodeAlterAction::SetPrimaryKey(pk_fields)
            }
            _ => {
                let t = self.tok.clone();
                return self.error_at(
                    &t,
                    "expected ADD, DROP, MODIFY, or SET after ALTER NODE".to_string(),
                );
            }
        };
        Ok(AlterNodeStmt {
            name: name.lexeme,
            actions: vec![action],
            location,
        })
    }

    fn parse_alter_edge(&mut self, location: Location) -> PResult<AlterEdgeStmt> {
        let name = self.expect(TokenKind::Ident)?;
        let action = match self.tok.kind {
            TokenKind::Add => {
                self.next();
                EdgeAlterAction::AddProp(self.parse_field_def()?)
            }
            TokenKind::Drop => {
                self.next();
                EdgeAlterAction::DropProp(self.expect(TokenKind::Ident)?.lexeme)
            }
            TokenKind::Modify => {
                self.next();
                EdgeAlterAction::ModifyProp(self.parse_field_def()?)
            }
            TokenKind::Set => {
                self.next();
                self.expect(TokenKind::From)?;
                let from = self.parse_endpoint()?;
                self.expect(TokenKind::To)?;
                let to = self.parse_endpoint()?;
                EdgeAlterAction::SetEndpoints { from, to }
            }
            _ => {
                let t = self.tok.clone();
                return self.error_at(
                    &t,
                    "expected ADD, DROP, MODIFY, or SET after ALTER EDGE".to_string(),
                );
            }
        };
        Ok(AlterEdgeStmt {
            name: name.lexeme,
            actions: vec![action],
            location,
        })
    }

    /* ---------------------- DROP ---------------------- */

    fn parse_drop(&mut self) -> PResult<Statement> {
        let location = Self::location(&self.tok);
        self.next(); // DROP
        match self.tok.kind {
            TokenKind::Node => {
                self.next();
                let name = self.expect(TokenKind::Ident)?;
                Ok(Statement::DropNode(DropNodeStmt {
                    name: name.lexeme,
                    location,
                }))
            }
            TokenKind::Edge => {
                self.next();
                let name = self.expect(TokenKind::Ident)?;
                Ok(Statement::DropEdge(DropEdgeStmt {
                    name: name.lexeme,
                    location,
                }))
            }
            _ => {
                let t = self.tok.clone();
                self.error_at(&t, "expected NODE or EDGE after DROP".to_string())
            }
        }
    }

    /* ---------------------- DML ---------------------- */

    fn parse_insert(&mut self) -> PResult<Statement> {
        let location = Self::location(&self.tok);
        self.next(); // INSERT
        match self.tok.kind {
            TokenKind::Node => {
                self.next();
                let node_type = self.expect(TokenKind::Ident)?.lexeme;
                let mut properties = Vec::new();
                if self.eat(TokenKind::LParen) {
                    properties = self.parse_property_list()?;
                    self.expect(TokenKind::RParen)?;
                }
                Ok(Statement::InsertNode(InsertNodeStmt {
                    node_type,
                    properties,
                    location,
                }))
            }
            TokenKind::Edge => {
                self.next();
                let edge_type = self.expect(TokenKind::Ident)?.lexeme;
                self.expect(TokenKind::From)?;
                let from = self.parse_node_ref()?;
                self.expect(TokenKind::To)?;
                let to = self.parse_node_ref()?;
                let mut properties = Vec::new();
                if self.eat(TokenKind::LParen) {
                    properties = self.parse_property_list()?;
                    self.expect(TokenKind::RParen)?;
                }
                Ok(Statement::InsertEdge(InsertEdgeStmt {
                    edge_type,
                    from,
                    to,
                    properties,
                    location,
                }))
            }
            _ => {
                let t = self.tok.clone();
                self.error_at(
                    &t,
                    format!("expected NODE or EDGE after INSERT, found {}", t.kind),
                )
            }
        }
    }

    fn parse_update(&mut self) -> PResult<Statement> {
        let location = Self::location(&self.tok);
        self.next(); // UPDATE
        let is_node = match self.tok.kind {
            TokenKind::Node => true,
            TokenKind::Edge => false,
            _ => {
                let t = self.tok.clone();
                return self.error_at(
                    &t,
                    format!("expected NODE or EDGE after UPDATE, found {}", t.kind),
                );
            }
        };
        self.next();
        let name = self.expect(TokenKind::Ident)?.lexeme;
        self.expect(TokenKind::Set)?;
        let set = self.parse_property_list()?;
        let mut where_clause = Vec::new();
        if self.eat(TokenKind::Where) {
            where_clause = self.parse_property_list()?;
        }
        if is_node {
            Ok(Statement::UpdateNode(UpdateNodeStmt {
                node_type: name,
                set,
                where_clause,
                location,
            }))
        } else {
            Ok(Statement::UpdateEdge(UpdateEdgeStmt {
                edge_type: name,
                set,
                where_clause,
                location,
            }))
        }
    }

    fn parse_delete(&mut self) -> PResult<Statement> {
        let location = Self::location(&self.tok);
        self.next(); // DELETE
        let is_node = match self.tok.kind {
            TokenKind::Node => true,
            TokenKind::Edge => false,
            _ => {
                let t = self.tok.clone();
                return self.error_at(
                    &t,
                    format!("expected NODE or EDGE after DELETE, found {}", t.kind),
                );
            }
        };
        self.next();
        let name = self.expect(TokenKind::Ident)?.lexeme;
        // WHERE is mandatory for DELETE
        self.expect(TokenKind::Where)?;
        let where_clause = self.parse_property_list()?;
        if is_node {
            Ok(Statement::DeleteNode(DeleteNodeStmt {
                node_type: name,
                where_clause,
                location,
            }))
        } else {
            Ok(Statement::DeleteEdge(DeleteEdgeStmt {
                edge_type: name,
                where_clause,
                location,
            }))
        }
    }

    fn parse_match(&mut self) -> PResult<MatchStmt> {
        let location = Self::location(&self.tok);
        self.next(); // MATCH

        let mut pattern = Vec::new();
        while self.tok.kind == TokenKind::Ident {
            let label_tok = self.tok.clone();
            self.next();
            let label_location = Self::location(&label_tok);
            let mut element = MatchElement {
                label: label_tok.lexeme,
                alias: None,
                is_edge: false,
                location: label_location,
            };
            if self.tok.kind == TokenKind::Ident {
                element.alias = Some(self.tok.lexeme.clone());
                self.next();
            }
            pattern.push(element);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let mut where_clause = Vec::new();
        if self.eat(TokenKind::Where) {
            where_clause = self.parse_property_list()?;
        }

        let mut return_fields = Vec::new();
        if self.eat(TokenKind::Return) {
            loop {
                return_fields.push(self.expect(TokenKind::Ident)?.lexeme);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(MatchStmt {
            pattern,
            where_clause,
            return_fields,
            location,
        })
    }

    /* ---------------------- helpers ---------------------- */

    fn parse_property_list(&mut self) -> PResult<Vec<Property>> {
        let mut properties = Vec::new();
        loop {
            let name = self.expect(TokenKind::Ident)?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_literal()?;
            let name_location = Self::location(&name);
            properties.push(Property {
                name: name.lexeme,
                value,
                location: name_location,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(properties)
    }

    fn parse_node_ref(&mut self) -> PResult<NodeRef> {
        let type_tok = self.expect(TokenKind::Ident)?;
        let type_location = Self::location(&type_tok);
        let mut node_ref = NodeRef {
            node_type: type_tok.lexeme,
            id: None,
            properties: Vec::new(),
            location: type_location,
        };
        if self.eat(TokenKind::LParen) {
            if self.tok.kind == TokenKind::Number || self.tok.kind == TokenKind::Str {
                // direct id reference
                node_ref.id = Some(self.parse_literal()?);
            } else {
                node_ref.properties = self.parse_property_list()?;
            }
            self.expect(TokenKind::RParen)?;
        }
        Ok(node_ref)
    }
}

/// Convenience wrapper: parse `input` in one call.
pub fn parse_script(input: &str) -> (Vec<Statement>, Vec<ParseError>) {
    Parser::new(input).parse_script()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Vec<Statement> {
        let (stmts, errs) = parse_script(input);
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
        stmts
    }

    #[test]
    fn create_node_with_options() {
        let stmts = parse_ok(
            "CREATE NODE Person (
               id: uuid PRIMARY KEY,
               name: string,
               email: string UNIQUE,
               level: enum<'A','B','C'> DEFAULT 'A'
             );",
        );
        assert_eq!(stmts.len(), 1);
        let n = match &stmts[0] {
            Statement::CreateNode(n) => n,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(n.name, "Person");
        assert_eq!(n.fields.len(), 4);
        assert!(n.fields[0].primary_key);
        assert_eq!(n.fields[0].ty.base, BaseType::Uuid);
        assert!(n.fields[2].unique);
        let level = &n.fields[3];
        assert_eq!(level.ty.base, BaseType::Enum);
        assert_eq!(level.ty.enum_vals, vec!["A", "B", "C"]);
        let def = level.default.as_ref().expect("default");
        assert_eq!(def.kind, LiteralKind::String);
        assert_eq!(def.text, "A");
    }

    #[test]
    fn create_edge_with_cardinalities_and_props() {
        let stmts = parse_ok(
            "CREATE EDGE WORKS_AT (
               FROM Person MANY,
               TO Company ONE,
               PROPS (role: string, start_date: date)
             );",
        );
        let e = match &stmts[0] {
            Statement::CreateEdge(e) => e,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(e.name, "WORKS_AT");
        assert_eq!(e.from.label, "Person");
        assert_eq!(e.from.card, Cardinality::Many);
        assert_eq!(e.to.label, "Company");
        assert_eq!(e.to.card, Cardinality::One);
        assert_eq!(e.props.len(), 2);
    }

    #[test]
    fn endpoint_cardinality_defaults_to_one() {
        let stmts = parse_ok("CREATE EDGE R (FROM A, TO B);");
        let e = match &stmts[0] {
            Statement::CreateEdge(e) => e,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(e.from.card, Cardinality::One);
        assert_eq!(e.to.card, Cardinality::One);
    }

    #[test]
    fn all_primitive_types_and_defaults() {
        let stmts = parse_ok(
            "CREATE NODE T(
               a: string DEFAULT 'x',
               b: text,
               c: int DEFAULT 123,
               d: float DEFAULT 1.5,
               e: bool DEFAULT true,
               f: uuid,
               g: date,
               h: time,
               i: datetime,
               j: json,
               k: blob NOT NULL
             );",
        );
        let n = match &stmts[0] {
            Statement::CreateNode(n) => n,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(n.fields.len(), 11);
        assert_eq!(n.fields[0].ty.base, BaseType::String);
        assert_eq!(
            n.fields[0].default.as_ref().unwrap().kind,
            LiteralKind::String
        );
        assert_eq!(
            n.fields[2].default.as_ref().unwrap().kind,
            LiteralKind::Number
        );
        assert_eq!(
            n.fields[4].default.as_ref().unwrap().text,
            "true".to_string()
        );
        assert!(n.fields[10].not_null);
    }

    #[test]
    fn array_types_nest() {
        let stmts = parse_ok("CREATE NODE T(tags: array<array<string>>);");
        let n = match &stmts[0] {
            Statement::CreateNode(n) => n,
            other => panic!("bad AST: {:?}", other),
        };
        let ty = &n.fields[0].ty;
        assert_eq!(ty.base, BaseType::Array);
        let inner = ty.elem.as_ref().unwrap();
        assert_eq!(inner.base, BaseType::Array);
        assert_eq!(inner.elem.as_ref().unwrap().base, BaseType::String);
    }

    #[test]
    fn trailing_comma_in_field_list() {
        let stmts = parse_ok("CREATE NODE T(a: int, b: int,);");
        let n = match &stmts[0] {
            Statement::CreateNode(n) => n,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(n.fields.len(), 2);
    }

    #[test]
    fn alter_node_variants() {
        let stmts = parse_ok(
            "ALTER NODE P ADD age: int NOT NULL;
             ALTER NODE P DROP age;
             ALTER NODE P MODIFY name: text UNIQUE;
             ALTER NODE P SET PRIMARY KEY (id);",
        );
        assert_eq!(stmts.len(), 4);
        match &stmts[0] {
            Statement::AlterNode(a) => match &a.actions[0] {
                NodeAlterAction::AddField(f) => {
                    assert_eq!(f.name, "age");
                    assert!(f.not_null);
                }
                other => panic!("bad action: {:?}", other),
            },
            other => panic!("bad AST: {:?}", other),
        }
        match &stmts[3] {
            Statement::AlterNode(a) => match &a.actions[0] {
                NodeAlterAction::SetPrimaryKey(fields) => assert_eq!(fields, &["id"]),
                other => panic!("bad action: {:?}", other),
            },
            other => panic!("bad AST: {:?}", other),
        }
    }

    #[test]
    fn alter_edge_set_endpoints() {
        let stmts = parse_ok("ALTER EDGE R SET FROM A MANY TO B;");
        match &stmts[0] {
            Statement::AlterEdge(a) => match &a.actions[0] {
                EdgeAlterAction::SetEndpoints { from, to } => {
                    assert_eq!(from.label, "A");
                    assert_eq!(from.card, Cardinality::Many);
                    assert_eq!(to.label, "B");
                    assert_eq!(to.card, Cardinality::One);
                }
                other => panic!("bad action: {:?}", other),
            },
            other => panic!("bad AST: {:?}", other),
        }
    }

    #[test]
    fn drop_statements() {
        let stmts = parse_ok("DROP NODE Person; DROP EDGE KNOWS;");
        match &stmts[0] {
            Statement::DropNode(d) => assert_eq!(d.name, "Person"),
            other => panic!("bad AST: {:?}", other),
        }
        match &stmts[1] {
            Statement::DropEdge(d) => assert_eq!(d.name, "KNOWS"),
            other => panic!("bad AST: {:?}", other),
        }
    }

    #[test]
    fn insert_node_with_properties() {
        let stmts = parse_ok("INSERT NODE Person (name: 'Alice', age: 30, active: true);");
        let i = match &stmts[0] {
            Statement::InsertNode(i) => i,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(i.node_type, "Person");
        assert_eq!(i.properties.len(), 3);
        assert_eq!(i.properties[0].value.text, "Alice");
        assert_eq!(i.properties[2].value.kind, LiteralKind::Bool);
    }

    #[test]
    fn insert_node_without_properties() {
        let stmts = parse_ok("INSERT NODE Person;");
        let i = match &stmts[0] {
            Statement::InsertNode(i) => i,
            other => panic!("bad AST: {:?}", other),
        };
        assert!(i.properties.is_empty());
    }

    #[test]
    fn insert_edge_with_id_and_property_refs() {
        let stmts =
            parse_ok("INSERT EDGE KNOWS FROM Person(1) TO Person(name: 'Bob') (since: 2020);");
        let i = match &stmts[0] {
            Statement::InsertEdge(i) => i,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(i.edge_type, "KNOWS");
        assert_eq!(i.from.id.as_ref().unwrap().text, "1");
        assert!(i.from.properties.is_empty());
        assert!(i.to.id.is_none());
        assert_eq!(i.to.properties[0].name, "name");
        assert_eq!(i.properties[0].name, "since");
    }

    #[test]
    fn update_with_and_without_where() {
        let stmts = parse_ok(
            "UPDATE NODE Person SET age: 31 WHERE name: 'Alice';
             UPDATE EDGE KNOWS SET since: 2021;",
        );
        match &stmts[0] {
            Statement::UpdateNode(u) => {
                assert_eq!(u.set.len(), 1);
                assert_eq!(u.where_clause.len(), 1);
            }
            other => panic!("bad AST: {:?}", other),
        }
        match &stmts[1] {
            Statement::UpdateEdge(u) => assert!(u.where_clause.is_empty()),
            other => panic!("bad AST: {:?}", other),
        }
    }

    #[test]
    fn delete_requires_where() {
        let (stmts, errs) = parse_script("DELETE NODE Person;");
        assert!(stmts.is_empty());
        assert!(!errs.is_empty());

        let stmts = parse_ok("DELETE NODE Person WHERE name: 'Alice';");
        match &stmts[0] {
            Statement::DeleteNode(d) => assert_eq!(d.where_clause.len(), 1),
            other => panic!("bad AST: {:?}", other),
        }
    }

    #[test]
    fn match_with_alias_where_and_return() {
        let stmts = parse_ok("MATCH Person p, Company WHERE name: 'Alice' RETURN name, age;");
        let m = match &stmts[0] {
            Statement::Match(m) => m,
            other => panic!("bad AST: {:?}", other),
        };
        assert_eq!(m.pattern.len(), 2);
        assert_eq!(m.pattern[0].label, "Person");
        assert_eq!(m.pattern[0].alias.as_deref(), Some("p"));
        assert!(m.pattern[1].alias.is_none());
        assert_eq!(m.where_clause.len(), 1);
        assert_eq!(m.return_fields, vec!["name", "age"]);
    }

    #[test]
    fn missing_semicolon_is_recovered() {
        let (_, errs) = parse_script("CREATE NODE A(id:int) CREATE NODE B(id:int);");
        assert!(!errs.is_empty(), "expected error for missing semicolon");
    }

    #[test]
    fn stray_semicolons_are_tolerated() {
        let stmts = parse_ok(";;CREATE NODE A(id:int);;;");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn recovery_keeps_later_statements() {
        let (stmts, errs) = parse_script("FOO BAR; CREATE NODE A(id:int);");
        assert!(!errs.is_empty(), "expected at least one error");
        assert_eq!(stmts.len(), 1, "expected exactly the CreateNode statement");
        assert!(matches!(stmts[0], Statement::CreateNode(_)));
    }

    #[test]
    fn errors_carry_positions() {
        let (_, errs) = parse_script("CREATE NODE A(\n  id int);");
        assert!(!errs.is_empty());
        assert_eq!(errs[0].line, 2);
    }

    #[test]
    fn illegal_token_is_surfaced() {
        let (stmts, errs) = parse_script("CREATE NODE A(id: int $);");
        assert!(stmts.is_empty());
        assert!(errs.iter().any(|e| e.msg.contains("ILLEGAL")), "{:?}", errs);
    }

    #[test]
    fn parser_terminates_on_arbitrary_input() {
        for input in [
            "",
            ";",
            "CREATE",
            "CREATE NODE",
            "CREATE NODE A(",
            "'unterminated",
            "/* unterminated",
            "MATCH",
            "))));;;(((",
        ] {
            let (_, _) = parse_script(input);
        }
    }
}
