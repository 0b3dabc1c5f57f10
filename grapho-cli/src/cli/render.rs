// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pretty-printing of server responses
//!
//! MATCH responses arrive as a block:
//!
//! ```text
//! MATCH Results:
//!
//! Nodes of type 'Person':
//!   ID: 1, Properties: {_id: 1, name: Alice}
//! OK - 1 statement(s) executed successfully
//! ```
//!
//! The renderer buffers the block and reformats it per type section; every
//! other server line is echoed as-is.

use colored::Colorize;

pub struct MatchRenderer {
    collecting: bool,
    lines: Vec<String>,
}

impl MatchRenderer {
    pub fn new() -> Self {
        Self {
            collecting: false,
            lines: Vec::new(),
        }
    }

    /// Feed one server line; prints directly to stdout.
    pub fn feed(&mut self, line: &str) {
        if line.starts_with("MATCH Results:") {
            self.collecting = true;
            self.lines.clear();
            return;
        }

        if self.collecting {
            // the completion line ends the block
            if line.starts_with("OK - ") || line.starts_with("Error executing") {
                self.render();
                self.collecting = false;
                self.lines.clear();
                println!("{}", line);
                return;
            }
            self.lines.push(line.to_string());
            return;
        }

        println!("{}", line);
    }

    fn render(&self) {
        if self.lines.is_empty() {
            return;
        }
        println!("{}", "MATCH Results (formatted):".bold());

        for line in &self.lines {
            let trimmed = line.trim();
            if let Some(ty) = parse_section(trimmed) {
                println!("\n{} {}", "Type:".bold(), ty.green());
                println!("------------------------");
                continue;
            }
            if let Some((id, props)) = parse_id_line(trimmed) {
                println!("- id: {}", id.cyan());
                for kv in parse_props(props) {
                    println!("    {}", kv);
                }
                continue;
            }
            if !trimmed.is_empty() {
                println!("{}", line);
            }
        }
        println!();
    }
}

/// Matches `Nodes of type '<T>':` and returns the type name.
fn parse_section(line: &str) -> Option<&str> {
    line.strip_prefix("Nodes of type '")?
        .strip_suffix("':")
}

/// Matches `ID: <id>, Properties: <map>` and splits the two parts.
fn parse_id_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("ID:")?;
    let (id, props) = rest.split_once(", Properties:")?;
    Some((id.trim(), props.trim()))
}

/// Converts `{k: v, k2: v2}` into `k = v` lines, best-effort.
fn parse_props(s: &str) -> Vec<String> {
    let inner = s.strip_prefix('{').and_then(|s| s.strip_suffix('}'));
    let Some(inner) = inner else {
        return Vec::new();
    };
    inner
        .split(", ")
        .filter(|part| !part.is_empty())
        .map(|part| part.replacen(": ", " = ", 1))
        .collect()
}
