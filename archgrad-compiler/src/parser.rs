//! Syntax of the topology grammar.
//!
//! An architecture is a `,`-separated list of statements. A statement is either
//! a chain `A~B~C` or a definition `NAME=CHAIN`. A chain segment is a layer
//! token, a reference to a definition, or a braced module `{...}` whose body is
//! itself a statement list. Which tokens are references is only known once the
//! definitions in scope are collected, so this stage keeps them as plain text.

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A layer specification or the name of a definition.
    Token(String),
    /// A nested module.
    Module(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Define { name: String, value: Vec<Segment> },
    Chain(Vec<Segment>),
}

/// Parses a whole architecture string.
///
/// # Errors
/// `InvalidArchitecture` for a blank string, `MalformedArchitecture` for
/// unbalanced braces, empty statements or ill-formed definitions.
pub fn parse(architecture: &str) -> Result<Vec<Statement>, CompileError> {
    if architecture.trim().is_empty() {
        return Err(CompileError::InvalidArchitecture(
            "architecture string is empty".to_string(),
        ));
    }
    parse_statements(architecture)
}

/// Splits an architecture into its top-level statements. A braced group is
/// one atomic token however many delimiters it contains.
pub fn split_architecture(architecture: &str) -> Result<Vec<&str>, CompileError> {
    let tokens = split_top_level(architecture, ',')?;
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(CompileError::malformed(architecture, "empty statement"));
    }
    Ok(tokens)
}

fn parse_statements(text: &str) -> Result<Vec<Statement>, CompileError> {
    split_architecture(text)?
        .into_iter()
        .map(parse_statement)
        .collect()
}

fn parse_statement(token: &str) -> Result<Statement, CompileError> {
    let parts = split_top_level(token, '=')?;
    match parts.as_slice() {
        [chain] => Ok(Statement::Chain(parse_chain(chain)?)),
        [name, value] => {
            if !is_name(name) {
                return Err(CompileError::malformed(
                    token,
                    format!("{:?} is not a valid definition name", name),
                ));
            }
            Ok(Statement::Define {
                name: name.to_string(),
                value: parse_chain(value)?,
            })
        }
        _ => Err(CompileError::malformed(token, "more than one '=' in a statement")),
    }
}

fn parse_chain(chain: &str) -> Result<Vec<Segment>, CompileError> {
    split_top_level(chain, '~')?
        .into_iter()
        .map(|segment| parse_segment(segment, chain))
        .collect()
}

fn parse_segment(segment: &str, chain: &str) -> Result<Segment, CompileError> {
    if segment.is_empty() {
        return Err(CompileError::malformed(chain, "empty chain segment"));
    }
    if let Some(body) = braced_body(segment) {
        if body.trim().is_empty() {
            return Err(CompileError::malformed(segment, "empty module"));
        }
        return Ok(Segment::Module(parse_statements(body)?));
    }
    if segment.contains(|c| c == '{' || c == '}') {
        return Err(CompileError::malformed(
            segment,
            "braces must enclose a whole chain segment",
        ));
    }
    Ok(Segment::Token(segment.to_string()))
}

/// Splits `text` on `delimiter` wherever the brace depth is zero, trimming
/// every part.
fn split_top_level(text: &str, delimiter: char) -> Result<Vec<&str>, CompileError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    CompileError::malformed(text, format!("unmatched '}}' at offset {}", offset))
                })?;
            }
            c if c == delimiter && depth == 0 => {
                parts.push(text[start..offset].trim());
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CompileError::malformed(text, "unclosed '{'"));
    }
    parts.push(text[start..].trim());
    Ok(parts)
}

/// The inside of `segment` when it is exactly one balanced `{...}` group.
fn braced_body(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            // The opening brace closed before the end: `{a}{b}`.
            '}' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
