//! Placeholder substitution for template content.
//!
//! Templates carry two placeholder syntaxes:
//!
//! - `{{{NAME}}}` - an application variable, replaced from the resolved
//!   variable map. The triple braces are deliberate: rendered documents are
//!   frequently fed to downstream tools with their own `{{ }}` templating,
//!   and the application marker must never collide with those.
//! - `${NAME}` - a system environment variable, replaced from the process
//!   environment when set and left untouched otherwise.
//!
//! # Syntax
//!
//! Names are `[A-Za-z_][A-Za-z0-9_]*`. Whitespace inside the application
//! marker is tolerated (`{{{ NAME }}}`). Anything that does not scan as a
//! well-formed placeholder - unterminated markers, empty or invalid names -
//! is plain text, never an error. This keeps parsing total, which the
//! reconciliation engine relies on.
//!
//! # Modes
//!
//! Strict substitution fails on the first application variable missing from
//! the map; lenient substitution leaves the placeholder text byte-identical
//! and continues. Environment markers are lenient in both modes: the
//! environment is ambient state, not part of the resolved set.
//!
//! Substitution is a single pass. A substituted value that itself contains
//! placeholder syntax is not rescanned, so expansion cannot recurse.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Error type for strict substitution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// An application variable was referenced but is not in the map.
    #[error("undefined variable '{name}' at byte {position} in template")]
    UndefinedVariable {
        /// The name of the undefined variable.
        name: String,
        /// Byte offset of the placeholder in the template.
        position: usize,
    },
}

/// A parsed piece of a template.
///
/// The concatenation of all segments' raw text reproduces the template
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text between placeholders.
    Literal(String),
    /// An application variable placeholder (`{{{NAME}}}`).
    Var {
        /// The variable name, trimmed.
        name: String,
        /// The raw placeholder text as it appears in the template.
        raw: String,
        /// Byte offset of the placeholder start.
        position: usize,
    },
    /// An environment variable placeholder (`${NAME}`).
    Env {
        /// The environment variable name.
        name: String,
        /// The raw placeholder text as it appears in the template.
        raw: String,
        /// Byte offset of the placeholder start.
        position: usize,
    },
}

/// Result of a substitution pass: the rendered text plus the application
/// variable names that were referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The rendered text.
    pub text: String,
    /// Application variable names referenced by the template.
    pub referenced: BTreeSet<String>,
}

/// Parse a template into literal and placeholder segments.
///
/// Parsing is total: malformed markers become literal text. Adjacent
/// literal runs are merged.
pub fn parse_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];

        if rest.starts_with("{{{") {
            if let Some((name, raw_len)) = scan_app_marker(rest) {
                flush_literal(&mut segments, &mut literal);
                segments.push(Segment::Var {
                    name,
                    raw: rest[..raw_len].to_string(),
                    position: i,
                });
                i += raw_len;
                continue;
            }
        } else if rest.starts_with("${") {
            if let Some((name, raw_len)) = scan_env_marker(rest) {
                flush_literal(&mut segments, &mut literal);
                segments.push(Segment::Env {
                    name,
                    raw: rest[..raw_len].to_string(),
                    position: i,
                });
                i += raw_len;
                continue;
            }
        }

        // Not a placeholder start: advance one char as literal text.
        let Some(ch) = rest.chars().next() else { break };
        literal.push(ch);
        i += ch.len_utf8();
    }

    flush_literal(&mut segments, &mut literal);
    segments
}

fn flush_literal(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Scan `{{{ NAME }}}` at the start of `rest`.
///
/// Returns the trimmed name and the byte length of the whole marker, or
/// `None` if the marker is unterminated or the name is invalid.
fn scan_app_marker(rest: &str) -> Option<(String, usize)> {
    debug_assert!(rest.starts_with("{{{"));
    let inner_start = 3;
    let close = rest[inner_start..].find("}}}")?;
    let inner = &rest[inner_start..inner_start + close];
    let name = inner.trim();
    if !is_valid_name(name) {
        return None;
    }
    Some((name.to_string(), inner_start + close + 3))
}

/// Scan `${NAME}` at the start of `rest`.
fn scan_env_marker(rest: &str) -> Option<(String, usize)> {
    debug_assert!(rest.starts_with("${"));
    let inner_start = 2;
    let close = rest[inner_start..].find('}')?;
    let name = &rest[inner_start..inner_start + close];
    if !is_valid_name(name) {
        return None;
    }
    Some((name.to_string(), inner_start + close + 1))
}

/// Whether `name` is a valid variable name (`[A-Za-z_][A-Za-z0-9_]*`).
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Substitute placeholders in `text` using the resolved variable map.
///
/// # Arguments
///
/// * `text` - The template text
/// * `variables` - The resolved name-to-value map
/// * `strict` - Fail on undefined application variables instead of leaving
///   them in place
///
/// # Returns
///
/// * `Ok(Substitution)` - rendered text plus referenced names
/// * `Err(TemplateError::UndefinedVariable)` - strict mode only
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use rulecast::template::substitute;
///
/// let mut vars = BTreeMap::new();
/// vars.insert("PROJECT_NAME".to_string(), "widget".to_string());
///
/// let out = substitute("# {{{PROJECT_NAME}}} rules", &vars, true).unwrap();
/// assert_eq!(out.text, "# widget rules");
/// ```
pub fn substitute(
    text: &str,
    variables: &BTreeMap<String, String>,
    strict: bool,
) -> Result<Substitution, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut referenced = BTreeSet::new();

    for segment in parse_segments(text) {
        match segment {
            Segment::Literal(lit) => out.push_str(&lit),
            Segment::Var {
                name,
                raw,
                position,
            } => {
                referenced.insert(name.clone());
                match variables.get(&name) {
                    Some(value) => out.push_str(value),
                    None if strict => {
                        return Err(TemplateError::UndefinedVariable { name, position });
                    }
                    None => out.push_str(&raw),
                }
            }
            Segment::Env { name, raw, .. } => match std::env::var(&name) {
                Ok(value) => out.push_str(&value),
                Err(_) => out.push_str(&raw),
            },
        }
    }

    Ok(Substitution {
        text: out,
        referenced,
    })
}

/// Extract the application variable names referenced by a template.
pub fn extract_variables(text: &str) -> BTreeSet<String> {
    parse_segments(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Var { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

/// The referenced application variables absent from `available`.
///
/// Strict substitution succeeds exactly when this set is empty.
pub fn undefined_variables(
    text: &str,
    available: &BTreeMap<String, String>,
) -> BTreeSet<String> {
    extract_variables(text)
        .into_iter()
        .filter(|name| !available.contains_key(name))
        .collect()
}
