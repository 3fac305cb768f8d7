//! Local variable file parsing.
//!
//! The local variable file lives in the project-local, non-versioned
//! `.rulecast/` directory and declares per-machine variables:
//!
//! ```yaml
//! AUTHOR: "Jane Doe"
//! GIT_BRANCH:
//!   type: command
//!   value: "git rev-parse --abbrev-ref HEAD"
//!   cache: true
//! ```
//!
//! Static entries are plain scalars. Dynamic entries are mappings with
//! `type: command`; their commands run during resolution, gated by the
//! project's `allow_commands` flag. Declaration order is preserved because
//! dynamic entries evaluate in file order.
//!
//! Absence of the file is not an error: the layer contributes nothing.

use crate::error::{Result, RulecastError};
use serde_yaml::Value;
use std::path::Path;

/// A single entry from the local variable file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVariable {
    /// The variable name (the mapping key).
    pub name: String,
    /// Static value or dynamic command spec.
    pub value: FileValue,
}

/// The value side of a local variable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileValue {
    /// A statically declared value.
    Static(String),
    /// A command to execute, with its caching policy.
    Command {
        /// The shell command string.
        command: String,
        /// Evaluate at most once per resolution when true.
        cache: bool,
    },
}

/// Load the local variable file.
///
/// Returns an empty list when the file does not exist.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<FileVariable>> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        RulecastError::UserError(format!(
            "failed to read variable file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse(&content).map_err(|e| {
        RulecastError::UserError(format!("in variable file '{}': {}", path.display(), e))
    })
}

/// Parse variable file content, preserving declaration order.
pub fn parse(yaml: &str) -> Result<Vec<FileVariable>> {
    let doc: Value = serde_yaml::from_str(yaml)
        .map_err(|e| RulecastError::UserError(format!("invalid YAML: {}", e)))?;

    let mapping = match doc {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(m) => m,
        _ => {
            return Err(RulecastError::UserError(
                "variable file must be a mapping of NAME to value".to_string(),
            ));
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = match key {
            Value::String(s) => s,
            other => {
                return Err(RulecastError::UserError(format!(
                    "variable names must be strings, found {:?}",
                    other
                )));
            }
        };

        let value = parse_entry(&name, value)?;
        entries.push(FileVariable { name, value });
    }

    Ok(entries)
}

fn parse_entry(name: &str, value: Value) -> Result<FileValue> {
    match value {
        Value::String(s) => Ok(FileValue::Static(s)),
        Value::Number(n) => Ok(FileValue::Static(n.to_string())),
        Value::Bool(b) => Ok(FileValue::Static(b.to_string())),
        Value::Mapping(m) => parse_command_entry(name, &m),
        other => Err(RulecastError::UserError(format!(
            "variable '{}' has unsupported value {:?}; \
             expected a scalar or a `type: command` mapping",
            name, other
        ))),
    }
}

fn parse_command_entry(name: &str, mapping: &serde_yaml::Mapping) -> Result<FileValue> {
    let entry_type = mapping
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RulecastError::UserError(format!(
                "variable '{}' is a mapping but has no `type` field",
                name
            ))
        })?;

    if entry_type != "command" {
        return Err(RulecastError::UserError(format!(
            "variable '{}' has unknown type '{}'; only 'command' is supported",
            name, entry_type
        )));
    }

    let command = mapping
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RulecastError::UserError(format!(
                "dynamic variable '{}' is missing a string `value` (the command to run)",
                name
            ))
        })?;

    let cache = match mapping.get("cache") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(RulecastError::UserError(format!(
                "dynamic variable '{}' has non-boolean `cache` field {:?}",
                name, other
            )));
        }
    };

    Ok(FileValue::Command {
        command: command.to_string(),
        cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn static_entries_parse_as_strings() {
        let entries = parse("AUTHOR: Jane\nCOUNT: 3\nFLAG: true\n").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "AUTHOR");
        assert_eq!(entries[0].value, FileValue::Static("Jane".to_string()));
        assert_eq!(entries[1].value, FileValue::Static("3".to_string()));
        assert_eq!(entries[2].value, FileValue::Static("true".to_string()));
    }

    #[test]
    fn declaration_order_is_preserved() {
        let entries = parse("ZEBRA: z\nALPHA: a\nMIDDLE: m\n").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ZEBRA", "ALPHA", "MIDDLE"]);
    }

    #[test]
    fn command_entries_parse_with_cache() {
        let yaml = "\
GIT_BRANCH:
  type: command
  value: \"git rev-parse --abbrev-ref HEAD\"
  cache: true
";
        let entries = parse(yaml).unwrap();
        assert_eq!(
            entries[0].value,
            FileValue::Command {
                command: "git rev-parse --abbrev-ref HEAD".to_string(),
                cache: true,
            }
        );
    }

    #[test]
    fn cache_defaults_to_false() {
        let yaml = "NOW:\n  type: command\n  value: date\n";
        let entries = parse(yaml).unwrap();
        assert_eq!(
            entries[0].value,
            FileValue::Command {
                command: "date".to_string(),
                cache: false,
            }
        );
    }

    #[test]
    fn unknown_type_is_an_error() {
        let yaml = "X:\n  type: script\n  value: foo\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("unknown type 'script'"));
    }

    #[test]
    fn missing_command_value_is_an_error() {
        let yaml = "X:\n  type: command\n  cache: true\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("missing a string `value`"));
    }

    #[test]
    fn list_values_are_rejected() {
        let err = parse("X:\n  - a\n  - b\n").unwrap_err();
        assert!(err.to_string().contains("unsupported value"));
    }

    #[test]
    fn empty_file_contributes_nothing() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let entries = load(temp.path().join("nope.yaml")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("variables.yaml");
        std::fs::write(&path, "NAME: value\n").unwrap();
        let entries = load(&path).unwrap();
        assert_eq!(entries[0].name, "NAME");
    }
}
