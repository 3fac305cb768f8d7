//! Four-layer variable resolution with fixed precedence.
//!
//! Layers, lowest precedence first: built-ins, inline configuration
//! variables, the local variable file (static and dynamic entries), CLI
//! overrides. A name defined at a higher layer fully replaces the lower
//! value.
//!
//! # Failure policy
//!
//! The security gate is loud: a dynamic variable hitting a closed gate
//! aborts resolution, naming the variable. Every other command failure
//! (timeout, missing executable, non-zero exit) degrades that one variable
//! to omitted with a warning and never aborts the rest.

use crate::error::{Result, RulecastError};
use crate::exec::{CommandExecutor, DEFAULT_TIMEOUT_SECS, ExecError};
use crate::vars::builtin::builtin_variables;
use crate::vars::dynamic::DynamicVariable;
use crate::vars::file::{self, FileValue};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSource {
    /// Clock/git/project built-in.
    Builtin,
    /// Static entry in the local variable file.
    FileStatic,
    /// Dynamic (command) entry in the local variable file.
    FileDynamic,
    /// Inline variable from the project configuration.
    Inline,
    /// `-V NAME=VALUE` override on the command line.
    Cli,
}

impl std::fmt::Display for VariableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableSource::Builtin => write!(f, "builtin"),
            VariableSource::FileStatic => write!(f, "file"),
            VariableSource::FileDynamic => write!(f, "file (command)"),
            VariableSource::Inline => write!(f, "inline"),
            VariableSource::Cli => write!(f, "cli"),
        }
    }
}

/// Options controlling a resolution pass.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// The security gate for dynamic variables (from the project config).
    pub allow_commands: bool,
    /// Whether the built-in layer participates.
    pub include_builtins: bool,
    /// Timeout for dynamic variable commands.
    pub command_timeout: Duration,
    /// Location of the local variable file; `None` skips the layer.
    pub variables_path: Option<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            allow_commands: false,
            include_builtins: true,
            command_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            variables_path: None,
        }
    }
}

/// The effective name-to-value mapping for one CLI invocation.
///
/// Ordered by name. Immutable once handed to substitution or
/// reconciliation; discarded at process exit.
#[derive(Debug, Clone, Default)]
pub struct ResolvedVariables {
    entries: BTreeMap<String, (String, VariableSource)>,
    /// Non-fatal diagnostics collected during resolution.
    pub warnings: Vec<String>,
}

impl ResolvedVariables {
    /// Look up a variable's value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|(value, _)| value.as_str())
    }

    /// Look up the layer a variable came from.
    pub fn source(&self, name: &str) -> Option<VariableSource> {
        self.entries.get(name).map(|(_, source)| *source)
    }

    /// Iterate `(name, value, source)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, VariableSource)> {
        self.entries
            .iter()
            .map(|(name, (value, source))| (name.as_str(), value.as_str(), *source))
    }

    /// The plain name-to-value map, for substitution and reconciliation.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, (value, _))| (name.clone(), value.clone()))
            .collect()
    }

    /// Number of resolved variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, value: String, source: VariableSource) {
        self.entries.insert(name, (value, source));
    }
}

/// Resolve the effective variable set for a project.
///
/// # Arguments
///
/// * `root` - the project root (consumed by built-ins)
/// * `inline` - variables from the project configuration
/// * `cli_overrides` - `-V NAME=VALUE` pairs, highest precedence
/// * `opts` - gate, timeout, and layer selection
///
/// # Errors
///
/// * [`RulecastError::DynamicVariable`] - a dynamic entry hit the closed
///   security gate
/// * [`RulecastError::UserError`] - the variable file exists but is invalid
pub fn resolve(
    root: &Path,
    inline: &BTreeMap<String, String>,
    cli_overrides: &BTreeMap<String, String>,
    opts: &ResolveOptions,
) -> Result<ResolvedVariables> {
    let mut resolved = ResolvedVariables::default();
    let naming = Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("naming convention pattern is valid");

    if opts.include_builtins {
        for (name, value) in builtin_variables(root) {
            resolved.insert(name, value, VariableSource::Builtin);
        }
    }

    for (name, value) in inline {
        warn_on_naming(&mut resolved.warnings, &naming, name, "inline");
        resolved.insert(name.clone(), value.clone(), VariableSource::Inline);
    }

    if let Some(path) = &opts.variables_path {
        resolve_file_layer(&mut resolved, &naming, path, cli_overrides, opts)?;
    }

    for (name, value) in cli_overrides {
        warn_on_naming(&mut resolved.warnings, &naming, name, "cli");
        resolved.insert(name.clone(), value.clone(), VariableSource::Cli);
    }

    Ok(resolved)
}

/// Apply the local variable file layer, evaluating dynamic entries in
/// declaration order.
fn resolve_file_layer(
    resolved: &mut ResolvedVariables,
    naming: &Regex,
    path: &Path,
    cli_overrides: &BTreeMap<String, String>,
    opts: &ResolveOptions,
) -> Result<()> {
    let entries = file::load(path)?;
    if entries.is_empty() {
        return Ok(());
    }

    let mut executor = CommandExecutor::with_timeout(opts.allow_commands, opts.command_timeout);

    for entry in entries {
        warn_on_naming(&mut resolved.warnings, naming, &entry.name, "file");

        match entry.value {
            FileValue::Static(value) => {
                resolved.insert(entry.name, value, VariableSource::FileStatic);
            }
            FileValue::Command { command, cache } => {
                // A CLI override shadows this name; don't run its command.
                if cli_overrides.contains_key(&entry.name) {
                    continue;
                }

                let mut dynamic = DynamicVariable::new(entry.name.clone(), command, cache);
                match dynamic.evaluate(&mut executor) {
                    Ok(value) => {
                        resolved.insert(entry.name, value, VariableSource::FileDynamic);
                    }
                    Err(err @ ExecError::Disabled { .. }) => {
                        return Err(RulecastError::DynamicVariable {
                            name: entry.name,
                            source: err,
                        });
                    }
                    Err(err) => {
                        resolved.warnings.push(format!(
                            "skipping dynamic variable '{}': {}",
                            entry.name, err
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}

fn warn_on_naming(warnings: &mut Vec<String>, naming: &Regex, name: &str, layer: &str) {
    if !naming.is_match(name) {
        warnings.push(format!(
            "{} variable '{}' does not follow the recommended UPPER_SNAKE_CASE naming",
            layer, name
        ));
    }
}
