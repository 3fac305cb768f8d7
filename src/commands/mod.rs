//! Command implementations for rulecast.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the session plumbing every command shares:
//! project context resolution, config loading, and override parsing.

mod init;
mod render;
mod sync;
mod vars_cmd;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{Result, RulecastError};
use crate::vars::{ResolveOptions, ResolvedVariables, resolve};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution.
pub fn dispatch(cli: Cli) -> Result<()> {
    let session = Session::open(cli.config, cli.vars_file)?;

    match cli.command {
        Command::Init => init::cmd_init(&session),
        Command::Render(args) => render::cmd_render(&session, args),
        Command::Sync(args) => sync::cmd_sync(&session, args),
        Command::Vars(args) => vars_cmd::cmd_vars(&session, args),
    }
}

/// Shared state for one CLI invocation: where the project is and how it is
/// configured.
pub(crate) struct Session {
    pub ctx: ProjectContext,
    pub config: Config,
    pub vars_path: PathBuf,
}

impl Session {
    fn open(config_override: Option<PathBuf>, vars_override: Option<PathBuf>) -> Result<Self> {
        let ctx = ProjectContext::resolve()?;
        let config_path = config_override.unwrap_or_else(|| ctx.config_path());
        let config = Config::load_or_default(&config_path)?;
        let vars_path = vars_override.unwrap_or_else(|| ctx.variables_path());

        Ok(Self {
            ctx,
            config,
            vars_path,
        })
    }

    /// Resolve the effective variable set for this invocation.
    pub fn resolve_variables(
        &self,
        cli_overrides: &BTreeMap<String, String>,
        include_builtins: bool,
    ) -> Result<ResolvedVariables> {
        let opts = ResolveOptions {
            allow_commands: self.config.allow_commands,
            include_builtins,
            command_timeout: self.config.command_timeout(),
            variables_path: Some(self.vars_path.clone()),
        };

        let resolved = resolve(&self.ctx.root, &self.config.variables, cli_overrides, &opts)?;
        print_warnings(&resolved);
        Ok(resolved)
    }
}

/// Parse `-V NAME=VALUE` override pairs.
pub(crate) fn parse_overrides(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut overrides = BTreeMap::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(RulecastError::UserError(format!(
                "invalid variable override '{}'\n\
                 Fix: use -V NAME=VALUE.",
                pair
            )));
        };
        if name.is_empty() {
            return Err(RulecastError::UserError(format!(
                "variable override '{}' has an empty name",
                pair
            )));
        }
        overrides.insert(name.to_string(), value.to_string());
    }
    Ok(overrides)
}

/// Read an input file with a user-actionable error.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        RulecastError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })
}

/// Write command output to a file, or stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RulecastError::UserError(format!(
                        "failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            std::fs::write(path, content).map_err(|e| {
                RulecastError::UserError(format!("failed to write '{}': {}", path.display(), e))
            })
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn print_warnings(resolved: &ResolvedVariables) {
    for warning in &resolved.warnings {
        eprintln!("Warning: {}", warning);
    }
}
