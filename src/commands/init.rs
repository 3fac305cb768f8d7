//! The `init` command: scaffold project configuration files.
//!
//! Creates `rulecast.yaml` and a commented sample variable file under
//! `.rulecast/`. Existing files are never overwritten.

use super::Session;
use crate::error::{Result, RulecastError};
use std::fs;
use std::path::Path;

const SAMPLE_CONFIG: &str = "\
# rulecast project configuration.
#
# Inline variables are the lowest-precedence non-builtin layer; entries in
# .rulecast/variables.yaml and -V overrides replace them per name.
variables: {}

# Security gate for dynamic variables. Commands declared in
# .rulecast/variables.yaml only run when this is true.
allow_commands: false

# Timeout for each dynamic variable command, in seconds.
command_timeout_seconds: 5
";

const SAMPLE_VARIABLES: &str = "\
# Machine-local variables (keep this directory out of version control).
#
# Static entries are plain scalars:
#   AUTHOR: \"Jane Doe\"
#
# Dynamic entries run a shell command (requires allow_commands: true in
# rulecast.yaml):
#   GIT_BRANCH:
#     type: command
#     value: \"git rev-parse --abbrev-ref HEAD\"
#     cache: true
";

pub(super) fn cmd_init(session: &Session) -> Result<()> {
    let config_path = session.ctx.config_path();
    write_if_absent(&config_path, SAMPLE_CONFIG)?;

    let vars_path = session.ctx.variables_path();
    if let Some(parent) = vars_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RulecastError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    write_if_absent(&vars_path, SAMPLE_VARIABLES)?;

    println!("Initialized rulecast in {}", session.ctx.root.display());
    println!();
    println!("Next steps:");
    println!("  1. Add inline variables to {}", config_path.display());
    println!("  2. Add machine-local variables to {}", vars_path.display());
    println!("  3. Render a template: rulecast render <template>");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("Keeping existing {}", path.display());
        return Ok(());
    }

    fs::write(path, content).map_err(|e| {
        RulecastError::UserError(format!("failed to write '{}': {}", path.display(), e))
    })?;
    println!("Created {}", path.display());
    Ok(())
}
