//! CLI argument parsing for rulecast.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rulecast: render universal prompt configurations into editor-specific
/// files, and sync hand-edited files back into templates.
///
/// Variables come from four layers (highest precedence first): `-V`
/// overrides, the local variable file, inline config variables, built-ins.
/// Templates reference them as `{{{NAME}}}`; `${NAME}` reads the process
/// environment.
#[derive(Parser, Debug)]
#[command(name = "rulecast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project configuration file (default: rulecast.yaml at
    /// the project root).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the local variable file (default: .rulecast/variables.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub vars_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for rulecast.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold rulecast.yaml and a sample local variable file.
    ///
    /// Existing files are left untouched.
    Init,

    /// Render a template with the resolved variable set.
    ///
    /// Strict by default: an undefined variable reference fails the
    /// command. Use --lenient to leave unresolved placeholders in place.
    Render(RenderArgs),

    /// Reconcile an edited rendered document back into its template.
    ///
    /// Placeholders are restored where the document still carries the
    /// substituted value; edits are preserved verbatim.
    Sync(SyncArgs),

    /// Show the resolved variable set and its diagnostics.
    Vars(VarsArgs),
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Template file to render.
    pub template: PathBuf,

    /// Write the rendered output to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Leave undefined placeholders in place instead of failing.
    #[arg(long)]
    pub lenient: bool,

    /// Exclude the built-in variable layer.
    #[arg(long)]
    pub no_builtins: bool,

    /// Variable override, highest precedence (repeatable).
    #[arg(short = 'V', long = "var", value_name = "NAME=VALUE")]
    pub var: Vec<String>,
}

/// Arguments for the `sync` command.
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// The original template the document was rendered from.
    #[arg(long, value_name = "PATH")]
    pub template: PathBuf,

    /// The rendered (and possibly edited) document.
    #[arg(long, value_name = "PATH")]
    pub document: PathBuf,

    /// Write the reconciled template to this file instead of stdout.
    #[arg(short, long, value_name = "PATH", conflicts_with = "write")]
    pub out: Option<PathBuf>,

    /// Update the template file in place.
    #[arg(long)]
    pub write: bool,

    /// Variable override, highest precedence (repeatable).
    #[arg(short = 'V', long = "var", value_name = "NAME=VALUE")]
    pub var: Vec<String>,
}

/// Arguments for the `vars` command.
#[derive(Parser, Debug)]
pub struct VarsArgs {
    /// Emit the resolved set as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also report referenced and undefined variables for this template.
    #[arg(long, value_name = "PATH")]
    pub check: Option<PathBuf>,

    /// Exclude the built-in variable layer.
    #[arg(long)]
    pub no_builtins: bool,

    /// Variable override, highest precedence (repeatable).
    #[arg(short = 'V', long = "var", value_name = "NAME=VALUE")]
    pub var: Vec<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
