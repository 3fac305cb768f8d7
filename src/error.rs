//! Error types for the rulecast CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Subsystems with their own taxonomies (`exec::ExecError`,
//! `template::TemplateError`) convert into `RulecastError` at the command
//! layer so every failure maps to a stable exit code.

use crate::exec::ExecError;
use crate::exit_codes;
use crate::template::TemplateError;
use thiserror::Error;

/// Main error type for rulecast operations.
///
/// Each variant maps to a specific exit code. Strict-mode substitution
/// failures and command execution failures get their own codes so callers
/// can distinguish them from plain usage errors.
#[derive(Error, Debug)]
pub enum RulecastError {
    /// User provided invalid arguments, or an input file could not be read.
    #[error("{0}")]
    UserError(String),

    /// Strict substitution failed on an undefined variable reference.
    #[error("Substitution failed: {0}")]
    Substitution(#[from] TemplateError),

    /// A dynamic variable command could not be executed.
    #[error("Command execution failed: {0}")]
    Command(#[from] ExecError),

    /// Resolution of a specific dynamic variable failed hard.
    ///
    /// Used for failures that must abort resolution (the security gate);
    /// degradable failures become warnings instead.
    #[error("cannot evaluate dynamic variable '{name}': {source}")]
    DynamicVariable {
        /// The variable whose command could not run.
        name: String,
        /// The underlying execution error.
        source: ExecError,
    },
}

impl RulecastError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RulecastError::UserError(_) => exit_codes::USER_ERROR,
            RulecastError::Substitution(_) => exit_codes::SUBSTITUTION_FAILURE,
            RulecastError::Command(_) => exit_codes::COMMAND_FAILURE,
            RulecastError::DynamicVariable { .. } => exit_codes::COMMAND_FAILURE,
        }
    }
}

/// Result type alias for rulecast operations.
pub type Result<T> = std::result::Result<T, RulecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = RulecastError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn substitution_error_has_correct_exit_code() {
        let err = RulecastError::Substitution(TemplateError::UndefinedVariable {
            name: "PROJECT_NAME".to_string(),
            position: 0,
        });
        assert_eq!(err.exit_code(), exit_codes::SUBSTITUTION_FAILURE);
    }

    #[test]
    fn command_error_has_correct_exit_code() {
        let err = RulecastError::Command(ExecError::Disabled {
            command: "git status".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::COMMAND_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = RulecastError::UserError("failed to read template 'x.md'".to_string());
        assert_eq!(err.to_string(), "failed to read template 'x.md'");

        let err = RulecastError::Substitution(TemplateError::UndefinedVariable {
            name: "MISSING".to_string(),
            position: 12,
        });
        assert!(err.to_string().contains("MISSING"));
    }
}
