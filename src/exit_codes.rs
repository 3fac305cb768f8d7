//! Exit code constants for the rulecast CLI.
//!
//! - 0: Success (lenient-mode warnings still exit 0)
//! - 1: User error (bad args, unreadable files, invalid config)
//! - 2: Variable/substitution failure (strict mode)
//! - 3: Command execution failure (disabled gate, timeout, non-zero exit)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Substitution failure: undefined variable reference in strict mode.
pub const SUBSTITUTION_FAILURE: i32 = 2;

/// Command execution failure: security gate closed, timeout, missing
/// executable, or non-zero exit from a dynamic variable command.
pub const COMMAND_FAILURE: i32 = 3;
