//! Dynamic variables: values computed by running a declared command.
//!
//! A dynamic variable pairs a shell command with a caching policy. The
//! cached value is an instance field scoped to one resolution pass; it is
//! never persisted and never shared across operations.

use crate::exec::{CommandExecutor, ExecError};

/// A variable whose value comes from executing a command.
#[derive(Debug)]
pub struct DynamicVariable {
    /// The variable name.
    pub name: String,
    /// The shell command that produces the value.
    pub command: String,
    /// When true, the command runs at most once per instance.
    pub cache: bool,
    cached: Option<String>,
}

impl DynamicVariable {
    /// Create a dynamic variable from its declaration.
    pub fn new(name: impl Into<String>, command: impl Into<String>, cache: bool) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            cache,
            cached: None,
        }
    }

    /// Evaluate the variable, delegating execution to `executor`.
    ///
    /// With `cache=true`, a prior value is returned without invoking the
    /// executor; with `cache=false`, every call runs the command again.
    /// Executor errors propagate unchanged - the resolver owns the policy
    /// for what a failed command means.
    pub fn evaluate(&mut self, executor: &mut CommandExecutor) -> Result<String, ExecError> {
        if self.cache
            && let Some(value) = &self.cached
        {
            return Ok(value.clone());
        }

        let value = executor.execute(&self.command)?;
        if self.cache {
            self.cached = Some(value.clone());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A command that appends a line to `marker` and prints the line count,
    /// making the number of executions observable.
    #[cfg(not(windows))]
    fn counting_command(dir: &TempDir) -> String {
        let marker = dir.path().join("count");
        format!(
            "echo run >> '{p}' && wc -l < '{p}' | tr -d ' '",
            p = marker.display()
        )
    }

    #[test]
    #[cfg(not(windows))]
    fn cached_variable_executes_exactly_once() {
        let temp = TempDir::new().unwrap();
        let mut executor = CommandExecutor::new(true);
        let mut var = DynamicVariable::new("COUNTER", counting_command(&temp), true);

        assert_eq!(var.evaluate(&mut executor).unwrap(), "1");
        assert_eq!(var.evaluate(&mut executor).unwrap(), "1");
        assert_eq!(var.evaluate(&mut executor).unwrap(), "1");
    }

    #[test]
    #[cfg(not(windows))]
    fn uncached_variable_executes_every_lookup() {
        let temp = TempDir::new().unwrap();
        let mut executor = CommandExecutor::new(true);
        let mut var = DynamicVariable::new("COUNTER", counting_command(&temp), false);

        assert_eq!(var.evaluate(&mut executor).unwrap(), "1");
        assert_eq!(var.evaluate(&mut executor).unwrap(), "2");
        assert_eq!(var.evaluate(&mut executor).unwrap(), "3");
    }

    #[test]
    fn disabled_gate_propagates_and_skips_the_cache() {
        let mut executor = CommandExecutor::new(false);
        let mut var = DynamicVariable::new("X", "echo hi", true);

        let err = var.evaluate(&mut executor).unwrap_err();
        assert!(matches!(err, ExecError::Disabled { .. }));

        // A failure must not poison the cache with a value.
        let err = var.evaluate(&mut executor).unwrap_err();
        assert!(matches!(err, ExecError::Disabled { .. }));
    }

    #[test]
    fn command_errors_propagate_unchanged() {
        let mut executor = CommandExecutor::new(true);
        #[cfg(not(windows))]
        let mut var = DynamicVariable::new("X", "sh -c 'exit 9'", false);
        #[cfg(windows)]
        let mut var = DynamicVariable::new("X", "cmd /c exit 9", false);

        match var.evaluate(&mut executor) {
            Err(ExecError::Failed { exit_code, .. }) => assert_eq!(exit_code, 9),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn fresh_instances_do_not_share_cache() {
        let mut executor = CommandExecutor::new(true);
        let mut a = DynamicVariable::new("A", "echo a", true);
        let mut b = DynamicVariable::new("B", "echo b", true);
        assert_eq!(a.evaluate(&mut executor).unwrap(), "a");
        assert_eq!(b.evaluate(&mut executor).unwrap(), "b");
    }
}
