//! Variable resolution subsystem.
//!
//! Variables come from four layers, merged with fixed precedence (highest
//! first): CLI overrides, the local variable file (static and dynamic
//! entries), inline configuration variables, and built-ins. The resolver
//! produces one immutable name-to-value set per CLI invocation; substitution
//! and reconciliation consume it as an opaque map.

pub mod builtin;
pub mod dynamic;
pub mod file;
pub mod resolver;

pub use builtin::builtin_variables;
pub use dynamic::DynamicVariable;
pub use file::{FileValue, FileVariable};
pub use resolver::{ResolveOptions, ResolvedVariables, VariableSource, resolve};
