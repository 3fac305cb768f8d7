//! The `sync` command: reverse reconciliation of an edited document.

use super::{Session, parse_overrides, read_input, write_output};
use crate::cli::SyncArgs;
use crate::error::Result;
use crate::reconcile;
use crate::template::{Segment, parse_segments};

pub(super) fn cmd_sync(session: &Session, args: SyncArgs) -> Result<()> {
    let overrides = parse_overrides(&args.var)?;
    let resolved = session.resolve_variables(&overrides, true)?;

    let original = read_input(&args.template)?;
    let document = read_input(&args.document)?;

    let result = reconcile::reconcile(&original, &document, &resolved.values());

    let out_path = if args.write {
        Some(args.template.as_path())
    } else {
        args.out.as_deref()
    };
    write_output(out_path, &result.template)?;

    eprintln!(
        "Restored {} placeholder(s); preserved {} edit region(s).",
        placeholder_count(&result.template),
        result.preserved_edits.len()
    );

    Ok(())
}

/// Number of placeholder occurrences in a template.
fn placeholder_count(template: &str) -> usize {
    parse_segments(template)
        .iter()
        .filter(|s| matches!(s, Segment::Var { .. } | Segment::Env { .. }))
        .count()
}
