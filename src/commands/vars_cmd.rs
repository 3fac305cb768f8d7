//! The `vars` command: show the resolved variable set and diagnostics.

use super::{Session, parse_overrides, read_input};
use crate::cli::VarsArgs;
use crate::error::Result;
use crate::template;
use crate::vars::ResolvedVariables;
use serde_json::json;

pub(super) fn cmd_vars(session: &Session, args: VarsArgs) -> Result<()> {
    let overrides = parse_overrides(&args.var)?;
    let resolved = session.resolve_variables(&overrides, !args.no_builtins)?;

    if args.json {
        print_json(&resolved);
    } else {
        print_table(&resolved);
    }

    if let Some(template_path) = &args.check {
        let text = read_input(template_path)?;
        let referenced = template::extract_variables(&text);
        let undefined = template::undefined_variables(&text, &resolved.values());

        println!();
        println!("Template '{}':", template_path.display());
        println!(
            "  References: {}",
            if referenced.is_empty() {
                "(none)".to_string()
            } else {
                referenced.iter().cloned().collect::<Vec<_>>().join(", ")
            }
        );
        if undefined.is_empty() {
            println!("  Undefined:  (none)");
        } else {
            println!(
                "  Undefined:  {}",
                undefined.iter().cloned().collect::<Vec<_>>().join(", ")
            );
            eprintln!(
                "Warning: {} undefined variable(s); strict rendering will fail",
                undefined.len()
            );
        }
    }

    Ok(())
}

fn print_table(resolved: &ResolvedVariables) {
    if resolved.is_empty() {
        println!("No variables resolved.");
        return;
    }

    println!("Resolved variables ({}):", resolved.len());
    let width = resolved
        .iter()
        .map(|(name, _, _)| name.len())
        .max()
        .unwrap_or(0);
    for (name, value, source) in resolved.iter() {
        println!("  {:width$}  {}  [{}]", name, value, source, width = width);
    }
}

fn print_json(resolved: &ResolvedVariables) {
    let mut map = serde_json::Map::new();
    for (name, value, source) in resolved.iter() {
        map.insert(
            name.to_string(),
            json!({
                "value": value,
                "source": source.to_string(),
            }),
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(map))
            .expect("resolved variables serialize to JSON")
    );
}
