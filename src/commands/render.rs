//! The `render` command: forward substitution of a template.

use super::{Session, parse_overrides, read_input, write_output};
use crate::cli::RenderArgs;
use crate::error::Result;
use crate::template;

pub(super) fn cmd_render(session: &Session, args: RenderArgs) -> Result<()> {
    let overrides = parse_overrides(&args.var)?;
    let resolved = session.resolve_variables(&overrides, !args.no_builtins)?;

    let text = read_input(&args.template)?;
    let variables = resolved.values();

    if args.lenient {
        for name in template::undefined_variables(&text, &variables) {
            eprintln!("Warning: leaving undefined variable '{}' in place", name);
        }
    }

    let rendered = template::substitute(&text, &variables, !args.lenient)?;
    write_output(args.out.as_deref(), &rendered.text)?;

    if let Some(out) = &args.out {
        eprintln!(
            "Rendered '{}' -> '{}' ({} variable reference(s))",
            args.template.display(),
            out.display(),
            rendered.referenced.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RenderArgs;
    use crate::config::Config;
    use crate::context::ProjectContext;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn session_in(temp: &TempDir) -> Session {
        Session {
            ctx: ProjectContext::resolve_from(temp.path()),
            config: Config::default(),
            vars_path: temp.path().join(".rulecast").join("variables.yaml"),
        }
    }

    fn render_args(template: PathBuf, out: Option<PathBuf>, lenient: bool) -> RenderArgs {
        RenderArgs {
            template,
            out,
            lenient,
            no_builtins: false,
            var: Vec::new(),
        }
    }

    #[test]
    fn renders_template_to_file() {
        let temp = TempDir::new().unwrap();
        let session = session_in(&temp);

        let template = temp.path().join("rules.md");
        std::fs::write(&template, "root is {{{PROJECT_ROOT}}}\n").unwrap();
        let out = temp.path().join("out.md");

        cmd_render(&session, render_args(template, Some(out.clone()), false)).unwrap();

        let rendered = std::fs::read_to_string(&out).unwrap();
        assert!(rendered.contains(&session.ctx.root.display().to_string()));
    }

    #[test]
    fn strict_render_fails_on_undefined() {
        let temp = TempDir::new().unwrap();
        let session = session_in(&temp);

        let template = temp.path().join("rules.md");
        std::fs::write(&template, "{{{NOT_DEFINED_ANYWHERE}}}\n").unwrap();

        let err = cmd_render(&session, render_args(template, None, false)).unwrap_err();
        assert!(err.to_string().contains("NOT_DEFINED_ANYWHERE"));
    }

    #[test]
    fn lenient_render_leaves_placeholder() {
        let temp = TempDir::new().unwrap();
        let session = session_in(&temp);

        let template = temp.path().join("rules.md");
        std::fs::write(&template, "{{{NOT_DEFINED_ANYWHERE}}}\n").unwrap();
        let out = temp.path().join("out.md");

        cmd_render(&session, render_args(template, Some(out.clone()), true)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "{{{NOT_DEFINED_ANYWHERE}}}\n"
        );
    }

    #[test]
    fn cli_override_reaches_the_output() {
        let temp = TempDir::new().unwrap();
        let session = session_in(&temp);

        let template = temp.path().join("rules.md");
        std::fs::write(&template, "year: {{{CURRENT_YEAR}}}\n").unwrap();
        let out = temp.path().join("out.md");

        let args = RenderArgs {
            template,
            out: Some(out.clone()),
            lenient: false,
            no_builtins: false,
            var: vec!["CURRENT_YEAR=1999".to_string()],
        };
        cmd_render(&session, args).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "year: 1999\n");
    }

    #[test]
    fn missing_template_is_a_user_error() {
        let temp = TempDir::new().unwrap();
        let session = session_in(&temp);
        let err = cmd_render(
            &session,
            render_args(temp.path().join("absent.md"), None, false),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
