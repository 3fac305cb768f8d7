//! Round-trip reconciliation: recover template placeholders from a
//! rendered, possibly hand-edited document.
//!
//! After a template is rendered and written out, a human or another tool
//! may edit the result. Sync needs a template that still parameterizes on
//! variables where the document matches the substituted values, and keeps
//! the edits verbatim everywhere else.
//!
//! # Approach
//!
//! The original template is parsed into literal and placeholder segments
//! (the same scanner substitution uses), then aligned against the rendered
//! document with a cursor:
//!
//! - A literal segment that matches at the cursor is consumed unchanged.
//!   When it does not match, the document is searched forward for the
//!   literal (then for its later line-start suffixes); the skipped region
//!   is an edit, kept verbatim. When no resync point exists the rest of
//!   the document is kept as concrete text.
//! - At a placeholder, the substituted value is matched at the cursor.
//!   Among all variable values matching there, the longest wins - this is
//!   what keeps a variable whose value is a prefix of another's from being
//!   restored over the longer token. A match becomes the placeholder
//!   again; a mismatch means the value was edited, and the rendered text
//!   is left for the next literal's resync to capture.
//!
//! Only locations that existed in the original template are candidates for
//! restoration; inserted content is never turned into a placeholder.
//! Failure to match is normal, not an error: the engine prefers leaving
//! concrete text (under-restoring) over guessing and destroying an edit.
//!
//! For any template T, document D, and variable map V, substituting the
//! reconciled template with V (leniently) reproduces D exactly - restored
//! placeholders stand only where their value matched, and every other byte
//! of D is carried through verbatim.

use crate::template::{Segment, parse_segments};
use std::collections::BTreeMap;

/// Suffix resync needles shorter than this are too ambiguous to act on.
const MIN_ANCHOR_LEN: usize = 8;

/// A byte range of the rendered document preserved verbatim because it did
/// not match the template structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreservedEdit {
    /// Start byte offset in the rendered document.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// The outcome of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The recovered template.
    pub template: String,
    /// Regions of the rendered document kept as concrete text.
    pub preserved_edits: Vec<PreservedEdit>,
}

/// Recover a template from a rendered document, keeping edits.
///
/// Convenience wrapper over [`reconcile`] returning only the template.
pub fn restore(
    original_template: &str,
    rendered_document: &str,
    variables: &BTreeMap<String, String>,
) -> String {
    reconcile(original_template, rendered_document, variables).template
}

/// Reconcile a rendered document against its original template.
pub fn reconcile(
    original_template: &str,
    rendered_document: &str,
    variables: &BTreeMap<String, String>,
) -> Reconciliation {
    let mut out = String::with_capacity(original_template.len());
    let mut edits = Vec::new();
    let mut cursor = 0usize;
    let doc = rendered_document;

    for segment in parse_segments(original_template) {
        match segment {
            Segment::Literal(lit) => {
                match align_literal(doc, cursor, &lit) {
                    Some(alignment) => {
                        if alignment.edit_end > cursor {
                            out.push_str(&doc[cursor..alignment.edit_end]);
                            edits.push(PreservedEdit {
                                start: cursor,
                                end: alignment.edit_end,
                            });
                        }
                        out.push_str(&lit[alignment.literal_skip..]);
                        cursor = alignment.resume;
                    }
                    None => {
                        // Alignment lost: keep the rest of the document as
                        // concrete text and stop restoring.
                        if cursor < doc.len() {
                            out.push_str(&doc[cursor..]);
                            edits.push(PreservedEdit {
                                start: cursor,
                                end: doc.len(),
                            });
                            cursor = doc.len();
                        }
                        break;
                    }
                }
            }
            Segment::Var { name, raw, .. } => {
                match match_variable(doc, cursor, &name, &raw, variables) {
                    Some((placeholder, consumed)) => {
                        out.push_str(&placeholder);
                        cursor += consumed;
                    }
                    None => {
                        // Value edited or deleted; the next literal's
                        // resync captures whatever stands here.
                    }
                }
            }
            Segment::Env { name, raw, .. } => {
                let expected = std::env::var(&name).ok();
                let expected = expected.as_deref().unwrap_or(&raw);
                if !expected.is_empty() && doc[cursor..].starts_with(expected) {
                    out.push_str(&raw);
                    cursor += expected.len();
                }
            }
        }
    }

    if cursor < doc.len() {
        out.push_str(&doc[cursor..]);
        edits.push(PreservedEdit {
            start: cursor,
            end: doc.len(),
        });
    }

    Reconciliation {
        template: out,
        preserved_edits: edits,
    }
}

/// Where a literal segment re-attached to the document.
struct LiteralAlignment {
    /// End of the edited region preceding the literal (equal to the cursor
    /// when nothing was skipped).
    edit_end: usize,
    /// Bytes of the literal's head superseded by the edit.
    literal_skip: usize,
    /// Cursor position after consuming the literal.
    resume: usize,
}

/// Align a literal segment at or after `cursor`.
///
/// Tries, in order: exact match at the cursor, the first occurrence of the
/// whole literal, then occurrences of the literal's later line-start
/// suffixes (covering edits inside the literal itself). Returns `None`
/// when no credible resync point exists.
fn align_literal(doc: &str, cursor: usize, lit: &str) -> Option<LiteralAlignment> {
    let rest = &doc[cursor..];

    if rest.starts_with(lit) {
        return Some(LiteralAlignment {
            edit_end: cursor,
            literal_skip: 0,
            resume: cursor + lit.len(),
        });
    }

    if let Some(d) = rest.find(lit) {
        return Some(LiteralAlignment {
            edit_end: cursor + d,
            literal_skip: 0,
            resume: cursor + d + lit.len(),
        });
    }

    // The literal itself may have been edited: resync on a later line of it.
    for ls in line_starts(lit).skip(1) {
        let suffix = &lit[ls..];
        if suffix.len() < MIN_ANCHOR_LEN {
            break;
        }
        if let Some(d) = rest.find(suffix) {
            return Some(LiteralAlignment {
                edit_end: cursor + d,
                literal_skip: ls,
                resume: cursor + d + suffix.len(),
            });
        }
    }

    None
}

/// Byte offsets of line starts in `text`, including 0.
fn line_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(
        text.bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i + 1)
            .filter(move |&i| i < text.len()),
    )
}

/// Match a placeholder's value at the cursor, applying the longest-match
/// tie-break across all variable values.
///
/// Returns the placeholder text to emit and the bytes consumed, or `None`
/// when the location no longer carries a recognizable value.
fn match_variable(
    doc: &str,
    cursor: usize,
    name: &str,
    raw: &str,
    variables: &BTreeMap<String, String>,
) -> Option<(String, usize)> {
    let rest = &doc[cursor..];
    let own = variables.get(name);

    // A template reference the resolver no longer knows: the render left
    // the raw placeholder in place, so an unchanged document still starts
    // with it.
    let Some(own_value) = own else {
        if rest.starts_with(raw) {
            return Some((raw.to_string(), raw.len()));
        }
        return None;
    };

    if own_value.is_empty() {
        // An empty value substitutes to nothing; restoring the placeholder
        // is always round-trip safe.
        return Some((raw.to_string(), 0));
    }

    // Gather every variable whose value matches here; longest wins so a
    // value that is a prefix of another's never steals the longer token.
    let mut best: Option<(&str, &str)> = None;
    for (cand_name, cand_value) in variables {
        if cand_value.is_empty() || !rest.starts_with(cand_value.as_str()) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, best_value)) => {
                cand_value.len() > best_value.len()
                    || (cand_value.len() == best_value.len() && cand_name == name)
            }
        };
        if better {
            best = Some((cand_name.as_str(), cand_value.as_str()));
        }
    }

    let (best_name, best_value) = best?;
    if best_name == name {
        Some((raw.to_string(), best_value.len()))
    } else {
        Some((format!("{{{{{{{}}}}}}}", best_name), best_value.len()))
    }
}
