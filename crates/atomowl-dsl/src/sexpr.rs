//! Indented S-expression rendering.
//!
//! Layout (one node per line, four spaces per nesting level, the closing
//! parenthesis glued to the last child):
//!
//! ```text
//! (SubsetLink
//!     (ConceptNode "GO:0008150")
//!     (ConceptNode "GO:0003674"))
//! ```
//!
//! Rendering is a pure function of the tree. Outgoing sets are printed in
//! construction order; nothing is sorted.

use crate::atom::{Atom, AtomView};
use std::io::{self, Write};

const INDENT: &str = "    ";

/// Separator between top-level statements (one blank line).
pub const STATEMENT_SEPARATOR: &str = "\n\n";

/// Escape a node name for use inside a double-quoted Scheme string.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}

/// Render one statement.
pub fn render(atom: &Atom) -> String {
    let mut out = String::new();
    render_view(&atom.view(), "", &mut out);
    out
}

fn render_view(view: &AtomView<'_>, indent: &str, out: &mut String) {
    match view {
        AtomView::Node(ty, name) => {
            out.push_str(indent);
            out.push('(');
            out.push_str(ty);
            out.push_str(" \"");
            out.push_str(&escape(name));
            out.push_str("\")");
        }
        AtomView::Link(ty, outgoing) => {
            out.push_str(indent);
            out.push('(');
            out.push_str(ty);
            let child_indent = format!("{indent}{INDENT}");
            for child in outgoing {
                out.push('\n');
                render_view(child, &child_indent, out);
            }
            out.push(')');
        }
    }
}

/// Render a statement list, blank-line separated, with a trailing newline.
pub fn render_statements(statements: &[Atom]) -> String {
    let mut out = statements
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Stream statements to `writer`.
///
/// Each statement is rendered completely before the single `write_all` that
/// emits it, so an interrupted run leaves the output cut at a statement
/// boundary. Returns the number of bytes written.
pub fn write_statements<W: Write>(writer: &mut W, statements: &[Atom]) -> io::Result<usize> {
    let mut written = 0usize;
    for (i, atom) in statements.iter().enumerate() {
        let mut chunk = String::new();
        if i > 0 {
            chunk.push_str(STATEMENT_SEPARATOR);
        }
        chunk.push_str(&render(atom));
        if i + 1 == statements.len() {
            chunk.push('\n');
        }
        writer.write_all(chunk.as_bytes())?;
        written += chunk.len();
    }
    writer.flush()?;
    Ok(written)
}

/// One JSON object per statement per line.
pub fn render_statements_json(statements: &[Atom]) -> serde_json::Result<String> {
    let mut out = String::new();
    for atom in statements {
        out.push_str(&serde_json::to_string(atom)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_subset_with_four_space_indent() {
        let atom = Atom::subset(Atom::concept("GO:0008150"), Atom::concept("GO:0003674"));
        assert_eq!(
            render(&atom),
            "(SubsetLink\n    (ConceptNode \"GO:0008150\")\n    (ConceptNode \"GO:0003674\"))"
        );
    }

    #[test]
    fn renders_satisfying_set_scope() {
        let atom = Atom::satisfying_set("$X", "part of", Atom::concept("UBERON:0000061"));
        let expected = "\
(SatisfyingSetScopeLink
    (VariableNode \"$X\")
    (EvaluationLink
        (PredicateNode \"part of\")
        (ListLink
            (VariableNode \"$X\")
            (ConceptNode \"UBERON:0000061\"))))";
        assert_eq!(render(&atom), expected);
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let atom = Atom::concept(r#"5' "cap" \ tail"#);
        assert_eq!(render(&atom), r#"(ConceptNode "5' \"cap\" \\ tail")"#);
    }

    #[test]
    fn statements_are_blank_line_separated() {
        let statements = vec![Atom::concept("A:1"), Atom::concept("B:2")];
        assert_eq!(
            render_statements(&statements),
            "(ConceptNode \"A:1\")\n\n(ConceptNode \"B:2\")\n"
        );
        assert_eq!(render_statements(&[]), "");
    }

    #[test]
    fn streamed_output_matches_rendered_output() {
        let statements = vec![
            Atom::has_name("GO:0008150", "biological process"),
            Atom::subset(Atom::concept("GO:0008150"), Atom::concept("GO:0003674")),
        ];
        let mut buf = Vec::new();
        let n = write_statements(&mut buf, &statements).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(String::from_utf8(buf).unwrap(), render_statements(&statements));
    }

    #[test]
    fn json_lines_have_one_statement_per_line() {
        let statements = vec![Atom::concept("A:1"), Atom::predicate("part of")];
        let text = render_statements_json(&statements).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("\"tag\":\"concept\""));
    }
}
