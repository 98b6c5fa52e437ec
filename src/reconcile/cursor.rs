//! Binding assignment walk.
//!
//! Transitions:
//!
//! | state              | line                          | next               |
//! |--------------------|-------------------------------|--------------------|
//! | any                | `"""`                         | `AfterDelimiter`   |
//! | `AfterDelimiter`   | indented known leading line   | `AfterLeadingLine` |
//! | `AfterDelimiter`   | anything else                 | `InBody`           |
//! | `AfterLeadingLine` | anything                      | `InBody`           |
//! | `InBody`           | anything                      | `InBody`           |
//!
//! A compact block puts the binding line between the leading line and the
//! closing `"""`. Only that exact shape is resolved in `AfterLeadingLine`;
//! any other line there is docstring body and passes through.

use super::index::{AnnotationEntry, AnnotationIndex};
use super::marking::{is_blank, is_delimiter};
use super::report::{Diagnostics, MatchKind, ReviewLine, UnresolvedLine};
use super::INDENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CursorState {
    /// Inside a docstring body or between blocks
    InBody,
    /// The previous line was a `"""` delimiter
    AfterDelimiter,
    /// The previous line was a recognized leading line
    AfterLeadingLine,
}

pub(crate) struct Cursor<'a> {
    index: &'a AnnotationIndex,
    state: CursorState,
    expected: Option<&'a AnnotationEntry>,
    out: Vec<String>,
}

impl<'a> Cursor<'a> {
    pub fn new(index: &'a AnnotationIndex) -> Self {
        Self {
            index,
            state: CursorState::InBody,
            expected: None,
            out: Vec::new(),
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Consume one line, emitting it (or its replacement) to the output.
    ///
    /// `next` is the following line, if any.
    pub fn advance(&mut self, line: String, next: Option<&str>, diagnostics: &mut Diagnostics) {
        if is_delimiter(&line) {
            self.out.push(line);
            self.state = CursorState::AfterDelimiter;
            return;
        }

        let state = self.state;
        self.state = CursorState::InBody;

        match state {
            CursorState::InBody => self.out.push(line),
            CursorState::AfterDelimiter => self.after_delimiter(line, diagnostics),
            CursorState::AfterLeadingLine => {
                let closes_block = next.is_some_and(is_delimiter);
                if closes_block && !starts_indented(&line) && !is_blank(&line) {
                    if let Some((binding, typesig, kind)) = self.match_expected(&line) {
                        self.emit_binding(binding, typesig);
                        diagnostics.record_match(kind);
                        return;
                    }
                }
                self.out.push(line);
            }
        }
    }

    fn after_delimiter(&mut self, line: String, diagnostics: &mut Diagnostics) {
        let index = self.index;
        if let Some(entry) = line
            .strip_prefix(INDENT)
            .and_then(|rest| index.by_leading_line(rest))
        {
            self.expected = Some(entry);
            self.state = CursorState::AfterLeadingLine;
            self.out.push(line);
            return;
        }

        let line_no = self.out.len() + 1;
        if is_blank(&line) || starts_indented(&line) {
            diagnostics.review.push(ReviewLine {
                line: line_no,
                text: line.clone(),
            });
            self.out.push(line);
            return;
        }

        let trimmed = line.trim();
        let resolved = self.match_expected(&line).or_else(|| {
            index
                .typesig_for(trimmed)
                .map(|typesig| (trimmed.to_string(), typesig.to_string(), MatchKind::Exception))
        });

        match resolved {
            Some((binding, typesig, kind)) => {
                self.emit_binding(binding, typesig);
                diagnostics.record_match(kind);
            }
            None if index.is_leading_line(trimmed) => {
                diagnostics.review.push(ReviewLine {
                    line: line_no,
                    text: line.clone(),
                });
                self.out.push(line);
            }
            None => {
                tracing::info!("Binding not found for: {}", line);
                diagnostics.unresolved.push(UnresolvedLine {
                    line: line_no,
                    text: line.clone(),
                    suggestion: index.closest_binding(trimmed).map(str::to_string),
                });
                self.out.push(line);
            }
        }
    }

    /// Rules (i) and (ii): containment against the expected binding.
    fn match_expected(&self, line: &str) -> Option<(String, String, MatchKind)> {
        let entry = self.expected?;
        let kind = if line.contains(entry.binding.as_str()) {
            MatchKind::Normal
        } else if entry.binding.contains(line.trim()) {
            MatchKind::Reverse
        } else {
            return None;
        };
        Some((entry.binding.clone(), entry.typesig.clone(), kind))
    }

    fn emit_binding(&mut self, binding: String, typesig: String) {
        self.out.push(format!("@binding: {binding}"));
        self.out.push(format!("@typesig: {typesig}"));
    }

    pub fn finish(self) -> Vec<String> {
        self.out
    }
}

fn starts_indented(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> AnnotationIndex {
        AnnotationIndex::parse(concat!(
            "\"\"\"\n    Do the thing\n\"\"\"\n@binding: Mod.func\n@typesig: func(x)\n",
            "\"\"\"\n    Other thing\n\"\"\"\n@binding: Mod.other\n@typesig: other()\n",
        ))
    }

    fn walk(index: &AnnotationIndex, lines: &[&str]) -> (Vec<String>, Diagnostics) {
        let mut diagnostics = Diagnostics::default();
        let mut cursor = Cursor::new(index);
        for (idx, line) in lines.iter().enumerate() {
            cursor.advance(line.to_string(), lines.get(idx + 1).copied(), &mut diagnostics);
        }
        (cursor.finish(), diagnostics)
    }

    #[test]
    fn test_state_transitions() {
        let index = index();
        let mut diagnostics = Diagnostics::default();
        let mut cursor = Cursor::new(&index);
        assert_eq!(cursor.state(), CursorState::InBody);
        cursor.advance("\"\"\"".to_string(), None, &mut diagnostics);
        assert_eq!(cursor.state(), CursorState::AfterDelimiter);
        cursor.advance("    Do the thing".to_string(), None, &mut diagnostics);
        assert_eq!(cursor.state(), CursorState::AfterLeadingLine);
        cursor.advance("    body".to_string(), None, &mut diagnostics);
        assert_eq!(cursor.state(), CursorState::InBody);
    }

    #[test]
    fn test_binding_after_closing_delimiter() {
        let (out, diagnostics) = walk(
            &index(),
            &["\"\"\"", "    Do the thing", "    body", "\"\"\"", "Mod.func(x)"],
        );
        assert_eq!(out[4], "@binding: Mod.func");
        assert_eq!(out[5], "@typesig: func(x)");
        assert_eq!(diagnostics.normal, 1);
    }

    #[test]
    fn test_compact_block_binding() {
        let (out, diagnostics) =
            walk(&index(), &["\"\"\"", "    Do the thing", "Mod.func", "\"\"\""]);
        assert_eq!(
            out,
            vec![
                "\"\"\"",
                "    Do the thing",
                "@binding: Mod.func",
                "@typesig: func(x)",
                "\"\"\"",
            ]
        );
        assert_eq!(diagnostics.normal, 1);
    }

    #[test]
    fn test_unindented_body_line_after_leading_line_kept() {
        let (out, diagnostics) = walk(
            &index(),
            &["\"\"\"", "    Do the thing", "func", "    more", "\"\"\"", "Mod.func"],
        );
        assert_eq!(
            out,
            vec![
                "\"\"\"",
                "    Do the thing",
                "func",
                "    more",
                "\"\"\"",
                "@binding: Mod.func",
                "@typesig: func(x)",
            ]
        );
        assert_eq!(diagnostics.normal, 1);
        assert_eq!(diagnostics.reverse, 0);
    }

    #[test]
    fn test_reverse_match() {
        let (out, diagnostics) = walk(
            &index(),
            &["\"\"\"", "    Do the thing", "    body", "\"\"\"", "func"],
        );
        assert_eq!(out[4], "@binding: Mod.func");
        assert_eq!(diagnostics.reverse, 1);
    }

    #[test]
    fn test_exception_lookup() {
        let (out, diagnostics) = walk(
            &index(),
            &["\"\"\"", "    Do the thing", "    body", "\"\"\"", "Mod.other"],
        );
        assert_eq!(out[4], "@binding: Mod.other");
        assert_eq!(out[5], "@typesig: other()");
        assert_eq!(diagnostics.exception, 1);
    }

    #[test]
    fn test_unresolved_line_kept() {
        let (out, diagnostics) = walk(
            &index(),
            &["\"\"\"", "    Do the thing", "    body", "\"\"\"", "Unrelated.name"],
        );
        assert_eq!(out[4], "Unrelated.name");
        assert_eq!(diagnostics.unresolved.len(), 1);
        assert_eq!(diagnostics.unresolved[0].line, 5);
        assert_eq!(diagnostics.unresolved[0].text, "Unrelated.name");
    }

    #[test]
    fn test_unindented_leading_line_flagged_for_review() {
        let (out, diagnostics) = walk(&index(), &["\"\"\"", "Other thing"]);
        assert_eq!(out[1], "Other thing");
        assert!(diagnostics.unresolved.is_empty());
        assert_eq!(diagnostics.review.len(), 1);
    }

    #[test]
    fn test_blank_and_unknown_indented_flagged() {
        let (_, diagnostics) = walk(&index(), &["\"\"\"", "", "\"\"\"", "    Not known"]);
        assert_eq!(diagnostics.review.len(), 2);
        assert_eq!(diagnostics.review[0].line, 2);
        assert_eq!(diagnostics.review[1].line, 4);
    }

    #[test]
    fn test_no_expectation_before_first_leading_line() {
        let (out, diagnostics) = walk(&index(), &["\"\"\"", "func"]);
        assert_eq!(out[1], "func");
        assert_eq!(diagnostics.unresolved.len(), 1);
    }
}
