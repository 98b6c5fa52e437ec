//! Leading-line tagging and placeholder handling.
//!
//! An old-format target often keeps several entries in one triple-quoted
//! section, separated only by a blank line. Each such break gets a
//! placeholder section, which is then filled with the binding line found
//! after the next closing delimiter.

use super::index::AnnotationIndex;
use super::report::PlaceholderCounts;
use super::{DELIMITER, INDENT, PLACEHOLDER};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Plain,
    /// Known leading line at a block start or after a blank line
    Leading,
    /// Synthetic slot waiting for a binding line
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarkedLine {
    pub text: String,
    pub kind: LineKind,
}

impl MarkedLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Plain,
        }
    }
}

pub(crate) fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Step 2: tag candidate leading lines.
pub(crate) fn mark_leading_lines(
    target: &str,
    index: &AnnotationIndex,
    generic: &[String],
) -> Vec<MarkedLine> {
    let mut marked = Vec::new();
    let mut prev: Option<&str> = None;

    for line in target.lines() {
        let leading = line.strip_prefix(INDENT).is_some_and(|rest| {
            index.is_leading_line(rest)
                && match prev {
                    Some(p) if is_delimiter(p) => true,
                    Some(p) if p.is_empty() => !generic.iter().any(|g| g == rest),
                    _ => false,
                }
        });

        marked.push(MarkedLine {
            text: line.to_string(),
            kind: if leading {
                LineKind::Leading
            } else {
                LineKind::Plain
            },
        });
        prev = Some(line);
    }

    marked
}

/// Step 3: open a placeholder section before every leading line that
/// follows a blank line. All tags except placeholders are dropped.
pub(crate) fn insert_placeholders(lines: Vec<MarkedLine>) -> (Vec<MarkedLine>, usize) {
    let mut out = Vec::with_capacity(lines.len());
    let mut inserted = 0;

    for line in lines {
        let after_blank = out.last().is_some_and(|prev: &MarkedLine| prev.text.is_empty());
        if line.kind == LineKind::Leading && after_blank {
            out.push(MarkedLine::plain(DELIMITER));
            out.push(MarkedLine {
                text: PLACEHOLDER.to_string(),
                kind: LineKind::Placeholder,
            });
            out.push(MarkedLine::plain(""));
            out.push(MarkedLine::plain(""));
            out.push(MarkedLine::plain(DELIMITER));
            inserted += 1;
        }
        out.push(MarkedLine::plain(line.text));
    }

    (out, inserted)
}

/// Step 4: fill every placeholder with the first binding-looking line that
/// follows a later delimiter. Placeholders with no such line keep their
/// marker text.
pub(crate) fn resolve_placeholders(lines: &mut [MarkedLine]) -> PlaceholderCounts {
    let mut worklist: VecDeque<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.kind == LineKind::Placeholder)
        .map(|(idx, _)| idx)
        .collect();
    let mut stats = PlaceholderCounts {
        inserted: worklist.len(),
        ..PlaceholderCounts::default()
    };
    let cap = worklist.len();

    for _ in 0..cap {
        let Some(idx) = worklist.pop_front() else {
            break;
        };
        match find_binding_line(lines, idx + 1) {
            Some(text) => {
                lines[idx] = MarkedLine::plain(text);
                stats.resolved += 1;
            }
            None => {
                lines[idx] = MarkedLine::plain(PLACEHOLDER);
                stats.unresolved += 1;
            }
        }
    }
    stats.unresolved += worklist.len();

    stats
}

fn find_binding_line(lines: &[MarkedLine], from: usize) -> Option<String> {
    lines.get(from..)?.windows(2).find_map(|pair| {
        let candidate = &pair[1];
        let binding_like = candidate.kind == LineKind::Plain
            && candidate
                .text
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && c != '@');
        (is_delimiter(&pair[0].text) && binding_like).then(|| candidate.text.clone())
    })
}
