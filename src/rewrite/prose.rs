//! Line-scoped rules that must not touch fenced code.
//!
//! Regions are detected once from the incoming text; every line is then
//! judged by its original index, so blank lines inserted by list spacing do
//! not shift later lines in or out of a region.

use super::regions::CodeRegions;
use super::rules::{LIST_ITEM_RE, MATH_SPAN_RE};
use super::subst::subn;

const ADMONITION_DELIMITER: &str = "====";
const MATH_TEMPLATE: &str = " stem:[${1}]";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProseOptions {
    pub list_spacing: bool,
    pub math: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProseCounts {
    pub list_spacing: usize,
    pub math: usize,
}

/// Run the enabled prose rules over every line outside a code region.
///
/// The result always ends with a line break: lines are re-joined with `\n`
/// and an empty last line is appended.
pub fn prose_pass(text: &str, options: ProseOptions) -> (String, ProseCounts) {
    let regions = CodeRegions::detect(text);
    let mut counts = ProseCounts::default();
    let mut out: Vec<String> = Vec::with_capacity(text.len() / 32 + 1);
    let mut in_admonition = false;

    for (idx, line) in text.lines().enumerate() {
        if regions.contains(idx) {
            out.push(line.to_string());
            continue;
        }

        if line.trim_end() == ADMONITION_DELIMITER {
            in_admonition = !in_admonition;
            out.push(line.to_string());
            continue;
        }

        if options.list_spacing && in_admonition && LIST_ITEM_RE.is_match(line) {
            let after_blank = out.last().map_or(true, |prev| prev.trim().is_empty());
            if !after_blank {
                out.push(String::new());
                counts.list_spacing += 1;
            }
        }

        if options.math {
            let (replaced, count) = subn(&MATH_SPAN_RE, line, MATH_TEMPLATE);
            counts.math += count;
            out.push(replaced);
        } else {
            out.push(line.to_string());
        }
    }

    out.push(String::new());
    (out.join("\n"), counts)
}
