//! Fenced code region detection.
//!
//! A region is the half-open range of line indices strictly between an
//! opening `----` fence and its closing fence. Regions are computed once per
//! prose pass and never recomputed, even when the pass inserts lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static FENCED_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n----\n((?s:.*?))----").expect("fenced block pattern"));

/// Ordered, non-overlapping line spans of fenced code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRegions {
    spans: Vec<Range<usize>>,
}

impl CodeRegions {
    pub fn detect(text: &str) -> Self {
        let mut spans = Vec::new();
        let mut newlines_seen = 0;
        let mut scanned_to = 0;

        for caps in FENCED_BLOCK_RE.captures_iter(text) {
            let Some(content) = caps.get(1) else {
                continue;
            };
            newlines_seen += count_newlines(&text[scanned_to..content.start()]);
            let begin = newlines_seen;
            newlines_seen += count_newlines(content.as_str());
            scanned_to = content.end();
            spans.push(begin..newlines_seen);
        }

        Self { spans }
    }

    /// True when line `index` lies inside a fenced block.
    pub fn contains(&self, index: usize) -> bool {
        // Spans are sorted by start; only the last span starting at or before
        // `index` can contain it.
        let after = self.spans.partition_point(|span| span.start <= index);
        after > 0 && self.spans[after - 1].contains(&index)
    }

    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
