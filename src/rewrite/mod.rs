//! Region-aware rewriting of Kramdoc AsciiDoc into Antora AsciiDoc.
//!
//! A [`Rewriter`] is built once from a [`ConvertConfig`] and applied to each
//! document in turn. It runs the built-in [`PIPELINE`] and then the
//! configured overrides, and reports how many times each rule matched.

pub mod overrides;
pub mod prose;
pub mod regions;
pub mod rules;
pub mod subst;

pub use overrides::CompiledOverride;
pub use prose::{prose_pass, ProseCounts, ProseOptions};
pub use regions::CodeRegions;
pub use rules::{RuleId, Scope, PIPELINE};

use crate::config::{ConfigError, ConvertConfig};
use crate::document::{DocPath, Document};
use regex::{Captures, NoExpand};
use rules::*;
use serde::Serialize;
use subst::{replace_literal, subn, subn_fixpoint, subn_limited};

/// Upper bound on passes for fixpoint-scoped rules.
pub const FIXPOINT_CAP: usize = 64;

/// Match count for one rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub label: String,
    pub count: usize,
}

/// Per-rule match counts, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchCounts {
    entries: Vec<RuleCount>,
}

impl MatchCounts {
    fn record(&mut self, label: &str, count: usize) {
        self.entries.push(RuleCount {
            label: label.to_string(),
            count,
        });
    }

    /// Sum of counts recorded under `label`.
    pub fn get(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.label == label)
            .map(|entry| entry.count)
            .sum()
    }

    pub fn of(&self, rule: RuleId) -> usize {
        self.get(rule.label())
    }

    pub fn entries(&self) -> &[RuleCount] {
        &self.entries
    }

    pub fn nonzero(&self) -> impl Iterator<Item = &RuleCount> {
        self.entries.iter().filter(|entry| entry.count > 0)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

/// Result of rewriting one document.
#[derive(Debug, Clone)]
#[must_use = "RewriteOutcome carries the rewritten text"]
pub struct RewriteOutcome {
    pub text: String,
    pub counts: MatchCounts,
}

/// The ordered rule pipeline, configured for one conversion run.
#[derive(Debug, Clone)]
pub struct Rewriter {
    banner_block: String,
    translated: Vec<String>,
    toclevel_pages: Vec<String>,
    compat_caption: String,
    exempt_documents: Vec<String>,
    overrides: Vec<CompiledOverride>,
}

impl Rewriter {
    pub fn new(config: &ConvertConfig) -> Result<Self, ConfigError> {
        let overrides = config
            .overrides
            .iter()
            .map(CompiledOverride::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            banner_block: format!("[NOTE]\n====\n{}\n====\n", config.banner.text),
            translated: config.banner.translated.clone(),
            toclevel_pages: config.toclevel_pages.clone(),
            compat_caption: config.rewrite.compat_caption.clone(),
            exempt_documents: config.rewrite.exempt_documents.clone(),
            overrides,
        })
    }

    /// Rewrite one document. Never fails: a rule that does not match counts zero.
    pub fn rewrite(&self, doc: &Document) -> RewriteOutcome {
        let mut text = doc.text.clone();
        let mut counts = MatchCounts::default();
        let exempt = doc.path.matches_any(&self.exempt_documents);

        let same_prose_pass =
            |a: &RuleId, b: &RuleId| a.scope() == Scope::ProseLines && b.scope() == Scope::ProseLines;

        for group in PIPELINE.chunk_by(same_prose_pass) {
            if group[0].scope() == Scope::ProseLines {
                let options = ProseOptions {
                    list_spacing: group.contains(&RuleId::AdmonitionListSpacing) && !exempt,
                    math: group.contains(&RuleId::MathSpan),
                };
                let (next, prose_counts) = prose_pass(&text, options);
                text = next;
                for rule in group {
                    let count = match rule {
                        RuleId::AdmonitionListSpacing => prose_counts.list_spacing,
                        RuleId::MathSpan => prose_counts.math,
                        _ => 0,
                    };
                    counts.record(rule.label(), count);
                }
                continue;
            }

            for &rule in group {
                let (next, count) = self.apply_rule(rule, &doc.path, &text, exempt);
                text = next;
                counts.record(rule.label(), count);
            }
        }

        for item in self.overrides.iter().filter(|item| item.applies_to(&doc.path)) {
            let (next, count) = item.apply(&text);
            text = next;
            counts.record(item.label(), count);
        }

        for entry in counts.nonzero() {
            tracing::info!("... {}: {}", entry.label, entry.count);
        }

        RewriteOutcome { text, counts }
    }

    fn apply_rule(&self, rule: RuleId, path: &DocPath, text: &str, exempt: bool) -> (String, usize) {
        match rule {
            RuleId::DoctypeHeader => subn(&DOCTYPE_HEADER_RE, text, NoExpand("")),
            RuleId::PpHeader => subn(&PP_HEADER_RE, text, NoExpand("")),
            RuleId::StemHeader => subn(&STEM_HEADER_RE, text, NoExpand("")),
            RuleId::DuplicateAnchor => subn(&DUPLICATE_ANCHOR_RE, text, NoExpand("")),
            RuleId::HeadingAboveAnchor => subn(&HEADING_ABOVE_ANCHOR_RE, text, "${2}\n\n${1}"),
            RuleId::TranslationBanner => self.insert_banner(path, text),
            RuleId::DocstringHeader => subn(&DOCSTRING_HEADER_RE, text, "[id=\"${1}\"]\n=== *"),
            RuleId::DocstringHeaderDot => subn(&DOCSTRING_HEADER_DOT_RE, text, "— _${1}_"),
            RuleId::LinkToXref => subn(&LINK_TO_XREF_RE, text, "xref:./${1}.adoc"),
            RuleId::XrefParentCollapse => subn(&XREF_PARENT_RE, text, NoExpand("xref:")),
            RuleId::CompatBlock => subn(&COMPAT_BLOCK_RE, text, |caps: &Captures<'_>| {
                format!(
                    "[IMPORTANT]\n.{}{}\n====\n{}\n====\n",
                    self.compat_caption, &caps[1], &caps[2]
                )
            }),
            RuleId::NoteBlock => subn(&NOTE_BLOCK_RE, text, "[NOTE]\n====\n${1}\n====\n"),
            RuleId::WarningBlock => subn(&WARNING_BLOCK_RE, text, "[WARNING]\n====\n${1}\n====\n"),
            RuleId::TipBlock => subn(&TIP_BLOCK_RE, text, "[TIP]\n====\n${1}\n====\n"),
            RuleId::SidebarBlock => {
                subn(&SIDEBAR_BLOCK_RE, text, "[NOTE]\n.${1}\n====\n${2}\n====\n")
            }
            RuleId::FourDotContinuation => {
                subn_fixpoint(&FOUR_DOT_RE, text, FOUR_DOT_TEMPLATE, FIXPOINT_CAP)
            }
            RuleId::TocLevels => self.restrict_toclevels(path, text),
            RuleId::SingleQuoteAnchor => subn(
                &SINGLE_QUOTE_ANCHOR_RE,
                text,
                "+++<a id=\"${1}\">++++++</a>+++",
            ),
            RuleId::UnderscoreInBackticks => {
                subn(&UNDERSCORE_IN_BACKTICKS_RE, text, "${1}+++${2}+++${3}")
            }
            RuleId::UnderscoreInXref => subn(&UNDERSCORE_IN_XREF_RE, text, "${1}+++${2}+++"),
            RuleId::NbspDash => replace_literal(text, "&nbsp;-- ", "&nbsp;— "),
            RuleId::EscapedBracket => unescape_brackets(text),
            RuleId::ExternalLink if exempt => (text.to_string(), 0),
            RuleId::ExternalLink => subn(&EXTERNAL_LINK_RE, text, "${2}[${1}]"),
            // Handled by the prose pass in `rewrite`.
            RuleId::AdmonitionListSpacing | RuleId::MathSpan => (text.to_string(), 0),
        }
    }

    fn insert_banner(&self, path: &DocPath, text: &str) -> (String, usize) {
        if path.matches_any(&self.translated) || text.contains(&self.banner_block) {
            return (text.to_string(), 0);
        }
        subn_limited(&FIRST_HEADING_RE, text, 1, |caps: &Captures<'_>| {
            format!("{}\n{}", &caps[1], self.banner_block)
        })
    }

    fn restrict_toclevels(&self, path: &DocPath, text: &str) -> (String, usize) {
        if !path.matches_any(&self.toclevel_pages) || text.contains(TOCLEVELS_ATTRIBUTE) {
            return (text.to_string(), 0);
        }
        subn_limited(&FIRST_HEADING_RE, text, 1, |caps: &Captures<'_>| {
            format!("{}{}\n", &caps[1], TOCLEVELS_ATTRIBUTE)
        })
    }
}

/// Turn `\]` into `]` unless the escape guards an xref target.
fn unescape_brackets(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for m in ESCAPED_BRACKET_RE.find_iter(text) {
        if text[m.end()..].starts_with(XREF_BRACKET_GUARD) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push(']');
        last = m.end();
        count += 1;
    }
    out.push_str(&text[last..]);

    (out, count)
}
