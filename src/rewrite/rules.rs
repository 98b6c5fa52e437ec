//! The fixed rewrite pipeline.
//!
//! Later rules depend on the text shape left by earlier ones: links become
//! `xref:` before bracket unescaping and underscore escaping look at them,
//! admonition blocks exist before continuation parts are merged into them,
//! and code regions are detected at the start of the prose pass, before any
//! math is delimited. [`PIPELINE`] is therefore a slice, never a set.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// How much of the document a rule sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One pass over the whole document
    Document,
    /// Whole document, repeated until nothing matches (capped)
    Fixpoint,
    /// Line by line, skipping fenced code regions
    ProseLines,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Document => write!(f, "document"),
            Scope::Fixpoint => write!(f, "fixpoint"),
            Scope::ProseLines => write!(f, "prose lines"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    DoctypeHeader,
    PpHeader,
    StemHeader,
    DuplicateAnchor,
    HeadingAboveAnchor,
    TranslationBanner,
    DocstringHeader,
    DocstringHeaderDot,
    LinkToXref,
    XrefParentCollapse,
    CompatBlock,
    NoteBlock,
    WarningBlock,
    TipBlock,
    SidebarBlock,
    FourDotContinuation,
    AdmonitionListSpacing,
    MathSpan,
    TocLevels,
    SingleQuoteAnchor,
    UnderscoreInBackticks,
    UnderscoreInXref,
    NbspDash,
    EscapedBracket,
    ExternalLink,
}

/// Every built-in rule, in application order.
pub const PIPELINE: &[RuleId] = &[
    RuleId::DoctypeHeader,
    RuleId::PpHeader,
    RuleId::StemHeader,
    RuleId::DuplicateAnchor,
    RuleId::HeadingAboveAnchor,
    RuleId::TranslationBanner,
    RuleId::DocstringHeader,
    RuleId::DocstringHeaderDot,
    RuleId::LinkToXref,
    RuleId::XrefParentCollapse,
    RuleId::CompatBlock,
    RuleId::NoteBlock,
    RuleId::WarningBlock,
    RuleId::TipBlock,
    RuleId::SidebarBlock,
    RuleId::FourDotContinuation,
    RuleId::AdmonitionListSpacing,
    RuleId::MathSpan,
    RuleId::TocLevels,
    RuleId::SingleQuoteAnchor,
    RuleId::UnderscoreInBackticks,
    RuleId::UnderscoreInXref,
    RuleId::NbspDash,
    RuleId::EscapedBracket,
    RuleId::ExternalLink,
];

impl RuleId {
    /// Log label, as it appears in the run log.
    pub fn label(self) -> &'static str {
        match self {
            RuleId::DoctypeHeader => "Deleted :doctype: headers",
            RuleId::PpHeader => "Deleted :pp: headers",
            RuleId::StemHeader => "Deleted :stem: headers",
            RuleId::DuplicateAnchor => "Deleted \"-1\" anchors",
            RuleId::HeadingAboveAnchor => "Main headers moved up",
            RuleId::TranslationBanner => "Added header Translation in progress",
            RuleId::DocstringHeader => "Replaced docstring headers",
            RuleId::DocstringHeaderDot => "Deleted points in docstring headers",
            RuleId::LinkToXref => "Replaced links Part 1",
            RuleId::XrefParentCollapse => "Replaced links Part 2",
            RuleId::CompatBlock => "Replaced Compat blocks",
            RuleId::NoteBlock => "Replaced Note blocks",
            RuleId::WarningBlock => "Replaced Warning blocks",
            RuleId::TipBlock => "Replaced Tip blocks",
            RuleId::SidebarBlock => "Replaced sidebar blocks",
            RuleId::FourDotContinuation => "Added parts in four points to admonition blocks",
            RuleId::AdmonitionListSpacing => "Added extra line breaks in lists",
            RuleId::MathSpan => "Replaced Math blocks",
            RuleId::TocLevels => "Added page-toclevels",
            RuleId::SingleQuoteAnchor => "Replaced id with single quote",
            RuleId::UnderscoreInBackticks => "Adding \"+++\" to text in backticks",
            RuleId::UnderscoreInXref => "Adding \"+++\" to text in xref links",
            RuleId::NbspDash => "Replaced two hyphens",
            RuleId::EscapedBracket => "Replaced escaped closing square brackets '\\]'",
            RuleId::ExternalLink => "Replaced external Markdown links",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            RuleId::FourDotContinuation => Scope::Fixpoint,
            RuleId::AdmonitionListSpacing | RuleId::MathSpan => Scope::ProseLines,
            _ => Scope::Document,
        }
    }

    /// Position in [`PIPELINE`].
    pub fn position(self) -> usize {
        PIPELINE
            .iter()
            .position(|rule| *rule == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        pub(crate) static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($re).expect(concat!("built-in pattern ", stringify!($name))));
    };
}

pattern!(DOCTYPE_HEADER_RE, r":doctype: book\n\n?");
pattern!(PP_HEADER_RE, r":pp:\s\{plus\}\{plus\}\n\n?");
pattern!(STEM_HEADER_RE, r":stem: latexmath\n\n?");
pattern!(DUPLICATE_ANCHOR_RE, r#"\+{3}.*?-1">\+{6}</a>\+{3}\n\n?"#);
pattern!(HEADING_ABOVE_ANCHOR_RE, r"(\+{3}<a.*?a>\+{3})\n{1,3}(=[ \t].*)");
pattern!(FIRST_HEADING_RE, r"(?m)^(=[ \t]\S.*\n)");
pattern!(DOCSTRING_HEADER_RE, r"<<(.{1,200}),#>>\n\*");
pattern!(DOCSTRING_HEADER_DOT_RE, r"&mdash;\s_(.{1,50}?)_\.");
pattern!(LINK_TO_XREF_RE, r"link:(.{1,200}?)\.md");
pattern!(XREF_PARENT_RE, r"xref:\./\.\./");
pattern!(COMPAT_BLOCK_RE, r#"!!! compat "(.{1,100}?)"\n\s{4}(.+?)\n"#);
pattern!(NOTE_BLOCK_RE, r"!!! note\n\s{4,5}(.+?)\n");
pattern!(WARNING_BLOCK_RE, r"!!! warning\n\s{4,5}(.+?)\n");
pattern!(TIP_BLOCK_RE, r"!!! tip\n\s{4,5}(.+?)\n");
pattern!(SIDEBAR_BLOCK_RE, r#"!!! sidebar "(.+?)"\n\s{4}(.+?)\n"#);
pattern!(FOUR_DOT_RE, r"====\n\+?\n\.{4}\n((?s:.+?))\.{4}");
pattern!(LIST_ITEM_RE, r"^[^\S\r\n]{2}\*[^\S\r\n]");
pattern!(MATH_SPAN_RE, r"[^\S\r\n]\$([^$`\r\n]{1,100}?)\$");
pattern!(SINGLE_QUOTE_ANCHOR_RE, r"<a id='(.+'.+?)'></a>");
pattern!(UNDERSCORE_IN_BACKTICKS_RE, r"(`\S*?)(__\S+__)(\S*?`)");
pattern!(UNDERSCORE_IN_XREF_RE, r"(xref:\S+?)(__\S+?__)");
pattern!(ESCAPED_BRACKET_RE, r"\\\]");
pattern!(EXTERNAL_LINK_RE, r"\[([^\n\r]+?)\]\((http[^\n\r]+?)\)");

pub(crate) const FOUR_DOT_TEMPLATE: &str = "\n${1}\n====\n";
pub(crate) const TOCLEVELS_ATTRIBUTE: &str = ":page-toclevels: 1";
/// Sequence after `\]` that marks an xref target, where the escape must stay.
pub(crate) const XREF_BRACKET_GUARD: &str = ")`";
