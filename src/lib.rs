//! adoc-tidy: Kramdoc-to-Antora AsciiDoc rewriting and docstring reconciliation
//!
//! Two independent pipelines:
//!
//! - [`rewrite`] turns Kramdoc-produced AsciiDoc into Antora-ready AsciiDoc
//!   with an ordered list of pattern rules. Line-scoped rules skip fenced
//!   `----` code regions.
//! - [`reconcile`] rewrites old-format docstring binding lines in a translated
//!   document using the `@binding:`/`@typesig:` pairs of a new-format
//!   reference document.
//!
//! # Example
//!
//! ```no_run
//! use adoc_tidy::config::load_builtin;
//! use adoc_tidy::{DocPath, Document, Rewriter};
//!
//! let config = load_builtin()?;
//! let rewriter = Rewriter::new(&config)?;
//!
//! let doc = Document::new(DocPath::from_str_lossy("manual/faq.adoc"), "!!! note\n    Hi\n");
//! let outcome = rewriter.rewrite(&doc);
//! println!("{}", outcome.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod document;
pub mod logging;
pub mod reconcile;
pub mod rewrite;
pub mod tree;

pub use document::{DocPath, Document};
pub use reconcile::{
    reconcile, AnnotationIndex, Diagnostics, ReconcileError, ReconcileJob, ReconcileOptions,
    Reconciliation,
};
pub use rewrite::{MatchCounts, RewriteOutcome, Rewriter, RuleId, PIPELINE};
pub use tree::{atomic_write, ConversionPlan, TreeError};
