//! Annotation reconciliation between an old-format and a new-format document.
//!
//! The reference document carries, for every docstring, a leading line
//! followed by `@binding:` and `@typesig:` lines. The target document has the
//! same (translated) docstrings with old-style binding lines. Reconciliation
//! runs five steps in a fixed order, each consuming the previous step's
//! output:
//!
//! 1. [`AnnotationIndex::parse`] indexes the reference.
//! 2. Candidate leading lines in the target are tagged.
//! 3. Placeholder sections are opened where entries share a block.
//! 4. Placeholders are filled with the binding line that follows them.
//! 5. A [`cursor`] walk rewrites binding lines into `@binding:`/`@typesig:`.
//!
//! The converted document is always produced; anything that could not be
//! resolved is reported in [`Diagnostics`] instead.

mod cursor;
pub mod index;
mod marking;
pub mod report;

pub use index::{AnnotationEntry, AnnotationIndex, Collision};
pub use report::{Diagnostics, MatchKind, PlaceholderCounts, ReviewLine, UnresolvedLine};

use crate::config::ReconcileSettings;
use crate::document::normalize_line_endings;
use crate::tree::atomic_write;
use cursor::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub(crate) const DELIMITER: &str = "\"\"\"";
pub(crate) const INDENT: &str = "    ";
pub(crate) const PLACEHOLDER: &str = "@@PLACE";

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{role} document not found: {path}")]
    MissingInput { role: &'static str, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Leading lines too common to trust after a blank line
    pub generic_leading_lines: Vec<String>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::from(&ReconcileSettings::default())
    }
}

impl From<&ReconcileSettings> for ReconcileOptions {
    fn from(settings: &ReconcileSettings) -> Self {
        Self {
            generic_leading_lines: settings.generic_leading_lines.clone(),
        }
    }
}

#[derive(Debug, Clone)]
#[must_use = "Reconciliation carries the converted lines"]
pub struct Reconciliation {
    pub lines: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl Reconciliation {
    /// Converted document text, ending with a line break.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

pub fn reconcile(
    index: &AnnotationIndex,
    target: &str,
    options: &ReconcileOptions,
) -> Reconciliation {
    let mut diagnostics = Diagnostics {
        reference_entries: index.len(),
        delimiters_before: count_delimiters(target),
        collisions: index.collisions().to_vec(),
        ..Diagnostics::default()
    };

    let marked = marking::mark_leading_lines(target, index, &options.generic_leading_lines);
    diagnostics.leading_lines_found = marked
        .iter()
        .filter(|line| line.kind == marking::LineKind::Leading)
        .count();

    let (mut lines, _) = marking::insert_placeholders(marked);
    diagnostics.placeholders = marking::resolve_placeholders(&mut lines);

    let mut cursor = Cursor::new(index);
    let mut lines = lines.into_iter().peekable();
    while let Some(line) = lines.next() {
        let next = lines.peek().map(|next| next.text.as_str());
        cursor.advance(line.text, next, &mut diagnostics);
    }
    let lines = cursor.finish();

    diagnostics.delimiters_after = lines.iter().map(|line| count_delimiters(line)).sum();

    Reconciliation { lines, diagnostics }
}

fn count_delimiters(text: &str) -> usize {
    text.matches(DELIMITER).count()
}

/// Input and output locations for one reconcile run.
#[derive(Debug, Clone)]
pub struct ReconcileJob {
    pub reference: PathBuf,
    pub target: PathBuf,
    pub output: PathBuf,
}

impl ReconcileJob {
    /// Look `file_name` up in both directories; the result goes to
    /// `output_dir/<prefix><file_name>`.
    pub fn new(
        reference_dir: &Path,
        target_dir: &Path,
        file_name: &str,
        output_dir: &Path,
        prefix: &str,
    ) -> Self {
        Self {
            reference: reference_dir.join(file_name),
            target: target_dir.join(file_name),
            output: output_dir.join(format!("{prefix}{file_name}")),
        }
    }

    /// Read both documents, reconcile, and write the converted target.
    pub fn run(&self, options: &ReconcileOptions) -> Result<Reconciliation, ReconcileError> {
        let reference = read_input("reference", &self.reference)?;
        let target = read_input("target", &self.target)?;

        let index = AnnotationIndex::parse(&reference);
        tracing::info!("Reference: {}", self.reference.display());
        tracing::info!("Target: {}", self.target.display());

        let result = reconcile(&index, &target, options);
        atomic_write(&self.output, result.text().as_bytes()).map_err(|source| {
            ReconcileError::Write {
                path: self.output.clone(),
                source,
            }
        })?;
        tracing::info!("Result: {}", self.output.display());

        Ok(result)
    }
}

fn read_input(role: &'static str, path: &Path) -> Result<String, ReconcileError> {
    if !path.is_file() {
        return Err(ReconcileError::MissingInput {
            role,
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path)
        .map(normalize_line_endings)
        .map_err(|source| ReconcileError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REFERENCE: &str = concat!(
        "\"\"\"\n    Do the thing\n\n    Longer text.\n\"\"\"\n",
        "@binding: Mod.func\n@typesig: func(x)\n\n",
        "\"\"\"\n    Make another\n\"\"\"\n",
        "@binding: Mod.make\n@typesig: make(a, b)\n",
    );

    #[test]
    fn test_compact_round_trip() {
        let index = AnnotationIndex::parse(
            "\"\"\"\n    Do the thing\n\"\"\"\n@binding: Mod.func\n@typesig: func(x)\n",
        );
        let result = reconcile(
            &index,
            "\"\"\"\n    Do the thing\nMod.func\n\"\"\"",
            &ReconcileOptions::default(),
        );
        let text = result.text();
        assert!(text.contains("@binding: Mod.func\n@typesig: func(x)\n"));
        assert_eq!(result.diagnostics.bindings_added(), 1);
        assert!(result.diagnostics.unresolved.is_empty());
    }

    #[test]
    fn test_old_format_document() {
        let target = concat!(
            "\"\"\"\n    Сделать дело\n\"\"\"\n",
            "Mod.func(x)\n",
        );
        let reference = "\"\"\"\n    Сделать дело\n\"\"\"\n@binding: Mod.func\n@typesig: func(x)\n";
        let index = AnnotationIndex::parse(reference);
        let result = reconcile(&index, target, &ReconcileOptions::default());
        assert_eq!(
            result.lines,
            vec![
                "\"\"\"",
                "    Сделать дело",
                "\"\"\"",
                "@binding: Mod.func",
                "@typesig: func(x)",
            ]
        );
    }

    #[test]
    fn test_shared_block_is_split() {
        let index = AnnotationIndex::parse(REFERENCE);
        let target = concat!(
            "\"\"\"\n    Do the thing\n\n    Longer text.\n\n    Make another\n\"\"\"\n",
            "Mod.make\n",
        );
        let result = reconcile(&index, target, &ReconcileOptions::default());
        let diagnostics = &result.diagnostics;
        assert_eq!(diagnostics.leading_lines_found, 2);
        assert_eq!(diagnostics.placeholders.inserted, 1);
        assert_eq!(diagnostics.placeholders.resolved, 1);
        assert_eq!(diagnostics.delimiters_before, 2);
        assert_eq!(diagnostics.delimiters_after, 4);
        assert_eq!(diagnostics.exception, 1);
        assert_eq!(diagnostics.normal, 1);
        assert_eq!(result.text().matches("@binding: Mod.make").count(), 2);
        assert!(!result.text().contains(PLACEHOLDER));
    }

    #[test]
    fn test_unresolved_line_preserved() {
        let index = AnnotationIndex::parse(REFERENCE);
        let target = "\"\"\"\n    Do the thing\n    text\n\"\"\"\nSomething.else\n";
        let result = reconcile(&index, target, &ReconcileOptions::default());
        assert!(result.lines.iter().any(|line| line == "Something.else"));
        assert_eq!(result.diagnostics.unresolved.len(), 1);
        assert_eq!(result.diagnostics.bindings_added(), 0);
    }

    #[test]
    fn test_job_writes_prefixed_file() {
        let dir = TempDir::new().unwrap();
        let reference_dir = dir.path().join("new");
        let target_dir = dir.path().join("old");
        std::fs::create_dir_all(&reference_dir).unwrap();
        std::fs::create_dir_all(&target_dir).unwrap();
        std::fs::write(reference_dir.join("base.md"), REFERENCE).unwrap();
        std::fs::write(
            target_dir.join("base.md"),
            "\"\"\"\n    Do the thing\n\"\"\"\nMod.func\n",
        )
        .unwrap();

        let job = ReconcileJob::new(&reference_dir, &target_dir, "base.md", dir.path(), "converted_");
        let result = job.run(&ReconcileOptions::default()).unwrap();
        assert_eq!(result.diagnostics.normal, 1);

        let written = std::fs::read_to_string(dir.path().join("converted_base.md")).unwrap();
        assert!(written.ends_with("@binding: Mod.func\n@typesig: func(x)\n"));
    }

    #[test]
    fn test_missing_target_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("base.md"), REFERENCE).unwrap();
        let job = ReconcileJob::new(
            dir.path(),
            &dir.path().join("missing"),
            "base.md",
            dir.path(),
            "converted_",
        );
        assert!(matches!(
            job.run(&ReconcileOptions::default()),
            Err(ReconcileError::MissingInput { role: "target", .. })
        ));
    }
}
