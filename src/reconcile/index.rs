//! Annotation index built from a new-format reference document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static ANNOTATED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""""\n(\s{4})?(.*?)\n((?s:.*?))"""\n@binding:\s(.*?)\n@typesig:\s(.*?)\n"#,
    )
    .expect("annotated block pattern")
});

/// Below this similarity no binding is suggested for an unresolved line.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// One documented entry of the reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationEntry {
    /// First descriptive line, without its indentation
    pub leading_line: String,
    pub binding: String,
    pub typesig: String,
}

/// Two reference entries sharing a leading line. The later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub leading_line: String,
    pub replaced_binding: String,
    pub binding: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    entries: Vec<AnnotationEntry>,
    by_leading_line: HashMap<String, usize>,
    typesig_by_binding: HashMap<String, String>,
    collisions: Vec<Collision>,
}

impl AnnotationIndex {
    pub fn parse(reference: &str) -> Self {
        let mut index = Self::default();

        for caps in ANNOTATED_BLOCK_RE.captures_iter(reference) {
            index.insert(AnnotationEntry {
                leading_line: caps[2].to_string(),
                binding: caps[4].to_string(),
                typesig: caps[5].to_string(),
            });
        }

        index
    }

    fn insert(&mut self, entry: AnnotationEntry) {
        let position = self.entries.len();
        self.typesig_by_binding
            .insert(entry.binding.clone(), entry.typesig.clone());

        if let Some(previous) = self
            .by_leading_line
            .insert(entry.leading_line.clone(), position)
        {
            let replaced = &self.entries[previous];
            tracing::warn!(
                "Duplicate leading line {:?}: {} replaced by {}",
                entry.leading_line,
                replaced.binding,
                entry.binding
            );
            self.collisions.push(Collision {
                leading_line: entry.leading_line.clone(),
                replaced_binding: replaced.binding.clone(),
                binding: entry.binding.clone(),
            });
        }

        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All parsed entries, duplicates included, in document order.
    pub fn entries(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn by_leading_line(&self, leading_line: &str) -> Option<&AnnotationEntry> {
        self.by_leading_line
            .get(leading_line)
            .map(|&position| &self.entries[position])
    }

    pub fn is_leading_line(&self, text: &str) -> bool {
        self.by_leading_line.contains_key(text)
    }

    pub fn typesig_for(&self, binding: &str) -> Option<&str> {
        self.typesig_by_binding.get(binding).map(String::as_str)
    }

    /// Most similar known binding, if any is close enough to be useful.
    pub fn closest_binding(&self, text: &str) -> Option<&str> {
        self.typesig_by_binding
            .keys()
            .map(|binding| (strsim::normalized_levenshtein(text, binding), binding))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, binding)| binding.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = concat!(
        "\"\"\"\n",
        "    Do the thing\n",
        "\n",
        "    More text.\n",
        "\"\"\"\n",
        "@binding: Mod.func\n",
        "@typesig: func(x)\n",
        "\n",
        "\"\"\"\n",
        "Other entry\n",
        "\"\"\"\n",
        "@binding: Mod.other\n",
        "@typesig: other()\n",
    );

    #[test]
    fn test_parse_entries() {
        let index = AnnotationIndex::parse(REFERENCE);
        assert_eq!(index.len(), 2);

        let entry = index.by_leading_line("Do the thing").unwrap();
        assert_eq!(entry.binding, "Mod.func");
        assert_eq!(entry.typesig, "func(x)");

        // Leading line without indentation is accepted too.
        assert!(index.is_leading_line("Other entry"));
        assert_eq!(index.typesig_for("Mod.other"), Some("other()"));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn test_duplicate_leading_line_last_wins() {
        let reference = concat!(
            "\"\"\"\n    Same\n\"\"\"\n@binding: A.one\n@typesig: one()\n",
            "\"\"\"\n    Same\n\"\"\"\n@binding: A.two\n@typesig: two()\n",
        );
        let index = AnnotationIndex::parse(reference);
        assert_eq!(index.len(), 2);
        assert_eq!(index.by_leading_line("Same").unwrap().binding, "A.two");
        assert_eq!(index.typesig_for("A.one"), Some("one()"));
        assert_eq!(
            index.collisions(),
            &[Collision {
                leading_line: "Same".to_string(),
                replaced_binding: "A.one".to_string(),
                binding: "A.two".to_string(),
            }]
        );
    }

    #[test]
    fn test_block_without_annotations_ignored() {
        let index = AnnotationIndex::parse("\"\"\"\n    Lonely\n\"\"\"\nno binding here\n");
        assert!(index.is_empty());
    }

    #[test]
    fn test_closest_binding() {
        let index = AnnotationIndex::parse(REFERENCE);
        assert_eq!(index.closest_binding("Mod.funk"), Some("Mod.func"));
        assert_eq!(index.closest_binding("zzzzzzzzzzzzzzzz"), None);
    }
}
