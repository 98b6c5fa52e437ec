use super::index::Collision;
use serde::Serialize;

/// How a binding line was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The expected binding occurs in the line
    Normal,
    /// The line occurs in the expected binding
    Reverse,
    /// The line is itself a known binding
    Exception,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedLine {
    /// 1-based line number in the converted output
    pub line: usize,
    pub text: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewLine {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderCounts {
    pub inserted: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Everything a reconcile run found, for logging and the JSON report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub reference_entries: usize,
    pub leading_lines_found: usize,
    pub placeholders: PlaceholderCounts,
    pub delimiters_before: usize,
    pub delimiters_after: usize,
    pub normal: usize,
    pub reverse: usize,
    pub exception: usize,
    pub unresolved: Vec<UnresolvedLine>,
    pub review: Vec<ReviewLine>,
    pub collisions: Vec<Collision>,
}

impl Diagnostics {
    pub(crate) fn record_match(&mut self, kind: MatchKind) {
        match kind {
            MatchKind::Normal => self.normal += 1,
            MatchKind::Reverse => self.reverse += 1,
            MatchKind::Exception => self.exception += 1,
        }
    }

    /// Bindings written; each one also gets a typesig line.
    pub fn bindings_added(&self) -> usize {
        self.normal + self.reverse + self.exception
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
            && self.review.is_empty()
            && self.placeholders.unresolved == 0
    }

    pub fn log_summary(&self) {
        tracing::info!("Entries in reference: {}", self.reference_entries);
        tracing::info!("Found first strings in target: {}", self.leading_lines_found);
        tracing::info!("Added @@PLACE: {}", self.placeholders.inserted);
        tracing::info!("Replaced @@PLACE: {}", self.placeholders.resolved);
        tracing::info!("Count check: {}", self.placeholders.unresolved);
        tracing::info!(
            "Count of \"\"\" before/after: {}/{}",
            self.delimiters_before,
            self.delimiters_after
        );
        tracing::info!("count_normal: {}", self.normal);
        tracing::info!("count_reverse: {}", self.reverse);
        tracing::info!("count_exception: {}", self.exception);
        tracing::info!("count_bad: {}", self.unresolved.len());
        for item in &self.review {
            tracing::info!("Also check line {}: {}", item.line, item.text);
        }
        tracing::info!("Binding added: {}", self.bindings_added());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_match_counts() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_match(MatchKind::Normal);
        diagnostics.record_match(MatchKind::Normal);
        diagnostics.record_match(MatchKind::Exception);
        assert_eq!(diagnostics.normal, 2);
        assert_eq!(diagnostics.exception, 1);
        assert_eq!(diagnostics.bindings_added(), 3);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_json_shape() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.unresolved.push(UnresolvedLine {
            line: 7,
            text: "Foo.bar".to_string(),
            suggestion: Some("Foo.baz".to_string()),
        });
        let value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(value["unresolved"][0]["line"], 7);
        assert_eq!(value["unresolved"][0]["suggestion"], "Foo.baz");
        assert_eq!(value["placeholders"]["inserted"], 0);
        assert!(!diagnostics.is_clean());
    }
}
