//! Config-driven, path-keyed substitutions applied after the built-in rules.

use super::subst::{replace_literal, subn};
use crate::config::{ConfigError, LiteralPair, Override, Substitution};
use crate::document::DocPath;
use regex::Regex;

#[derive(Debug, Clone)]
enum CompiledSubstitution {
    Regex { re: Regex, replacement: String },
    Literal(Vec<LiteralPair>),
}

/// An [`Override`] with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledOverride {
    label: String,
    documents: Vec<String>,
    substitution: CompiledSubstitution,
}

impl CompiledOverride {
    pub fn compile(item: &Override) -> Result<Self, ConfigError> {
        let substitution = match &item.substitution {
            Substitution::Regex {
                pattern,
                replacement,
            } => CompiledSubstitution::Regex {
                re: Regex::new(pattern).map_err(|source| ConfigError::InvalidOverride {
                    label: item.label.clone(),
                    source,
                })?,
                replacement: replacement.clone(),
            },
            Substitution::Literal { pairs } => CompiledSubstitution::Literal(pairs.clone()),
        };

        Ok(Self {
            label: item.label.clone(),
            documents: item.documents.clone(),
            substitution,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn applies_to(&self, path: &DocPath) -> bool {
        self.documents.is_empty() || path.matches_any(&self.documents)
    }

    /// Apply to `text`; literal pairs run in order and their counts add up.
    pub fn apply(&self, text: &str) -> (String, usize) {
        match &self.substitution {
            CompiledSubstitution::Regex { re, replacement } => {
                subn(re, text, replacement.as_str())
            }
            CompiledSubstitution::Literal(pairs) => {
                let mut current = text.to_string();
                let mut total = 0;
                for pair in pairs {
                    let (next, count) = replace_literal(&current, &pair.from, &pair.to);
                    current = next;
                    total += count;
                }
                (current, total)
            }
        }
    }
}
