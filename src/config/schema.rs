use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Top-level configuration for both the convert run and the reconciler.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    #[serde(default)]
    pub convert: ConvertSettings,
    #[serde(default)]
    pub banner: BannerSettings,
    #[serde(default)]
    pub toclevel_pages: Vec<String>,
    #[serde(default)]
    pub rewrite: RewriteSettings,
    #[serde(default)]
    pub overrides: Vec<Override>,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.convert.folders.is_empty() {
            issues.push(ValidationIssue::EmptyFolderList);
        }
        if self.convert.output_folder.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "convert",
                field: "output_folder",
            });
        }
        if self.convert.output_folder == self.convert.source_path {
            issues.push(ValidationIssue::InvalidCombo {
                label: None,
                message: "output_folder must differ from source_path".to_string(),
            });
        }
        if self.convert.index_rename.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "convert",
                field: "index_rename",
            });
        }

        for item in &self.overrides {
            if item.label.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    section: "overrides",
                    field: "label",
                });
            }

            match &item.substitution {
                Substitution::Regex { pattern, .. } => {
                    if pattern.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            section: "overrides.substitution",
                            field: "pattern",
                        });
                    } else if let Err(err) = Regex::new(pattern) {
                        issues.push(ValidationIssue::InvalidPattern {
                            label: item.label.clone(),
                            message: err.to_string(),
                        });
                    }
                }
                Substitution::Literal { pairs } => {
                    if pairs.is_empty() {
                        issues.push(ValidationIssue::InvalidCombo {
                            label: Some(item.label.clone()),
                            message: "literal substitution has no pairs".to_string(),
                        });
                    }
                    if pairs.iter().any(|pair| pair.from.is_empty()) {
                        issues.push(ValidationIssue::InvalidCombo {
                            label: Some(item.label.clone()),
                            message: "literal pair with empty 'from'".to_string(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Where documents come from and where converted documents go.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertSettings {
    pub source_path: PathBuf,
    pub output_folder: PathBuf,
    /// Top-level subdirectories and loose `.adoc` files to convert
    pub folders: Vec<String>,
    pub clean_output: bool,
    pub index_document: String,
    pub index_rename: String,
    pub log_dir: PathBuf,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("./converted_by_kramdoc"),
            output_folder: PathBuf::from("converted_by_adoc_converter"),
            folders: ["base", "devdocs", "manual", "stdlib", "index.adoc"]
                .into_iter()
                .map(String::from)
                .collect(),
            clean_output: false,
            index_document: "index.adoc".to_string(),
            index_rename: "_index.adoc".to_string(),
            log_dir: PathBuf::from("."),
        }
    }
}

/// "Translation in progress" notice and the documents that skip it.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct BannerSettings {
    pub text: String,
    pub translated: Vec<String>,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            text: "Документация в процессе перевода.".to_string(),
            translated: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteSettings {
    /// Caption prefix for converted compat blocks, followed by the version
    pub compat_caption: String,
    /// Documents whose example text only looks like list items or Markdown links
    pub exempt_documents: Vec<String>,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            compat_caption: "Совместимость: ".to_string(),
            exempt_documents: vec!["Markdown.adoc".to_string()],
        }
    }
}

/// A labelled substitution restricted to a set of documents.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Override {
    pub label: String,
    /// Empty means every document
    #[serde(default)]
    pub documents: Vec<String>,
    pub substitution: Substitution,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Substitution {
    /// Regex pattern with a `$1`-style replacement template
    Regex {
        pattern: String,
        replacement: String,
    },
    /// Exact text pairs, applied in order
    Literal { pairs: Vec<LiteralPair> },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LiteralPair {
    pub from: String,
    pub to: String,
}

/// Locations of the two documents compared by the reconciler.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileSettings {
    /// Directory holding the new-format document
    pub reference_dir: Option<PathBuf>,
    /// Directory holding the old-format document
    pub target_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub output_prefix: String,
    /// Short leading lines that are too common to trust after a blank line
    pub generic_leading_lines: Vec<String>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            reference_dir: None,
            target_dir: None,
            file_name: None,
            output_prefix: "converted_".to_string(),
            generic_leading_lines: vec!["let".to_string(), "...".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyFolderList,
    MissingField {
        section: &'static str,
        field: &'static str,
    },
    InvalidPattern {
        label: String,
        message: String,
    },
    InvalidCombo {
        label: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFolderList => {
                write!(f, "convert.folders lists nothing to convert")
            }
            ValidationIssue::MissingField { section, field } => {
                write!(f, "{section} missing required field '{field}'")
            }
            ValidationIssue::InvalidPattern { label, message } => {
                write!(f, "override '{label}' has an invalid pattern: {message}")
            }
            ValidationIssue::InvalidCombo { label, message } => match label {
                Some(label) => write!(f, "override '{label}' has invalid configuration: {message}"),
                None => write!(f, "invalid configuration: {message}"),
            },
        }
    }
}
