//! Source selection, output mirroring and file writes for a convert run.

use crate::config::ConvertSettings;
use crate::document::{normalize_line_endings, DocPath};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const ADOC_EXTENSION: &str = "adoc";

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A top-level folder or loose document selected for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// A document to rewrite: where it is read from and where it ends up.
#[derive(Debug, Clone)]
pub struct PlannedDocument {
    pub source: PathBuf,
    pub output: PathBuf,
    pub path: DocPath,
}

/// Everything a convert run copies and rewrites.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub entries: Vec<SourceEntry>,
    pub documents: Vec<PlannedDocument>,
    index_document: String,
    index_rename: String,
}

impl ConversionPlan {
    pub fn build(settings: &ConvertSettings) -> Result<Self, TreeError> {
        let entries = select_entries(&settings.source_path, &settings.folders)?;
        let mut plan = Self {
            source_root: settings.source_path.clone(),
            output_root: settings.output_folder.clone(),
            entries,
            documents: Vec::new(),
            index_document: settings.index_document.clone(),
            index_rename: settings.index_rename.clone(),
        };

        let mut documents = Vec::new();
        for (source, output) in plan.file_pairs()? {
            if !is_adoc(&source) {
                continue;
            }
            let relative = output.strip_prefix(&plan.output_root).unwrap_or(&output);
            documents.push(PlannedDocument {
                path: DocPath::new(relative),
                source,
                output,
            });
        }
        plan.documents = documents;

        Ok(plan)
    }

    /// True when none of the configured folders or files exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mirror every selected entry into the output root.
    pub fn materialize(&self, clean: bool) -> Result<(), TreeError> {
        if clean && self.output_root.exists() {
            fs::remove_dir_all(&self.output_root).map_err(|source| TreeError::Write {
                path: self.output_root.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&self.output_root).map_err(|source| TreeError::Write {
            path: self.output_root.clone(),
            source,
        })?;

        for (from, to) in self.file_pairs()? {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|source| TreeError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::copy(&from, &to).map_err(|source| TreeError::Copy {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
        }

        Ok(())
    }

    fn output_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name == self.index_document {
            &self.index_rename
        } else {
            name
        }
    }

    /// (source, output) for every file under the selected entries, in a
    /// stable order.
    fn file_pairs(&self) -> Result<Vec<(PathBuf, PathBuf)>, TreeError> {
        let mut pairs = Vec::new();

        for entry in &self.entries {
            if !entry.is_dir {
                let output = self.output_root.join(self.output_name(&entry.name));
                pairs.push((entry.path.clone(), output));
                continue;
            }

            for item in WalkDir::new(&entry.path).sort_by_file_name() {
                let item = item.map_err(|source| TreeError::Walk {
                    path: entry.path.clone(),
                    source,
                })?;
                if !item.file_type().is_file() {
                    continue;
                }
                let relative = item
                    .path()
                    .strip_prefix(&self.source_root)
                    .unwrap_or(item.path());
                pairs.push((item.path().to_path_buf(), self.output_root.join(relative)));
            }
        }

        Ok(pairs)
    }
}

/// Top-level folders and `.adoc` files of `source_root` named in `folders`.
///
/// A missing source root selects nothing.
pub fn select_entries(source_root: &Path, folders: &[String]) -> Result<Vec<SourceEntry>, TreeError> {
    if !source_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(source_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| TreeError::Walk {
            path: source_root.to_path_buf(),
            source,
        })?;
        let is_dir = entry.file_type().is_dir();
        if !is_dir && !is_adoc(entry.path()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if folders.iter().any(|folder| *folder == name) {
            entries.push(SourceEntry {
                name,
                path: entry.path().to_path_buf(),
                is_dir,
            });
        }
    }

    Ok(entries)
}

pub fn read_document(path: &Path) -> Result<String, TreeError> {
    fs::read_to_string(path)
        .map(normalize_line_endings)
        .map_err(|source| TreeError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Write via a temporary file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

fn is_adoc(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(ADOC_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> ConvertSettings {
        ConvertSettings {
            source_path: dir.path().join("src"),
            output_folder: dir.path().join("out"),
            ..ConvertSettings::default()
        }
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_select_only_configured_entries() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src.join("base/a.adoc"), "a");
        write(&src.join("other/b.adoc"), "b");
        write(&src.join("index.adoc"), "i");
        write(&src.join("notes.txt"), "n");

        let folders = vec!["base".to_string(), "index.adoc".to_string(), "notes.txt".to_string()];
        let entries = select_entries(&src, &folders).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["base", "index.adoc"]);
    }

    #[test]
    fn test_missing_source_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let plan = ConversionPlan::build(&settings(&dir)).unwrap();
        assert!(plan.is_empty());
        assert!(plan.documents.is_empty());
    }

    #[test]
    fn test_plan_renames_index() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src.join("index.adoc"), "= Home\n");
        write(&src.join("manual/x/y.adoc"), "= Y\n");
        write(&src.join("manual/img.png"), "png");

        let plan = ConversionPlan::build(&settings(&dir)).unwrap();
        let paths: Vec<&str> = plan.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["_index.adoc", "manual/x/y.adoc"]);
        assert_eq!(plan.documents[0].output, dir.path().join("out").join("_index.adoc"));
    }

    #[test]
    fn test_materialize_copies_everything() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write(&src.join("index.adoc"), "= Home\n");
        write(&src.join("manual/img.png"), "png");

        let plan = ConversionPlan::build(&settings(&dir)).unwrap();
        plan.materialize(false).unwrap();

        let out = dir.path().join("out");
        assert_eq!(fs::read_to_string(out.join("_index.adoc")).unwrap(), "= Home\n");
        assert!(out.join("manual/img.png").exists());
        assert!(!out.join("index.adoc").exists());
    }

    #[test]
    fn test_materialize_clean_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("src/base/a.adoc"), "a");
        write(&dir.path().join("out/stale.adoc"), "old");

        let plan = ConversionPlan::build(&settings(&dir)).unwrap();
        plan.materialize(true).unwrap();
        assert!(!dir.path().join("out/stale.adoc").exists());
        assert!(dir.path().join("out/base/a.adoc").exists());
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.adoc");
        fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_read_document_normalizes_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.adoc");
        fs::write(&path, "= T\r\n\r\n----\r\ncode\r\n----\r\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), "= T\n\n----\ncode\n----\n");
    }
}
