//! Reading the TOML configuration, with the embedded tables as the fallback.

use crate::config::schema::{ConvertConfig, ValidationError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Built-in configuration carrying the Julia documentation tables.
pub const BUILTIN_CONFIG: &str = include_str!("../../config/default.toml");

/// Where a configuration came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Builtin,
    Inline,
    File(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Builtin => f.write_str("built-in configuration"),
            ConfigOrigin::Inline => f.write_str("configuration"),
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Malformed TOML, an unknown key or an unknown substitution type
    #[error("{origin}: {source}")]
    Toml {
        origin: ConfigOrigin,
        #[source]
        source: toml_edit::de::Error,
    },
    #[error("{origin} is invalid: {source}")]
    Validation {
        origin: ConfigOrigin,
        #[source]
        source: ValidationError,
    },
    /// An override whose pattern fails to compile when the rewriter is built
    #[error("override '{label}' has an invalid pattern: {source}")]
    InvalidOverride {
        label: String,
        #[source]
        source: regex::Error,
    },
}

fn parse(input: &str, origin: ConfigOrigin) -> Result<ConvertConfig, ConfigError> {
    let config: ConvertConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Toml { origin, source }),
    };
    config
        .validate()
        .map_err(|source| ConfigError::Validation { origin, source })?;
    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<ConvertConfig, ConfigError> {
    parse(input, ConfigOrigin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConvertConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, ConfigOrigin::File(path.to_path_buf()))
}

pub fn load_builtin() -> Result<ConvertConfig, ConfigError> {
    parse(BUILTIN_CONFIG, ConfigOrigin::Builtin)
}

/// Load `path` when given, the built-in tables otherwise.
pub fn load(path: Option<&Path>) -> Result<ConvertConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => load_builtin(),
    }
}
