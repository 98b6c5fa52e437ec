pub mod loader;
pub mod schema;

pub use loader::{
    load, load_builtin, load_from_path, load_from_str, ConfigError, ConfigOrigin, BUILTIN_CONFIG,
};
pub use schema::{
    BannerSettings, ConvertConfig, ConvertSettings, LiteralPair, Override, ReconcileSettings,
    RewriteSettings, Substitution, ValidationError, ValidationIssue,
};
