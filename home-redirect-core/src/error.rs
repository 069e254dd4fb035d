use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors raised while loading settings or building the language registry.
///
/// None of these surface at request time: a running redirector only ever
/// passes or redirects.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported settings file: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Invalid settings: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("Default language `{0}` is not an enabled language")]
    UnknownDefaultLanguage(String),
    #[error("Language `{0}` is declared more than once")]
    DuplicateLanguage(String),
    #[error("URL prefix `{prefix}` of `{id}` is not a single path segment")]
    InvalidPrefix { prefix: String, id: String },
    #[error("URL prefix `{prefix}` is shared by `{first}` and `{second}`")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },
}
