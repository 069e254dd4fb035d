//! Settings file loader with `${VAR}` / `${VAR:default}` environment substitution.

use dotenvy::dotenv;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ConfigError;

/// Settings file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

fn replace_vars(content: &str) -> String {
    // A missing .env is the normal case outside development.
    let _ = dotenv();

    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Z0-9_]+)(?::([^\}]*))?\}").expect("Invalid regex pattern")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let default = caps.get(2).map(|m| m.as_str());
        env::var(&caps[1]).unwrap_or_else(|_| default.unwrap_or("").to_string())
    })
    .into_owned()
}

/// Load settings from a `.yaml`, `.yml` or `.toml` file.
pub fn load_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let format =
        Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path)?;
    load_from_str(&content, format)
}

pub fn load_from_str<T: DeserializeOwned>(content: &str, format: Format) -> Result<T, ConfigError> {
    let replaced = replace_vars(content);
    let data = match format {
        Format::Yaml => serde_yaml::from_str(&replaced)?,
        Format::Toml => toml::from_str(&replaced)?,
    };
    Ok(data)
}
