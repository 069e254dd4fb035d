//! Redirect settings as read from the settings file.
//!
//! Every toggle defaults to off, so an empty `browser_fallback` or `cookie`
//! section leaves only the unconditional cookie redirection active.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

pub const DEFAULT_FRONT_PAGE: &str = "/";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct RedirectSettings {
    #[validate(nested)]
    pub languages: LanguageSettings,
    pub browser_fallback: BrowserFallbackSettings,
    pub cookie: CookieSettings,
    /// Site-relative path of the homepage, without any language prefix.
    #[validate(custom(function = "validate_front_page"))]
    pub front_page: String,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            languages: LanguageSettings::default(),
            browser_fallback: BrowserFallbackSettings::default(),
            cookie: CookieSettings::default(),
            front_page: DEFAULT_FRONT_PAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LanguageSettings {
    #[validate(custom(function = "validate_langcode"))]
    pub default: String,
    #[validate(length(min = 1), nested)]
    pub enabled: Vec<LanguageDef>,
    /// Browser language code to site language code, e.g. `zh-tw: zh-hant`.
    pub mappings: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LanguageDef {
    #[validate(custom(function = "validate_langcode"))]
    pub id: String,
    /// URL path prefix. Defaults to the id, or to nothing for the default language.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: i32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct BrowserFallbackSettings {
    pub enable_browser_fallback: bool,
    pub enable_referer_bypass: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub enable_referer_bypass: bool,
}

fn validate_langcode(code: &str) -> Result<(), ValidationError> {
    let valid = !code.is_empty()
        && code.len() <= 12
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("langcode"))
    }
}

fn validate_front_page(path: &str) -> Result<(), ValidationError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("front_page"))
    }
}
