use std::path::Path;

use home_redirect_core::config::loader;
use home_redirect_core::{ConfigError, RedirectSettings};
use home_redirect_logger::LogSettings;
use serde::Deserialize;
use validator::Validate;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Whole settings file: server, logging and the redirect sections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AppSettings {
    #[validate(nested)]
    pub server: ServerSettings,
    pub logging: LogSettings,
    #[serde(flatten)]
    #[validate(nested)]
    pub redirect: RedirectSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl AppSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings: AppSettings = loader::load_from_file(path)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use home_redirect_core::config::loader::{Format, load_from_str};

    #[test]
    fn test_bundled_settings_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/home-redirect.yaml");
        let settings = AppSettings::load(path).unwrap();
        assert_eq!(settings.redirect.languages.default, "en");
        assert_eq!(settings.redirect.languages.enabled.len(), 3);
        assert!(settings.redirect.browser_fallback.enable_browser_fallback);
        assert!(settings.logging.console);
    }

    #[test]
    fn test_flattened_sections() {
        let toml = r#"
front_page = "/home"

[server]
addr = "0.0.0.0:${HRL_TEST_UNSET_PORT:9000}"

[languages]
default = "en"
enabled = [{ id = "en" }, { id = "fr" }]

[cookie]
enable_referer_bypass = true
"#;
        let settings: AppSettings = load_from_str(toml, Format::Toml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.addr, "0.0.0.0:9000");
        assert_eq!(settings.redirect.front_page, "/home");
        assert!(settings.redirect.cookie.enable_referer_bypass);
        assert!(!settings.redirect.browser_fallback.enable_browser_fallback);
        assert_eq!(settings.logging.level, "info");
    }
}
