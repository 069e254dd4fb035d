//! Enabled site languages and their URL prefixes.

use std::collections::{HashMap, HashSet};

use crate::config::LanguageSettings;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: String,
    /// First path segment selecting this language; empty means no prefix.
    pub prefix: String,
    pub name: String,
    pub weight: i32,
}

impl Language {
    pub fn new(id: impl Into<String>, prefix: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            prefix: prefix.into(),
            weight: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }
}

/// Read-only snapshot of the enabled languages, ordered by weight.
///
/// Declaration order breaks weight ties, and that order is also the tie-break
/// used by language negotiation.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    default_index: usize,
    mappings: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn new(
        mut languages: Vec<Language>,
        default_id: &str,
        mappings: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        languages.sort_by_key(|l| l.weight);

        let mut ids = HashSet::new();
        let mut prefixes: HashMap<&str, &str> = HashMap::new();
        for lang in &languages {
            if !ids.insert(lang.id.as_str()) {
                return Err(ConfigError::DuplicateLanguage(lang.id.clone()));
            }
            if !is_path_segment(&lang.prefix) {
                return Err(ConfigError::InvalidPrefix {
                    prefix: lang.prefix.clone(),
                    id: lang.id.clone(),
                });
            }
            if let Some(first) = prefixes.insert(lang.prefix.as_str(), lang.id.as_str()) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix: lang.prefix.clone(),
                    first: first.to_string(),
                    second: lang.id.clone(),
                });
            }
        }

        let default_index = languages
            .iter()
            .position(|l| l.id == default_id)
            .ok_or_else(|| ConfigError::UnknownDefaultLanguage(default_id.to_string()))?;

        Ok(Self {
            languages,
            default_index,
            mappings,
        })
    }

    pub fn from_settings(settings: &LanguageSettings) -> Result<Self, ConfigError> {
        let languages = settings
            .enabled
            .iter()
            .map(|def| {
                let prefix = match &def.prefix {
                    Some(prefix) => prefix.trim_matches('/').to_string(),
                    None if def.id == settings.default => String::new(),
                    None => def.id.clone(),
                };
                Language {
                    id: def.id.clone(),
                    prefix,
                    name: def.name.clone().unwrap_or_else(|| def.id.clone()),
                    weight: def.weight,
                }
            })
            .collect();

        Self::new(languages, &settings.default, settings.mappings.clone())
    }

    /// Look up an enabled language by its exact id.
    pub fn get(&self, id: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn langcodes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|l| l.id.as_str())
    }

    pub fn default_language(&self) -> &Language {
        &self.languages[self.default_index]
    }

    pub fn mappings(&self) -> &HashMap<String, String> {
        &self.mappings
    }

    /// Split a request path into its language and the path below the prefix.
    ///
    /// `/fr/node/1` gives `(fr, "/node/1")`, `/fr` gives `(fr, "/")`, and a
    /// path without a known prefix belongs to the default language.
    pub fn resolve_path<'p>(&self, path: &'p str) -> (&Language, &'p str) {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let (segment, rest) = match trimmed.find('/') {
            Some(i) => (&trimmed[..i], &trimmed[i..]),
            None => (trimmed, "/"),
        };

        if !segment.is_empty()
            && let Some(lang) = self
                .languages
                .iter()
                .find(|l| !l.prefix.is_empty() && l.prefix == segment)
        {
            return (lang, rest);
        }

        let unprefixed = if path.is_empty() { "/" } else { path };
        (self.default_language(), unprefixed)
    }

    /// URL of the front page rendered in `language`.
    pub fn front_url(&self, language: &Language) -> String {
        if language.prefix.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", language.prefix)
        }
    }
}

/// Whether `path` (already stripped of its language prefix) is the front page.
pub fn is_front_path(path: &str, front_page: &str) -> bool {
    let path = normalize(path);
    path == "/" || path == normalize(front_page)
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// An empty prefix, or one path segment that `resolve_path` can match back.
fn is_path_segment(prefix: &str) -> bool {
    prefix.is_empty()
        || (prefix != "."
            && prefix != ".."
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LanguageRegistry {
        LanguageRegistry::new(
            vec![
                Language::new("de", "de").with_weight(2),
                Language::new("en", ""),
                Language::new("fr", "fr").with_weight(1),
            ],
            "en",
            HashMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_languages_are_ordered_by_weight() {
        let registry = registry();
        let ids: Vec<_> = registry.langcodes().collect();
        assert_eq!(ids, vec!["en", "fr", "de"]);
    }

    #[test]
    fn test_resolve_path() {
        let registry = registry();
        let cases = [
            ("/", "en", "/"),
            ("", "en", "/"),
            ("/fr", "fr", "/"),
            ("/fr/", "fr", "/"),
            ("/de/node/1", "de", "/node/1"),
            ("/node/1", "en", "/node/1"),
            ("/french", "en", "/french"),
        ];
        for (path, lang, rest) in cases {
            let (resolved, remaining) = registry.resolve_path(path);
            assert_eq!(resolved.id, lang, "language of {path}");
            assert_eq!(remaining, rest, "remainder of {path}");
        }
    }

    #[test]
    fn test_front_url() {
        let registry = registry();
        assert_eq!(registry.front_url(registry.default_language()), "/");
        assert_eq!(registry.front_url(registry.get("fr").unwrap()), "/fr");
    }

    #[test]
    fn test_is_front_path() {
        assert!(is_front_path("/", "/"));
        assert!(is_front_path("/", "/home"));
        assert!(is_front_path("/home/", "/home"));
        assert!(!is_front_path("/node/1", "/"));
        assert!(!is_front_path("/home/page", "/home"));
    }

    #[test]
    fn test_invalid_registries() {
        let err = LanguageRegistry::new(vec![Language::new("en", "")], "fr", HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultLanguage(_)));

        let err = LanguageRegistry::new(
            vec![Language::new("en", ""), Language::new("fr", "")],
            "en",
            HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePrefix { .. }));

        let err = LanguageRegistry::new(
            vec![Language::new("en", ""), Language::new("en", "en")],
            "en",
            HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLanguage(_)));

        for prefix in ["fr/ch", "fr ch", "..", "fr?x"] {
            let err = LanguageRegistry::new(
                vec![Language::new("en", ""), Language::new("fr", prefix)],
                "en",
                HashMap::new(),
            )
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPrefix { ref id, .. } if id == "fr"),
                "prefix {prefix:?}"
            );
        }
    }

    #[test]
    fn test_settings_prefix_is_a_single_segment() {
        let settings: LanguageSettings = serde_yaml::from_str(
            r#"
default: en
enabled:
  - id: en
  - id: fr
    prefix: /fr-ch/
"#,
        )
        .unwrap();
        let registry = LanguageRegistry::from_settings(&settings).unwrap();
        let fr = registry.get("fr").unwrap();
        assert_eq!(registry.front_url(fr), "/fr-ch");
        assert_eq!(registry.resolve_path("/fr-ch").0.id, "fr");

        let settings: LanguageSettings = serde_yaml::from_str(
            r#"
default: en
enabled:
  - id: en
  - id: fr
    prefix: fr/ch
"#,
        )
        .unwrap();
        let err = LanguageRegistry::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix { .. }));
    }
}
