//! Client-side preference cookie writer.
//!
//! The script stores the `hreflang` of a clicked language-switcher link in
//! the preference cookie; the next front-page request picks it up. Clients
//! without JavaScript can follow [`preference_url`] instead, which sets the
//! same cookie from the server.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;
use home_redirect_core::cookie::{
    COOKIE_PATH, PREFERRED_LANGCODE_COOKIE, PREFERRED_LANGCODE_MAX_AGE, PreferenceCookie,
};
use home_redirect_core::{HomeRedirect, Language, LanguageRegistry};

pub const SCRIPT_PATH: &str = "/home_redirect_lang/language_switcher.js";

pub const PREFERENCE_PATH: &str = "/home_redirect_lang/preferred/{langcode}";

pub const SWITCHER_LINK_SELECTOR: &str = ".language-switcher-language-url .language-link";

pub fn switcher_script() -> String {
    format!(
        r#"(function () {{
  'use strict';

  function setPreferredLanguage(langcode) {{
    var expires = new Date(Date.now() + {max_age} * 1000);
    document.cookie = '{name}=' + langcode + '; expires=' + expires.toUTCString() + '; path={path}';
  }}

  document.addEventListener('click', function (event) {{
    var link = event.target.closest && event.target.closest('{selector}');
    if (!link) {{
      return;
    }}
    var hreflang = link.getAttribute('hreflang');
    if (hreflang) {{
      setPreferredLanguage(hreflang);
    }}
  }});
}})();
"#,
        max_age = PREFERRED_LANGCODE_MAX_AGE,
        name = PREFERRED_LANGCODE_COOKIE,
        path = COOKIE_PATH,
        selector = SWITCHER_LINK_SELECTOR,
    )
}

async fn serve_script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript; charset=utf-8")], switcher_script())
}

/// Store `langcode` as the preference and send the visitor to its front page.
///
/// Only enabled languages are accepted, so the cookie never holds a value the
/// redirectors would ignore.
async fn set_preference(
    State(home): State<Arc<HomeRedirect>>,
    Path(langcode): Path<String>,
) -> Response {
    let registry = home.registry();
    let Some(language) = registry.get(&langcode) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let cookie = PreferenceCookie::new(language.id.as_str()).to_set_cookie(Utc::now());
    let (Ok(cookie), Ok(location)) = (
        HeaderValue::from_str(&cookie),
        HeaderValue::from_str(&registry.front_url(language)),
    ) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    tracing::debug!(langcode = language.id.as_str(), "Preference cookie set");
    (
        StatusCode::FOUND,
        [
            (SET_COOKIE, cookie),
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static("private, no-cache")),
        ],
    )
        .into_response()
}

/// URL that stores `lang` as the preference server-side.
pub fn preference_url(lang: &Language) -> String {
    PREFERENCE_PATH.replace("{langcode}", &lang.id)
}

pub fn router(home: Arc<HomeRedirect>) -> Router {
    Router::new()
        .route(SCRIPT_PATH, get(serve_script))
        .route(PREFERENCE_PATH, get(set_preference))
        .with_state(home)
}

/// Switcher markup matching [`SWITCHER_LINK_SELECTOR`], linking every
/// language's front page.
pub fn switcher_html(registry: &LanguageRegistry, current: &str) -> String {
    let items: String = registry
        .languages()
        .iter()
        .map(|lang| switcher_item(registry, lang, lang.id == current))
        .collect();
    format!(r#"<ul class="language-switcher-language-url">{items}</ul>"#)
}

fn switcher_item(registry: &LanguageRegistry, lang: &Language, active: bool) -> String {
    let class = if active { "language-link is-active" } else { "language-link" };
    format!(
        r#"<li><a class="{class}" hreflang="{id}" href="{href}">{name}</a></li>"#,
        id = escape(&lang.id),
        href = escape(&registry.front_url(lang)),
        name = escape(&lang.name),
    )
}

pub(crate) fn escape(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_script_writes_preference_cookie() {
        let script = switcher_script();
        assert!(script.contains("'home_redirect_lang_preferred_langcode=' + langcode"));
        assert!(script.contains("31536000 * 1000"));
        assert!(script.contains("path=/'"));
        assert!(script.contains("getAttribute('hreflang')"));
        assert!(script.contains(SWITCHER_LINK_SELECTOR));
    }

    #[test]
    fn test_preference_url() {
        assert_eq!(
            preference_url(&Language::new("fr", "fr")),
            "/home_redirect_lang/preferred/fr"
        );
    }

    #[test]
    fn test_switcher_html() {
        let registry = LanguageRegistry::new(
            vec![
                Language::new("en", "").with_name("English"),
                Language::new("fr", "fr").with_name("Français & co").with_weight(1),
            ],
            "en",
            HashMap::new(),
        )
        .unwrap();

        let html = switcher_html(&registry, "fr");
        assert!(html.starts_with(r#"<ul class="language-switcher-language-url">"#));
        assert!(html.contains(r#"<a class="language-link" hreflang="en" href="/">English</a>"#));
        assert!(html.contains(
            r#"<a class="language-link is-active" hreflang="fr" href="/fr">Français &amp; co</a>"#
        ));
    }
}
