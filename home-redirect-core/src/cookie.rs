//! The language preference cookie.
//!
//! The language switcher script writes it on click. `PreferenceCookie`
//! renders the same cookie for the server-side preference route.

use chrono::{DateTime, Duration, Utc};

pub const PREFERRED_LANGCODE_COOKIE: &str = "home_redirect_lang_preferred_langcode";

/// 365 days.
pub const PREFERRED_LANGCODE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

pub const COOKIE_PATH: &str = "/";

/// Find the preferred langcode among `Cookie` header values.
///
/// An empty value carries no preference and is reported as absent.
pub fn find_preferred_langcode<'a, I>(cookie_headers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    cookie_headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == PREFERRED_LANGCODE_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceCookie {
    pub langcode: String,
}

impl PreferenceCookie {
    pub fn new(langcode: impl Into<String>) -> Self {
        Self {
            langcode: langcode.into(),
        }
    }

    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(PREFERRED_LANGCODE_MAX_AGE)
    }

    /// `Set-Cookie` value; neither `Secure` nor `HttpOnly` so the switcher
    /// script can overwrite it on plain HTTP sites.
    pub fn to_set_cookie(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}={}; Expires={}; Max-Age={}; Path={}",
            PREFERRED_LANGCODE_COOKIE,
            self.langcode,
            self.expires_at(now).format("%a, %d %b %Y %H:%M:%S GMT"),
            PREFERRED_LANGCODE_MAX_AGE,
            COOKIE_PATH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_find_preferred_langcode() {
        assert_eq!(
            find_preferred_langcode(["a=1; home_redirect_lang_preferred_langcode=de; b=2"]),
            Some("de")
        );
        assert_eq!(
            find_preferred_langcode(["a=1", "home_redirect_lang_preferred_langcode=\"fr\""]),
            Some("fr")
        );
        assert_eq!(find_preferred_langcode(["home_redirect_lang_preferred_langcode="]), None);
        assert_eq!(find_preferred_langcode(["other_preferred_langcode=de"]), None);
        assert_eq!(find_preferred_langcode(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_set_cookie() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            PreferenceCookie::new("fr").to_set_cookie(now),
            "home_redirect_lang_preferred_langcode=fr; Expires=Fri, 01 Jan 2027 12:00:00 GMT; \
             Max-Age=31536000; Path=/"
        );
    }
}
