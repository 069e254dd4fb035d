//! Front-page redirect decisions.
//!
//! Each [`Redirector`] is a pure function of the request context, the
//! settings it was built with and the language registry. A [`RedirectChain`]
//! runs them by descending priority and the first redirect wins.

mod browser;
mod cookie;

pub use browser::BrowserFallbackRedirector;
pub use cookie::CookieRedirector;

use std::fmt;
use tracing::{debug, info};

use crate::config::{DEFAULT_FRONT_PAGE, RedirectSettings};
use crate::error::ConfigError;
use crate::language::{Language, LanguageRegistry, is_front_path};

/// What a redirector needs to know about one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext<'a> {
    pub is_front_page: bool,
    pub current_langcode: &'a str,
    pub host: Option<&'a str>,
    pub accept_language: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub preferred_langcode: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Resolve the current language and front-page flag from a request path.
    pub fn from_path(registry: &'a LanguageRegistry, front_page: &str, path: &str) -> Self {
        let (language, rest) = registry.resolve_path(path);
        Self {
            is_front_page: is_front_path(rest, front_page),
            current_langcode: language.id.as_str(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: Option<&'a str>) -> Self {
        self.host = host;
        self
    }

    pub fn accept_language(mut self, value: Option<&'a str>) -> Self {
        self.accept_language = value;
        self
    }

    pub fn referer(mut self, value: Option<&'a str>) -> Self {
        self.referer = value;
        self
    }

    pub fn preferred_langcode(mut self, value: Option<&'a str>) -> Self {
        self.preferred_langcode = value;
        self
    }
}

/// Why a redirector let the request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    NotFrontPage,
    BrowserFallbackDisabled,
    NoAcceptLanguage,
    ExternalReferer,
    PreferenceCookieSet,
    NoPreferenceCookie,
    NoMatchingLanguage,
    AlreadyInLanguage,
    UnknownLanguage,
    NoRedirector,
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PassReason::NotFrontPage => "not the front page",
            PassReason::BrowserFallbackDisabled => "browser fallback disabled",
            PassReason::NoAcceptLanguage => "no Accept-Language header",
            PassReason::ExternalReferer => "external referer",
            PassReason::PreferenceCookieSet => "preference cookie set",
            PassReason::NoPreferenceCookie => "no preference cookie",
            PassReason::NoMatchingLanguage => "no matching language",
            PassReason::AlreadyInLanguage => "already in the preferred language",
            PassReason::UnknownLanguage => "language not enabled",
            PassReason::NoRedirector => "no redirector installed",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Pass(PassReason),
    /// 302 to `location`, the front page in `langcode`.
    Redirect { langcode: String, location: String },
}

impl RedirectDecision {
    pub fn to_front_page(registry: &LanguageRegistry, language: &Language) -> Self {
        RedirectDecision::Redirect {
            langcode: language.id.clone(),
            location: registry.front_url(language),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, RedirectDecision::Redirect { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            RedirectDecision::Redirect { location, .. } => Some(location),
            RedirectDecision::Pass(_) => None,
        }
    }
}

pub trait Redirector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    fn decide(&self, ctx: &RequestContext<'_>, registry: &LanguageRegistry) -> RedirectDecision;

    /// Whether this redirector reads `Accept-Language`.
    fn varies_on_accept_language(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub struct RedirectChain {
    redirectors: Vec<Box<dyn Redirector>>,
}

impl RedirectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, redirector: impl Redirector + 'static) -> Self {
        self.redirectors.push(Box::new(redirector));
        // Stable: equal priorities keep registration order.
        self.redirectors.sort_by_key(|r| std::cmp::Reverse(r.priority()));
        self
    }

    /// The browser fallback ahead of the cookie redirector.
    pub fn from_settings(settings: &RedirectSettings) -> Self {
        Self::new()
            .with(BrowserFallbackRedirector::new(settings.browser_fallback))
            .with(CookieRedirector::new(settings.cookie))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.redirectors.iter().map(|r| r.name()).collect()
    }

    pub fn varies_on_accept_language(&self) -> bool {
        self.redirectors.iter().any(|r| r.varies_on_accept_language())
    }

    pub fn decide(&self, ctx: &RequestContext<'_>, registry: &LanguageRegistry) -> RedirectDecision {
        let mut last = RedirectDecision::Pass(if ctx.is_front_page {
            PassReason::NoRedirector
        } else {
            PassReason::NotFrontPage
        });
        for redirector in &self.redirectors {
            let decision = redirector.decide(ctx, registry);
            match &decision {
                RedirectDecision::Redirect { location, .. } => {
                    info!(
                        redirector = redirector.name(),
                        from = ctx.current_langcode,
                        location = location.as_str(),
                        "Redirecting front page"
                    );
                    return decision;
                }
                RedirectDecision::Pass(reason) if ctx.is_front_page => {
                    debug!(redirector = redirector.name(), %reason, "No redirect");
                }
                RedirectDecision::Pass(_) => {}
            }
            last = decision;
        }
        last
    }
}

/// Everything the request-time filter needs, built once from settings.
pub struct HomeRedirect {
    registry: LanguageRegistry,
    chain: RedirectChain,
    front_page: String,
}

impl HomeRedirect {
    pub fn from_settings(settings: &RedirectSettings) -> Result<Self, ConfigError> {
        use validator::Validate;
        settings.validate()?;

        Ok(Self {
            registry: LanguageRegistry::from_settings(&settings.languages)?,
            chain: RedirectChain::from_settings(settings),
            front_page: settings.front_page.clone(),
        })
    }

    pub fn new(registry: LanguageRegistry, chain: RedirectChain) -> Self {
        Self {
            registry,
            chain,
            front_page: DEFAULT_FRONT_PAGE.to_string(),
        }
    }

    pub fn front_page(mut self, path: impl Into<String>) -> Self {
        self.front_page = path.into();
        self
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn chain(&self) -> &RedirectChain {
        &self.chain
    }

    /// Whether front-page responses depend on `Accept-Language`.
    pub fn varies_on_accept_language(&self) -> bool {
        self.chain.varies_on_accept_language()
    }

    pub fn context<'a>(&'a self, path: &str) -> RequestContext<'a> {
        RequestContext::from_path(&self.registry, &self.front_page, path)
    }

    pub fn decide(&self, ctx: &RequestContext<'_>) -> RedirectDecision {
        self.chain.decide(ctx, &self.registry)
    }
}
