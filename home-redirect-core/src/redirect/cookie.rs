use super::{PassReason, RedirectDecision, Redirector, RequestContext};
use crate::config::CookieSettings;
use crate::language::LanguageRegistry;
use crate::referer::is_external_referer;

/// Runs after [`super::BrowserFallbackRedirector`].
pub const PRIORITY: i32 = 30;

/// Sends visitors back to the language stored in their preference cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieRedirector {
    settings: CookieSettings,
}

impl CookieRedirector {
    pub fn new(settings: CookieSettings) -> Self {
        Self { settings }
    }
}

impl Redirector for CookieRedirector {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn decide(&self, ctx: &RequestContext<'_>, registry: &LanguageRegistry) -> RedirectDecision {
        if !ctx.is_front_page {
            return RedirectDecision::Pass(PassReason::NotFrontPage);
        }

        if self.settings.enable_referer_bypass && is_external_referer(ctx.referer, ctx.host) {
            return RedirectDecision::Pass(PassReason::ExternalReferer);
        }

        let Some(preferred) = ctx.preferred_langcode else {
            return RedirectDecision::Pass(PassReason::NoPreferenceCookie);
        };

        if preferred == ctx.current_langcode {
            return RedirectDecision::Pass(PassReason::AlreadyInLanguage);
        }

        match registry.get(preferred) {
            Some(language) => RedirectDecision::to_front_page(registry, language),
            None => RedirectDecision::Pass(PassReason::UnknownLanguage),
        }
    }
}
