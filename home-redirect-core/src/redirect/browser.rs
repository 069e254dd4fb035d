use super::{PassReason, RedirectDecision, Redirector, RequestContext};
use crate::config::BrowserFallbackSettings;
use crate::language::LanguageRegistry;
use crate::negotiation::best_matching_langcode;
use crate::referer::is_external_referer;

/// Must stay above [`super::CookieRedirector`]'s priority.
pub const PRIORITY: i32 = 31;

/// First-visit redirection from the browser's `Accept-Language`.
///
/// Steps aside as soon as a preference cookie exists, which leaves the cookie
/// redirector in charge of every later visit.
#[derive(Debug, Clone, Copy)]
pub struct BrowserFallbackRedirector {
    settings: BrowserFallbackSettings,
}

impl BrowserFallbackRedirector {
    pub fn new(settings: BrowserFallbackSettings) -> Self {
        Self { settings }
    }
}

impl Redirector for BrowserFallbackRedirector {
    fn name(&self) -> &'static str {
        "browser_fallback"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn varies_on_accept_language(&self) -> bool {
        self.settings.enable_browser_fallback
    }

    fn decide(&self, ctx: &RequestContext<'_>, registry: &LanguageRegistry) -> RedirectDecision {
        if !ctx.is_front_page {
            return RedirectDecision::Pass(PassReason::NotFrontPage);
        }

        if !self.settings.enable_browser_fallback {
            return RedirectDecision::Pass(PassReason::BrowserFallbackDisabled);
        }

        let Some(accept_language) = ctx.accept_language.filter(|v| !v.trim().is_empty()) else {
            return RedirectDecision::Pass(PassReason::NoAcceptLanguage);
        };

        if self.settings.enable_referer_bypass && is_external_referer(ctx.referer, ctx.host) {
            return RedirectDecision::Pass(PassReason::ExternalReferer);
        }

        if ctx.preferred_langcode.is_some() {
            return RedirectDecision::Pass(PassReason::PreferenceCookieSet);
        }

        let Some(destination) =
            best_matching_langcode(accept_language, registry.langcodes(), registry.mappings())
        else {
            return RedirectDecision::Pass(PassReason::NoMatchingLanguage);
        };

        if destination == ctx.current_langcode {
            return RedirectDecision::Pass(PassReason::AlreadyInLanguage);
        }

        match registry.get(destination) {
            Some(language) => RedirectDecision::to_front_page(registry, language),
            None => RedirectDecision::Pass(PassReason::UnknownLanguage),
        }
    }
}
