use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, CACHE_CONTROL, COOKIE, HOST, LOCATION, REFERER, VARY};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use home_redirect_core::cookie::find_preferred_langcode;
use home_redirect_core::{HomeRedirect, RedirectDecision};
use tokio::task_local;

task_local! {
    /// Language resolved from the URL prefix of the request being served.
    pub static CURRENT_LANGCODE: String;
}

/// Redirect front-page requests to the visitor's preferred language.
///
/// Requests that are not redirected run with [`CURRENT_LANGCODE`] set.
pub async fn handle_home_redirect(
    State(home): State<Arc<HomeRedirect>>,
    req: Request,
    next: Next,
) -> Response {
    let headers = req.headers();
    let cookies = headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok());

    let ctx = home
        .context(req.uri().path())
        .host(header_str(headers, HOST).or_else(|| req.uri().host()))
        .accept_language(header_str(headers, ACCEPT_LANGUAGE))
        .referer(header_str(headers, REFERER))
        .preferred_langcode(find_preferred_langcode(cookies));

    let decision = home.decide(&ctx);
    let is_front_page = ctx.is_front_page;
    let langcode = ctx.current_langcode.to_string();

    let mut response = match decision {
        RedirectDecision::Redirect { location, .. } => found(&location),
        RedirectDecision::Pass(_) => CURRENT_LANGCODE.scope(langcode, next.run(req)).await,
    };

    if is_front_page {
        add_vary(response.headers_mut(), home.varies_on_accept_language());
    }
    response
}

fn header_str(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn found(location: &str) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        // Locations come from configured prefixes, which are plain path segments.
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    (
        StatusCode::FOUND,
        [
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static("private, no-cache")),
        ],
    )
        .into_response()
}

/// The front page differs per cookie and referer, and per browser language
/// when the fallback is on.
fn add_vary(headers: &mut HeaderMap, accept_language: bool) {
    headers.append(VARY, HeaderValue::from_static("Cookie"));
    headers.append(VARY, HeaderValue::from_static("Referer"));
    if accept_language {
        headers.append(VARY, HeaderValue::from_static("Accept-Language"));
    }
}
