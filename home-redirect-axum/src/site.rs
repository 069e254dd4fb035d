//! Minimal multilingual site used by the binary: one front page per language
//! plus plain content pages, all carrying the language switcher.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use home_redirect_core::LanguageRegistry;

use crate::middleware::CURRENT_LANGCODE;
use crate::switcher::{SCRIPT_PATH, escape, switcher_html};

pub fn router(registry: Arc<LanguageRegistry>) -> Router {
    Router::new()
        .route("/", get(front_page))
        .route("/{prefix}", get(prefixed_front_page))
        .route("/node/{id}", get(node))
        .route("/{prefix}/node/{id}", get(prefixed_node))
        .with_state(registry)
}

async fn front_page(State(registry): State<Arc<LanguageRegistry>>) -> Response {
    render(&registry, "Home").into_response()
}

async fn prefixed_front_page(
    State(registry): State<Arc<LanguageRegistry>>,
    Path(prefix): Path<String>,
) -> Response {
    if !is_language_prefix(&registry, &prefix) {
        return StatusCode::NOT_FOUND.into_response();
    }
    render(&registry, "Home").into_response()
}

async fn node(State(registry): State<Arc<LanguageRegistry>>, Path(id): Path<u32>) -> Response {
    render(&registry, &format!("Node {id}")).into_response()
}

async fn prefixed_node(
    State(registry): State<Arc<LanguageRegistry>>,
    Path((prefix, id)): Path<(String, u32)>,
) -> Response {
    if !is_language_prefix(&registry, &prefix) {
        return StatusCode::NOT_FOUND.into_response();
    }
    render(&registry, &format!("Node {id}")).into_response()
}

fn is_language_prefix(registry: &LanguageRegistry, prefix: &str) -> bool {
    registry
        .languages()
        .iter()
        .any(|l| !l.prefix.is_empty() && l.prefix == prefix)
}

fn render(registry: &LanguageRegistry, title: &str) -> Html<String> {
    let current = CURRENT_LANGCODE
        .try_with(Clone::clone)
        .unwrap_or_else(|_| registry.default_language().id.clone());

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<nav>{switcher}</nav>
<h1>{title}</h1>
<script src="{script}"></script>
</body>
</html>
"#,
        lang = escape(&current),
        title = escape(title),
        switcher = switcher_html(registry, &current),
        script = SCRIPT_PATH,
    ))
}
