use std::env;
use std::sync::Arc;

use anyhow::Context;
use home_redirect_axum::{AppSettings, WebServer, site};
use home_redirect_core::HomeRedirect;

const DEFAULT_SETTINGS_PATH: &str = "config/home-redirect.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("HOME_REDIRECT_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());

    let settings =
        AppSettings::load(&path).with_context(|| format!("Failed to load settings from {path}"))?;
    let _guard = home_redirect_logger::init(&settings.logging)?;

    let home = HomeRedirect::from_settings(&settings.redirect)?;
    let registry = Arc::new(home.registry().clone());
    tracing::info!(
        languages = ?registry.langcodes().collect::<Vec<_>>(),
        default = registry.default_language().id.as_str(),
        "Loaded language registry"
    );

    WebServer::new(settings.server.addr)
        .mount(site::router(registry))
        .layer_home_redirect(home)
        .layer_trace()
        .start()
        .await
}
