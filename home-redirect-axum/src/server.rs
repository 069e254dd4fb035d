use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use home_redirect_core::HomeRedirect;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::middleware::handle_home_redirect;
use crate::switcher;

pub struct WebServer {
    router: Router,
    addr: String,
    middlewares: Vec<Box<dyn FnOnce(Router) -> Router + Send>>,
    home_redirect_installed: bool,
}

impl WebServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            router: Router::new(),
            addr: addr.into(),
            middlewares: Vec::new(),
            home_redirect_installed: false,
        }
    }

    pub fn mount(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    /// Install the front-page redirect filter and serve the switcher routes.
    ///
    /// Only the first call takes effect; later ones are logged and ignored.
    pub fn layer_home_redirect(mut self, home: HomeRedirect) -> Self {
        if self.home_redirect_installed {
            log::warn!("Front page redirect already installed, ignoring");
            return self;
        }
        self.home_redirect_installed = true;

        let home = Arc::new(home);
        log::info!(
            "Front page redirectors: {}",
            home.chain().names().join(" -> ")
        );
        self.router = self.router.merge(switcher::router(home.clone()));
        self.middlewares
            .push(Box::new(move |r| r.layer(from_fn_with_state(home, handle_home_redirect))));
        self
    }

    /// Log every request and response at the `tower_http` target.
    pub fn layer_trace(mut self) -> Self {
        self.middlewares
            .push(Box::new(|r| r.layer(TraceLayer::new_for_http())));
        self
    }

    /// Apply the registered layers, in registration order, to everything mounted.
    pub fn into_router(self) -> Router {
        self.middlewares
            .into_iter()
            .fold(self.router, |router, layer| layer(router))
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr = self.addr.clone();
        log::info!("Starting web server at {}", addr);

        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        let server = axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown());
        if let Err(e) = server.await {
            log::error!("Server error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        log::info!("Server stopped");
        Ok(())
    }
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            log::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::CURRENT_LANGCODE;
    use axum::{body::Body, routing::get};
    use home_redirect_core::{Language, LanguageRegistry, RedirectChain};
    use http::Request;
    use std::collections::HashMap;
    use tower::util::ServiceExt;

    async fn check_lang() -> String {
        CURRENT_LANGCODE
            .try_with(|l| l.clone())
            .unwrap_or_else(|_| "not set".to_string())
    }

    fn home() -> HomeRedirect {
        let registry = LanguageRegistry::new(
            vec![Language::new("en", ""), Language::new("fr", "fr")],
            "en",
            HashMap::new(),
        )
        .unwrap();
        HomeRedirect::new(registry, RedirectChain::new())
    }

    async fn body_of(router: Router, uri: &str) -> String {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = ServiceExt::oneshot(router, req).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_layer_before_mount_still_applies() {
        let router = WebServer::new("127.0.0.1:0")
            .layer_home_redirect(home())
            .mount(Router::new().route("/{prefix}/page", get(check_lang)))
            .into_router();

        assert_eq!(body_of(router, "/fr/page").await, "fr");
    }

    #[tokio::test]
    async fn test_mount_then_layer() {
        let router = WebServer::new("127.0.0.1:0")
            .mount(Router::new().route("/page", get(check_lang)))
            .layer_home_redirect(home())
            .layer_trace()
            .into_router();

        assert_eq!(body_of(router, "/page").await, "en");
    }

    #[tokio::test]
    async fn test_switcher_script_is_served() {
        let router = WebServer::new("127.0.0.1:0")
            .layer_home_redirect(home())
            .into_router();

        let body = body_of(router, switcher::SCRIPT_PATH).await;
        assert!(body.contains("home_redirect_lang_preferred_langcode"));
    }

    #[tokio::test]
    async fn test_second_home_redirect_is_ignored() {
        let router = WebServer::new("127.0.0.1:0")
            .mount(Router::new().route("/{prefix}/page", get(check_lang)))
            .layer_home_redirect(home())
            .layer_home_redirect(home())
            .into_router();

        assert_eq!(body_of(router.clone(), "/fr/page").await, "fr");
        let body = body_of(router, switcher::SCRIPT_PATH).await;
        assert!(body.contains("home_redirect_lang_preferred_langcode"));
    }
}
