use axum::handler::Handler;
use axum::http::HeaderName;
use axum::routing::get;
use axum::Router;
use edge_core::EdgeApp;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AxumApp {
    pub app: EdgeApp,
    pub router: Router<()>,
}

impl AxumApp {
    pub fn new(app: EdgeApp) -> Self {
        Self {
            app,
            router: Router::new(),
        }
    }

    /// Merge routes that carry their own full paths.
    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn use_get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Install request ids, HTTP tracing and permissive CORS for browser
    /// consoles. Call once, after all routes are registered.
    pub fn with_http_layers(mut self) -> Self {
        let header = HeaderName::from_static(REQUEST_ID_HEADER);
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr()?, app = self.app.name(), "listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn axum(app: EdgeApp) -> AxumApp {
    AxumApp::new(app)
}
