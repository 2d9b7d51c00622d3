use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::routing::any;
use axum::Router;

use crate::config::AppConfig;
use crate::data::catalog::Catalog;
use crate::data::loader::CatalogError;
use crate::ehp::Scorer;

pub mod api;
pub mod routes;
pub mod session;
pub mod static_files;

use routes::{error_response, route_request, HttpResponse};
use session::SessionStore;

/// Shared server state. The catalog snapshot is swapped wholesale on reload;
/// requests keep the `Arc` they started with.
#[derive(Debug, Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Arc<Catalog>>>,
    sessions: Arc<SessionStore>,
    scorer: Scorer,
    data_dir: PathBuf,
    page_size: usize,
}

impl AppState {
    pub fn new(catalog: Catalog, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            sessions: Arc::new(SessionStore::new()),
            scorer: config.scorer(),
            data_dir: config.data_dir.clone(),
            page_size: config.page_size,
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install a freshly loaded catalog and return the new snapshot.
    pub fn replace_catalog(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&catalog);
        catalog
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

async fn api_handler(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> HttpResponse {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(err) => return error_response(400, "Bad Request", &format!("Invalid request body: {err}")),
    };
    tracing::debug!(%method, target = %target, "api request");

    let response = tokio::task::spawn_blocking(move || {
        route_request(&state, method.as_str(), &target, &body)
    })
    .await;
    match response {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "request handler failed");
            error_response(500, "Internal Server Error", "Request handler failed")
        }
    }
}

/// API routes plus the static frontend, when `static_dir` exists.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let router = Router::new()
        .route("/api", any(api_handler))
        .route("/api/*rest", any(api_handler))
        .with_state(state);

    match static_files::static_service(static_dir) {
        Some(service) => router.fallback_service(service),
        None => {
            tracing::info!(dir = %static_dir.display(), "static directory missing; serving API only");
            router
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn run_server(config: &AppConfig) -> Result<(), ServerError> {
    let catalog = Catalog::load(&config.data_dir)?;
    let state = AppState::new(catalog, config);
    let router = build_router(state, &config.static_dir);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&config.bind).await?;
        tracing::info!(bind = %config.bind, "blueroad server listening on http://{}", config.bind);
        axum::serve(listener, router).await
    })?;
    Ok(())
}
