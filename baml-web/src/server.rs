use anyhow::Result;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::security;

pub struct AppState {
    pub pack_dir: PathBuf,
}

pub struct PackServer {
    state: Arc<AppState>,
}

impl PackServer {
    pub fn new(pack_dir: PathBuf) -> Result<Self> {
        if !pack_dir.is_dir() {
            anyhow::bail!("pack directory does not exist: {}", pack_dir.display());
        }
        let state = Arc::new(AppState { pack_dir });
        Ok(Self { state })
    }

    pub async fn run(self) -> Result<()> {
        let pack_dir = self.state.pack_dir.clone();
        let app = Router::new()
            .nest("/api", routes::api_routes())
            // File mods are fetched straight out of the pack, the same
            // layout the catalog paths use.
            .fallback_service(ServeDir::new(pack_dir))
            // The game page fetches mods from a different origin.
            .layer(CorsLayer::permissive())
            .with_state(self.state);

        let addr = security::bind_address();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Mod pack server running at http://{}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
