//! soundclash-server - audience-voted music bracket tournaments
//!
//! Single HTTP service: admin lifecycle commands, public bracket views,
//! and vote casting. Round expiry is detected lazily on reads, so no
//! background scheduler runs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use soundclash_common::config::Config;
use soundclash_common::db::init_database;
use soundclash_server::api::auth::AdminAuth;
use soundclash_server::catalog::{DisabledCatalog, SpotifyCatalog, TrackCatalog};
use soundclash_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting soundclash-server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::parse();

    let admin_password = config.require_admin_password()?.to_string();
    let signing_secret = config.resolve_signing_secret()?;
    let auth = AdminAuth::new(&admin_password, &signing_secret);

    let pool = init_database(&config.database_path).await?;
    info!("✓ Database ready at {}", config.database_path.display());

    let catalog: Arc<dyn TrackCatalog> = match config.spotify_credentials() {
        Some((client_id, client_secret)) => {
            info!("✓ Spotify catalog enabled");
            Arc::new(SpotifyCatalog::new(client_id, client_secret))
        }
        None => {
            warn!("Spotify credentials not configured; catalog lookups are disabled");
            Arc::new(DisabledCatalog)
        }
    };

    let state = AppState::new(pool, catalog, auth);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("soundclash-server listening on http://{}", config.bind);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
