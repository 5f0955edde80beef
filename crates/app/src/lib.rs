//! Fellowship application composition root
//!
//! Picks a storage backend, builds the token service, and mounts the groups
//! domain router next to the infrastructure routes.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use fellowship_auth::{AuthConfig, TokenService};
use fellowship_common::config::Config;
use fellowship_groups::{GroupsState, InviteWorkflow, MembershipManager, MemoryStore, PgStore, Store};

/// Create the main application router from configuration
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            tracing::info!("Using PostgreSQL store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let auth_config = AuthConfig::from_pem_files(
        &config.token_signing_key_path,
        &config.token_verifying_key_path,
        config.token_issuer.clone(),
    )?;
    let tokens = TokenService::new(&auth_config)?;

    Ok(build_router(store, tokens, config.storage_timeout()))
}

/// Compose the router around an already constructed store and token service
pub fn build_router(store: Arc<dyn Store>, tokens: TokenService, storage_timeout: Duration) -> Router {
    let groups_state = GroupsState {
        membership: MembershipManager::new(store.clone(), storage_timeout),
        invites: InviteWorkflow::new(store, storage_timeout),
        tokens,
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async {
                concat!("Fellowship API v", env!("CARGO_PKG_VERSION"))
            }),
        )
        .merge(fellowship_groups::routes().with_state(groups_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
