use std::net::SocketAddr;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{catalog::Catalog, ledger::VoteLedger, storage::Storage};

mod auth;
mod handlers;
mod models;

use handlers::{
    add_items, clear_votes, delete_item, export, gallery, get_favorite, health, leaderboard,
    list_items, not_found, remove_voter, set_favorite, switch_favorite, toggle_like, wipe_items,
};

#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub storage: S,
    pub ledger: VoteLedger<S>,
    pub catalog: Catalog<S>,
    pub admin_secret: String,
    pub page_size: usize,
    pub started_at: std::time::SystemTime,
}

impl<S: Storage + Clone> AppState<S> {
    pub fn new(storage: S, admin_secret: String, page_size: usize) -> Self {
        Self {
            ledger: VoteLedger::new(storage.clone()),
            catalog: Catalog::new(storage.clone()),
            storage,
            admin_secret,
            page_size,
            started_at: std::time::SystemTime::now(),
        }
    }
}

pub fn router<S: Storage + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route(
            "/items",
            get(list_items::<S>)
                .post(add_items::<S>)
                .delete(wipe_items::<S>),
        )
        .route("/items/:id", delete(delete_item::<S>))
        .route(
            "/voters/:voter_key/likes/:item_id",
            post(toggle_like::<S>),
        )
        .route(
            "/voters/:voter_key/favorite",
            get(get_favorite::<S>).put(set_favorite::<S>),
        )
        .route(
            "/voters/:voter_key/favorite/switch",
            post(switch_favorite::<S>),
        )
        .route("/voters/:voter_key", delete(remove_voter::<S>))
        .route("/votes", delete(clear_votes::<S>))
        .route("/gallery", get(gallery::<S>))
        .route("/leaderboard", get(leaderboard::<S>))
        .route("/export", get(export::<S>))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    state: AppState<S>,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", addr);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
