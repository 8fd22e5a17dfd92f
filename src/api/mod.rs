pub mod accounts;
pub mod admin;
pub mod calc;
pub mod economy;
pub mod events;
pub mod health;
pub mod leaderboard;

use crate::config::Config;
use crate::db::{LedgerStore, WebWallet};
use crate::orchestration::{Economy, OrderRunner};
use crate::purchase::PurchaseApi;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub economy: Arc<Economy>,
    pub orders: Arc<OrderRunner>,
    pub wallet: Arc<dyn WebWallet>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the services over one store that holds both ledgers.
    pub fn new<S>(config: Config, store: Arc<S>, purchase: Arc<dyn PurchaseApi>) -> Self
    where
        S: LedgerStore + WebWallet + 'static,
    {
        let ledger: Arc<dyn LedgerStore> = store.clone();
        let wallet: Arc<dyn WebWallet> = store;

        let rules = config.rules.clone();
        let role_ids = config.role_ids.clone();
        let economy = match config.rng_seed {
            Some(seed) => Economy::with_seed(ledger, rules, role_ids, seed),
            None => Economy::new(ledger, rules, role_ids),
        };
        let orders = OrderRunner::new(purchase, wallet.clone(), config.purchase.clone());

        Self {
            economy: Arc::new(economy),
            orders: Arc::new(orders),
            wallet,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/events/message", post(events::post_message))
        .route("/v1/accounts/:id", get(accounts::get_profile))
        .route("/v1/accounts/:id/language", post(accounts::set_language))
        .route("/v1/accounts/:id/faction", post(accounts::set_faction))
        .route("/v1/daily", post(economy::claim_daily))
        .route("/v1/exchange", post(economy::exchange))
        .route("/v1/transfer", post(economy::transfer))
        .route("/v1/wager", post(economy::wager))
        .route("/v1/leaderboard", get(leaderboard::get_leaderboard))
        .route("/v1/calc", post(calc::project))
        .route("/v1/admin/credit", post(admin::credit))
        .route("/v1/admin/web-balance", post(admin::adjust_web_balance))
        .route("/v1/admin/orders", post(admin::run_order))
        .layer(cors)
        .with_state(state)
}
