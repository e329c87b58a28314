//! Gift Ledger Library
//!
//! Gold-price acquisition with layered fallback, price history, and
//! revaluation of recorded wedding gifts.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use api::build_router;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use config::PriceFeedConfig;
use database::Database;
use repositories::{GiftRepository, GiftStore, PriceHistoryRepository, PriceHistoryStore};
use services::{
    CollectApiPriceSource, GiftValuationUpdater, PortfolioService, PriceResolutionService,
    PriceSource,
};
use std::sync::Arc;

/// Application state shared by the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub prices: Arc<PriceResolutionService>,
    pub valuation: Arc<GiftValuationUpdater>,
    pub portfolio: Arc<PortfolioService>,
    /// Present when backed by Postgres; probed by the health check
    pub database: Option<Database>,
}

impl AppState {
    /// Wire services from explicit collaborators
    pub fn new(
        source: Arc<dyn PriceSource>,
        history: Arc<dyn PriceHistoryStore>,
        gifts: Arc<dyn GiftStore>,
    ) -> Self {
        Self {
            prices: Arc::new(PriceResolutionService::new(source, history)),
            valuation: Arc::new(GiftValuationUpdater::new(gifts.clone())),
            portfolio: Arc::new(PortfolioService::new(gifts)),
            database: None,
        }
    }

    /// Wire services against Postgres and the configured price feed
    pub fn from_pool(pool: sqlx::PgPool, feed: &PriceFeedConfig) -> AppResult<Self> {
        let source = CollectApiPriceSource::new(feed)
            .map_err(|e| AppError::Config(format!("Price feed client: {}", e)))?;

        let mut state = Self::new(
            Arc::new(source),
            Arc::new(PriceHistoryRepository::new(pool.clone())),
            Arc::new(GiftRepository::new(pool.clone())),
        );
        state.database = Some(Database::new(pool));
        Ok(state)
    }
}
