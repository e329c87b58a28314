use crate::error::RepositoryError;
use crate::models::{PriceChange, PriceSnapshot};
use crate::repositories::PriceHistoryStore;
use crate::services::price_source::PriceSource;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Produces the current price snapshot, preferring the live feed over
/// stored history over the static defaults.
pub struct PriceResolutionService {
    source: Arc<dyn PriceSource>,
    history: Arc<dyn PriceHistoryStore>,
}

impl PriceResolutionService {
    pub fn new(source: Arc<dyn PriceSource>, history: Arc<dyn PriceHistoryStore>) -> Self {
        Self { source, history }
    }

    /// Resolve current prices. Never fails; degraded results carry
    /// `is_fallback = true`.
    pub async fn resolve_current_prices(&self) -> PriceSnapshot {
        let source_err = match self.source.fetch_live_prices().await {
            Ok(mut snapshot) => {
                snapshot.is_fallback = false;
                if let Err(e) = self.history.append(&snapshot).await {
                    warn!("Failed to persist live price snapshot: {}", e);
                }
                info!(
                    gram = %snapshot.gram,
                    recorded_at = %snapshot.recorded_at,
                    "Resolved live gold prices"
                );
                return snapshot;
            }
            Err(e) => e,
        };

        warn!("Live price feed unavailable: {}", source_err);

        match self.history.latest().await {
            Ok(snapshot) => {
                info!(
                    recorded_at = %snapshot.recorded_at,
                    "Serving last recorded gold prices"
                );
                snapshot.into_fallback()
            }
            Err(e) => {
                if e.is_not_found() {
                    warn!("No recorded gold prices, serving static defaults");
                } else {
                    error!("Price history unavailable, serving static defaults: {}", e);
                }
                PriceSnapshot::defaults(Utc::now())
            }
        }
    }

    /// Stored history, newest first
    pub async fn history(&self, limit: usize) -> Result<Vec<PriceSnapshot>, RepositoryError> {
        self.history.recent(limit).await
    }

    /// Movement between the two most recent stored snapshots
    pub async fn latest_change(&self) -> Result<PriceChange, RepositoryError> {
        let recent = self.history.recent(2).await?;
        match recent.as_slice() {
            [current, previous] => Ok(PriceChange::between(previous, current)),
            _ => Err(RepositoryError::NotFound(
                "At least two recorded snapshots are required".to_string(),
            )),
        }
    }
}
