pub mod event_repository;
pub mod gift_repository;
pub mod memory;
pub mod price_history_repository;

// Re-export all repositories for convenient access
pub use event_repository::EventRepository;
pub use gift_repository::GiftRepository;
pub use memory::{InMemoryGiftStore, InMemoryPriceHistory};
pub use price_history_repository::PriceHistoryRepository;

use crate::error::RepositoryError;
use crate::models::{Gift, PriceSnapshot};
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Append-only log of live price snapshots
#[async_trait]
pub trait PriceHistoryStore: Send + Sync {
    /// Append a snapshot. History is never overwritten.
    async fn append(&self, snapshot: &PriceSnapshot) -> Result<(), RepositoryError>;

    /// Most recent snapshot by `recorded_at`; `NotFound` when history is empty
    async fn latest(&self) -> Result<PriceSnapshot, RepositoryError>;

    /// Up to `limit` snapshots, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<PriceSnapshot>, RepositoryError>;
}

/// Owner-scoped gift access needed by valuation and reporting
#[async_trait]
pub trait GiftStore: Send + Sync {
    /// All gifts of an owner, optionally limited to one event, newest first
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Vec<Gift>, RepositoryError>;

    /// Gifts of an owner whose type is not cash
    async fn find_non_cash_by_owner(&self, owner_id: Uuid) -> Result<Vec<Gift>, RepositoryError>;

    /// Overwrite the current value of one gift
    async fn update_current_value(
        &self,
        owner_id: Uuid,
        gift_id: Uuid,
        current_value: Decimal,
    ) -> Result<(), RepositoryError>;
}
