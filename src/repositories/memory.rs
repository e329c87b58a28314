//! In-process stores with the same trait surface as the Postgres repositories.

use crate::error::RepositoryError;
use crate::models::{Gift, GiftType, PriceSnapshot};
use crate::repositories::{GiftStore, PriceHistoryStore};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Price history held in memory, append-only
#[derive(Default)]
pub struct InMemoryPriceHistory {
    rows: RwLock<Vec<PriceSnapshot>>,
}

impl InMemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl PriceHistoryStore for InMemoryPriceHistory {
    async fn append(&self, snapshot: &PriceSnapshot) -> Result<(), RepositoryError> {
        snapshot.validate().map_err(RepositoryError::InvalidInput)?;

        let mut rows = self.rows.write().await;
        let mut stored = snapshot.clone();
        stored.is_fallback = false;
        if let Some(newest) = rows.last() {
            if stored.recorded_at < newest.recorded_at {
                stored.recorded_at = newest.recorded_at;
            }
        }
        rows.push(stored);
        Ok(())
    }

    async fn latest(&self) -> Result<PriceSnapshot, RepositoryError> {
        self.rows
            .read()
            .await
            .last()
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("No price snapshot recorded".to_string()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PriceSnapshot>, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Gifts held in memory, keyed by id
#[derive(Default)]
pub struct InMemoryGiftStore {
    gifts: RwLock<HashMap<Uuid, Gift>>,
}

impl InMemoryGiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a gift
    pub async fn insert(&self, gift: Gift) {
        self.gifts.write().await.insert(gift.id, gift);
    }

    /// Fetch a gift regardless of owner
    pub async fn get(&self, id: Uuid) -> Option<Gift> {
        self.gifts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl GiftStore for InMemoryGiftStore {
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Vec<Gift>, RepositoryError> {
        let mut found: Vec<Gift> = self
            .gifts
            .read()
            .await
            .values()
            .filter(|g| g.owner_id == owner_id)
            .filter(|g| event_id.map_or(true, |e| g.event_id == e))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_non_cash_by_owner(&self, owner_id: Uuid) -> Result<Vec<Gift>, RepositoryError> {
        Ok(self
            .gifts
            .read()
            .await
            .values()
            .filter(|g| g.owner_id == owner_id && g.gift_type != GiftType::Cash.as_str())
            .cloned()
            .collect())
    }

    async fn update_current_value(
        &self,
        owner_id: Uuid,
        gift_id: Uuid,
        current_value: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut gifts = self.gifts.write().await;
        match gifts.get_mut(&gift_id) {
            Some(gift) if gift.owner_id == owner_id => {
                gift.current_value = Some(current_value);
                gift.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Gift {} not found", gift_id))),
        }
    }
}
