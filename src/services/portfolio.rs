use crate::error::RepositoryError;
use crate::models::ValueSummary;
use crate::repositories::GiftStore;
use std::sync::Arc;
use uuid::Uuid;

/// Totals over an owner's gifts
pub struct PortfolioService {
    gifts: Arc<dyn GiftStore>,
}

impl PortfolioService {
    pub fn new(gifts: Arc<dyn GiftStore>) -> Self {
        Self { gifts }
    }

    /// Summarize all gifts of an owner, or of one of their events
    pub async fn summarize(
        &self,
        owner_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<ValueSummary, RepositoryError> {
        let gifts = self.gifts.find_by_owner(owner_id, event_id).await?;
        Ok(ValueSummary::from_gifts(&gifts))
    }
}
