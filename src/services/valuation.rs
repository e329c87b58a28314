use crate::error::RepositoryError;
use crate::models::price_snapshot::CURRENCY_SCALE;
use crate::models::{Gift, PriceSnapshot};
use crate::repositories::GiftStore;
use futures::future::join_all;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A gift whose revaluation could not be written
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftFailure {
    pub gift_id: Uuid,
    pub error: String,
}

/// Outcome of one revaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevaluationReport {
    pub updated: Vec<Uuid>,
    pub failed: Vec<GiftFailure>,
}

impl RevaluationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Value of a gold gift under a snapshot; `None` for cash or unknown types
pub fn gift_value_at(gift: &Gift, snapshot: &PriceSnapshot) -> Option<Decimal> {
    let unit = snapshot.unit_price(gift.type_enum().ok()?)?;
    Some(
        (unit * Decimal::from(gift.quantity))
            .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
    )
}

/// Recomputes `current_value` of every gold gift owned by a user
pub struct GiftValuationUpdater {
    gifts: Arc<dyn GiftStore>,
}

impl GiftValuationUpdater {
    pub fn new(gifts: Arc<dyn GiftStore>) -> Self {
        Self { gifts }
    }

    /// Revalue all non-cash gifts of `owner_id` against `snapshot`.
    ///
    /// Writes are issued concurrently; a failed write is reported in the
    /// returned report and does not stop the others. Only a failure to load
    /// the owner's gifts is returned as an error.
    pub async fn revalue(
        &self,
        owner_id: Uuid,
        snapshot: &PriceSnapshot,
    ) -> Result<RevaluationReport, RepositoryError> {
        let gifts = self.gifts.find_non_cash_by_owner(owner_id).await?;
        let mut report = RevaluationReport::default();

        if gifts.is_empty() {
            debug!(%owner_id, "No gold gifts to revalue");
            return Ok(report);
        }

        let mut writes = Vec::with_capacity(gifts.len());
        for gift in gifts.iter().filter(|g| !g.is_cash()) {
            match gift_value_at(gift, snapshot) {
                Some(value) => writes.push(async move {
                    let result = self
                        .gifts
                        .update_current_value(owner_id, gift.id, value)
                        .await;
                    (gift.id, result)
                }),
                None => report.failed.push(GiftFailure {
                    gift_id: gift.id,
                    error: format!("Unknown gift type: {}", gift.gift_type),
                }),
            }
        }

        for (gift_id, result) in join_all(writes).await {
            match result {
                Ok(()) => report.updated.push(gift_id),
                Err(e) => {
                    warn!(%gift_id, "Failed to update gift value: {}", e);
                    report.failed.push(GiftFailure {
                        gift_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            %owner_id,
            updated = report.updated.len(),
            failed = report.failed.len(),
            is_fallback = snapshot.is_fallback,
            "Revalued gold gifts"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GiftType, NewGift};
    use chrono::Utc;

    fn gift(gift_type: GiftType, quantity: i32) -> Gift {
        Gift::new(
            Uuid::new_v4(),
            NewGift {
                event_id: Uuid::new_v4(),
                gift_type,
                quantity,
                gift_value: Decimal::new(100, 0),
                from_person: None,
            },
        )
    }

    #[test]
    fn test_gift_value_at_multiplies_quantity() {
        let snapshot = PriceSnapshot::defaults(Utc::now());
        let value = gift_value_at(&gift(GiftType::Gram, 4), &snapshot);
        assert_eq!(value, Some(Decimal::new(980300, 2)));
    }

    #[test]
    fn test_gift_value_at_skips_cash() {
        let snapshot = PriceSnapshot::defaults(Utc::now());
        assert_eq!(gift_value_at(&gift(GiftType::Cash, 1), &snapshot), None);
    }

    #[test]
    fn test_gift_value_at_rounds_to_currency_scale() {
        let mut snapshot = PriceSnapshot::defaults(Utc::now());
        snapshot.gram = Decimal::new(1000005, 3); // 1000.005
        let value = gift_value_at(&gift(GiftType::Gram, 1), &snapshot);
        assert_eq!(value, Some(Decimal::new(100001, 2)));
    }

    #[test]
    fn test_unknown_type_has_no_value() {
        let mut g = gift(GiftType::Gram, 1);
        g.gift_type = "platinum".to_string();
        let snapshot = PriceSnapshot::defaults(Utc::now());
        assert_eq!(gift_value_at(&g, &snapshot), None);
    }
}
