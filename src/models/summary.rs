use rust_decimal::Decimal;
use serde::Serialize;

use super::gift::Gift;

/// Totals over a set of gifts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gold: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    pub gift_count: usize,
}

impl ValueSummary {
    pub fn from_gifts<'a, I>(gifts: I) -> Self
    where
        I: IntoIterator<Item = &'a Gift>,
    {
        gifts.into_iter().fold(Self::default(), |mut acc, gift| {
            let value = gift.effective_value();
            if gift.is_cash() {
                acc.cash += value;
            } else {
                acc.gold += value;
            }
            acc.total += value;
            acc.gift_count += 1;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GiftType, NewGift};
    use uuid::Uuid;

    fn gift(gift_type: GiftType, value: i64, current: Option<i64>) -> Gift {
        let mut gift = Gift::new(
            Uuid::new_v4(),
            NewGift {
                event_id: Uuid::new_v4(),
                gift_type,
                quantity: 1,
                gift_value: Decimal::new(value, 0),
                from_person: None,
            },
        );
        gift.current_value = current.map(|v| Decimal::new(v, 0));
        gift
    }

    #[test]
    fn test_summary_splits_gold_and_cash() {
        let gifts = vec![
            gift(GiftType::Cash, 1000, Some(1000)),
            gift(GiftType::Gram, 2000, Some(2500)),
            gift(GiftType::FullCoin, 15000, None),
        ];
        let summary = ValueSummary::from_gifts(&gifts);
        assert_eq!(summary.cash, Decimal::new(1000, 0));
        assert_eq!(summary.gold, Decimal::new(17500, 0));
        assert_eq!(summary.total, Decimal::new(18500, 0));
        assert_eq!(summary.gift_count, 3);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ValueSummary::from_gifts(std::iter::empty::<&Gift>());
        assert_eq!(summary, ValueSummary::default());
    }
}
