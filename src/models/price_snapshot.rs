use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::gift::GiftType;

/// Decimal places of the ledger currency
pub const CURRENCY_SCALE: u32 = 2;

// Static floor used when neither the live feed nor history is available.
// These are opaque configuration values, not derived from gram weight.
pub const DEFAULT_GRAM: Decimal = Decimal::from_parts(245075, 0, 0, false, 2);
pub const DEFAULT_QUARTER_COIN: Decimal = Decimal::from_parts(405050, 0, 0, false, 2);
pub const DEFAULT_HALF_COIN: Decimal = Decimal::from_parts(810025, 0, 0, false, 2);
pub const DEFAULT_FULL_COIN: Decimal = Decimal::from_parts(1620050, 0, 0, false, 2);
pub const DEFAULT_BRACELET_22K: Decimal = Decimal::from_parts(2100000, 0, 0, false, 2);

/// The five priced gold instruments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Instrument {
    Gram,
    QuarterCoin,
    HalfCoin,
    FullCoin,
    #[serde(rename = "bracelet22k")]
    Bracelet22k,
}

impl Instrument {
    pub const ALL: [Instrument; 5] = [
        Instrument::Gram,
        Instrument::QuarterCoin,
        Instrument::HalfCoin,
        Instrument::FullCoin,
        Instrument::Bracelet22k,
    ];

    /// Name of the instrument in the upstream feed
    pub fn feed_name(&self) -> &'static str {
        match self {
            Instrument::Gram => "Gram Altın",
            Instrument::QuarterCoin => "Çeyrek Altın",
            Instrument::HalfCoin => "Yarım Altın",
            Instrument::FullCoin => "Tam Altın",
            Instrument::Bracelet22k => "22 Ayar Bilezik",
        }
    }

    /// Per-field default used when the feed omits this instrument
    pub fn default_price(&self) -> Decimal {
        match self {
            Instrument::Gram => DEFAULT_GRAM,
            Instrument::QuarterCoin => DEFAULT_QUARTER_COIN,
            Instrument::HalfCoin => DEFAULT_HALF_COIN,
            Instrument::FullCoin => DEFAULT_FULL_COIN,
            Instrument::Bracelet22k => DEFAULT_BRACELET_22K,
        }
    }
}

/// One coherent set of instrument prices at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    #[serde(with = "rust_decimal::serde::float")]
    pub gram: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quarter_coin: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub half_coin: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub full_coin: Decimal,
    #[serde(rename = "bracelet22k", with = "rust_decimal::serde::float")]
    pub bracelet_22k: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub is_fallback: bool,
}

impl PriceSnapshot {
    /// Build a live snapshot from a per-instrument lookup
    pub fn from_lookup<F>(recorded_at: DateTime<Utc>, mut price_of: F) -> Self
    where
        F: FnMut(Instrument) -> Decimal,
    {
        Self {
            gram: price_of(Instrument::Gram),
            quarter_coin: price_of(Instrument::QuarterCoin),
            half_coin: price_of(Instrument::HalfCoin),
            full_coin: price_of(Instrument::FullCoin),
            bracelet_22k: price_of(Instrument::Bracelet22k),
            recorded_at,
            is_fallback: false,
        }
    }

    /// The static floor snapshot, flagged as fallback
    pub fn defaults(recorded_at: DateTime<Utc>) -> Self {
        Self {
            is_fallback: true,
            ..Self::from_lookup(recorded_at, |i| i.default_price())
        }
    }

    /// Mark this snapshot as sourced from something other than the live feed
    pub fn into_fallback(mut self) -> Self {
        self.is_fallback = true;
        self
    }

    /// Price of a single instrument
    pub fn price(&self, instrument: Instrument) -> Decimal {
        match instrument {
            Instrument::Gram => self.gram,
            Instrument::QuarterCoin => self.quarter_coin,
            Instrument::HalfCoin => self.half_coin,
            Instrument::FullCoin => self.full_coin,
            Instrument::Bracelet22k => self.bracelet_22k,
        }
    }

    /// Unit price for a gift type; cash has no market price
    pub fn unit_price(&self, gift_type: GiftType) -> Option<Decimal> {
        gift_type.instrument().map(|i| self.price(i))
    }

    /// All five prices are non-negative
    pub fn validate(&self) -> Result<(), String> {
        for instrument in Instrument::ALL {
            if self.price(instrument) < Decimal::ZERO {
                return Err(format!("Negative price for {:?}", instrument));
            }
        }
        Ok(())
    }
}

/// Row of the gold_price_history table
#[derive(Debug, Clone, FromRow)]
pub struct PriceSnapshotRow {
    pub id: Uuid,
    pub gram_gold: Decimal,
    pub quarter_gold: Decimal,
    pub half_gold: Decimal,
    pub full_gold: Decimal,
    pub bracelet22k: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl From<PriceSnapshotRow> for PriceSnapshot {
    fn from(row: PriceSnapshotRow) -> Self {
        Self {
            gram: row.gram_gold,
            quarter_coin: row.quarter_gold,
            half_coin: row.half_gold,
            full_coin: row.full_gold,
            bracelet_22k: row.bracelet22k,
            recorded_at: row.recorded_at,
            // Only live snapshots are ever persisted
            is_fallback: false,
        }
    }
}

/// Per-instrument movement between two observations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    #[serde(with = "rust_decimal::serde::float")]
    pub gram: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quarter_coin: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub half_coin: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub full_coin: Decimal,
    #[serde(rename = "bracelet22k", with = "rust_decimal::serde::float")]
    pub bracelet_22k: Decimal,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl PriceChange {
    /// Change from `previous` to `current`
    pub fn between(previous: &PriceSnapshot, current: &PriceSnapshot) -> Self {
        Self {
            gram: current.gram - previous.gram,
            quarter_coin: current.quarter_coin - previous.quarter_coin,
            half_coin: current.half_coin - previous.half_coin,
            full_coin: current.full_coin - previous.full_coin,
            bracelet_22k: current.bracelet_22k - previous.bracelet_22k,
            from: previous.recorded_at,
            to: current.recorded_at,
        }
    }
}
