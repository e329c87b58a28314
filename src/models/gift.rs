use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::price_snapshot::Instrument;

/// Kind of gift. Gold types track the price feed, cash never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GiftType {
    Gram,
    QuarterCoin,
    HalfCoin,
    FullCoin,
    #[serde(rename = "bracelet22k")]
    Bracelet22k,
    Cash,
}

impl GiftType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "gram" => Ok(GiftType::Gram),
            "quarter" => Ok(GiftType::QuarterCoin),
            "half" => Ok(GiftType::HalfCoin),
            "full_gold" => Ok(GiftType::FullCoin),
            "bracelet22k" => Ok(GiftType::Bracelet22k),
            "cash" => Ok(GiftType::Cash),
            _ => Err(format!("Invalid gift type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftType::Gram => "gram",
            GiftType::QuarterCoin => "quarter",
            GiftType::HalfCoin => "half",
            GiftType::FullCoin => "full_gold",
            GiftType::Bracelet22k => "bracelet22k",
            GiftType::Cash => "cash",
        }
    }

    /// Priced instrument backing this gift type, if any
    pub fn instrument(&self) -> Option<Instrument> {
        match self {
            GiftType::Gram => Some(Instrument::Gram),
            GiftType::QuarterCoin => Some(Instrument::QuarterCoin),
            GiftType::HalfCoin => Some(Instrument::HalfCoin),
            GiftType::FullCoin => Some(Instrument::FullCoin),
            GiftType::Bracelet22k => Some(Instrument::Bracelet22k),
            GiftType::Cash => None,
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, GiftType::Cash)
    }
}

impl From<GiftType> for String {
    fn from(gift_type: GiftType) -> Self {
        gift_type.as_str().to_string()
    }
}

/// A recorded gift, gold or cash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub event_id: Uuid,
    pub gift_type: String, // Stored as TEXT, use GiftType for type safety
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub gift_value: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub current_value: Option<Decimal>,
    pub from_person: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gift {
    /// Build a gift from user input; current value starts at the recorded value
    pub fn new(owner_id: Uuid, input: NewGift) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            event_id: input.event_id,
            gift_type: input.gift_type.as_str().to_string(),
            quantity: input.quantity,
            gift_value: input.gift_value,
            current_value: Some(input.gift_value),
            from_person: input.from_person,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get gift type as an enum
    pub fn type_enum(&self) -> Result<GiftType, String> {
        GiftType::from_str(&self.gift_type)
    }

    /// Cash gifts, and rows with an unknown type, are never revalued
    pub fn is_cash(&self) -> bool {
        self.type_enum().map(|t| t.is_cash()).unwrap_or(false)
    }

    /// Worth used for totals: the last valuation, else the recorded value
    pub fn effective_value(&self) -> Decimal {
        if self.is_cash() {
            return self.gift_value;
        }
        self.current_value.unwrap_or(self.gift_value)
    }
}

/// Input for recording a gift
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGift {
    pub event_id: Uuid,
    pub gift_type: GiftType,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub gift_value: Decimal,
    pub from_person: Option<String>,
}

impl NewGift {
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity <= 0 {
            return Err("Quantity must be greater than zero".to_string());
        }
        if self.gift_value < Decimal::ZERO {
            return Err("Gift value must not be negative".to_string());
        }
        Ok(())
    }
}

/// Partial update of a gift's recorded fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftUpdate {
    pub quantity: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub gift_value: Option<Decimal>,
    pub from_person: Option<String>,
}
