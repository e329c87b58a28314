//! Domain models for the gift ledger.
//!
//! Database-backed records (events, gifts, price history rows) and the
//! value types the price pipeline passes around.

pub mod event;
pub mod gift;
pub mod price_snapshot;
pub mod summary;

// Re-export all models for convenient access
pub use event::{Event, EventUpdate, NewEvent};
pub use gift::{Gift, GiftType, GiftUpdate, NewGift};
pub use price_snapshot::{Instrument, PriceChange, PriceSnapshot, PriceSnapshotRow};
pub use summary::ValueSummary;
