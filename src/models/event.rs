use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named occasion owning zero or more gifts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title must not be empty".to_string());
        }
        Ok(())
    }
}

/// Partial update of an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected() {
        let input = NewEvent {
            title: "   ".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            location: None,
            description: None,
        };
        assert!(input.validate().is_err());
    }
}
