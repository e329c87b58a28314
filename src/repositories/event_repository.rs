use crate::error::RepositoryError;
use crate::models::{Event, EventUpdate, NewEvent};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for event data access
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event
    pub async fn create(&self, owner_id: Uuid, input: &NewEvent) -> Result<Event, RepositoryError> {
        input.validate().map_err(RepositoryError::InvalidInput)?;

        Ok(sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (owner_id, title, event_date, location, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id,
                owner_id,
                title,
                event_date,
                location,
                description,
                created_at,
                updated_at
            "#,
        )
        .bind(owner_id)
        .bind(input.title.trim())
        .bind(input.event_date)
        .bind(input.location.as_deref())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await?)
    }

    /// Find an event by UUID
    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        Ok(sqlx::query_as::<_, Event>(
            r#"
            SELECT
                id,
                owner_id,
                title,
                event_date,
                location,
                description,
                created_at,
                updated_at
            FROM events
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Find all events for an owner, most recent date first
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Event>, RepositoryError> {
        Ok(sqlx::query_as::<_, Event>(
            r#"
            SELECT
                id,
                owner_id,
                title,
                event_date,
                location,
                description,
                created_at,
                updated_at
            FROM events
            WHERE owner_id = $1
            ORDER BY event_date DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Update event fields
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &EventUpdate,
    ) -> Result<Event, RepositoryError> {
        if matches!(&changes.title, Some(t) if t.trim().is_empty()) {
            return Err(RepositoryError::InvalidInput(
                "Event title must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($3, title),
                event_date = COALESCE($4, event_date),
                location = COALESCE($5, location),
                description = COALESCE($6, description),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING
                id,
                owner_id,
                title,
                event_date,
                location,
                description,
                created_at,
                updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.title.as_deref().map(str::trim))
        .bind(changes.event_date)
        .bind(changes.location.as_deref())
        .bind(changes.description.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Event {} not found", id)))
    }

    /// Delete an event and, through the foreign key, its gifts
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
