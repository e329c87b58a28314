use crate::error::RepositoryError;
use crate::models::{Gift, GiftType, GiftUpdate, NewGift};
use crate::repositories::GiftStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const GIFT_COLUMNS: &str = r#"
    id,
    owner_id,
    event_id,
    gift_type,
    quantity,
    gift_value,
    current_value,
    from_person,
    created_at,
    updated_at
"#;

/// Repository for gift data access. Every query is scoped by owner.
pub struct GiftRepository {
    pool: PgPool,
}

impl GiftRepository {
    /// Create a new GiftRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a gift under one of the owner's events.
    /// The current value starts equal to the recorded value.
    pub async fn create(&self, owner_id: Uuid, input: &NewGift) -> Result<Gift, RepositoryError> {
        input.validate().map_err(RepositoryError::InvalidInput)?;

        let sql = format!(
            r#"
            INSERT INTO gifts (event_id, owner_id, gift_type, quantity, gift_value, current_value, from_person)
            SELECT e.id, e.owner_id, $3, $4, $5, $5, $6
            FROM events e
            WHERE e.id = $1 AND e.owner_id = $2
            RETURNING {}
            "#,
            GIFT_COLUMNS
        );

        sqlx::query_as::<_, Gift>(&sql)
            .bind(input.event_id)
            .bind(owner_id)
            .bind(input.gift_type.as_str())
            .bind(input.quantity)
            .bind(input.gift_value)
            .bind(input.from_person.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Event {} not found", input.event_id)))
    }

    /// Find a gift by UUID
    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Gift>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM gifts WHERE id = $1 AND owner_id = $2",
            GIFT_COLUMNS
        );

        Ok(sqlx::query_as::<_, Gift>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Update the recorded fields of a gift. Cash keeps current value in
    /// step with its recorded value.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &GiftUpdate,
    ) -> Result<Gift, RepositoryError> {
        if matches!(changes.quantity, Some(q) if q <= 0) {
            return Err(RepositoryError::InvalidInput(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        if matches!(changes.gift_value, Some(v) if v < Decimal::ZERO) {
            return Err(RepositoryError::InvalidInput(
                "Gift value must not be negative".to_string(),
            ));
        }

        let sql = format!(
            r#"
            UPDATE gifts
            SET quantity = COALESCE($3, quantity),
                gift_value = COALESCE($4, gift_value),
                current_value = CASE
                    WHEN gift_type = '{cash}' THEN COALESCE($4, gift_value)
                    ELSE current_value
                END,
                from_person = COALESCE($5, from_person),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {columns}
            "#,
            cash = GiftType::Cash.as_str(),
            columns = GIFT_COLUMNS
        );

        sqlx::query_as::<_, Gift>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(changes.quantity)
            .bind(changes.gift_value)
            .bind(changes.from_person.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Gift {} not found", id)))
    }

    /// Delete a gift. Returns false when nothing matched.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM gifts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GiftStore for GiftRepository {
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Vec<Gift>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM gifts
            WHERE owner_id = $1 AND ($2::uuid IS NULL OR event_id = $2)
            ORDER BY created_at DESC
            "#,
            GIFT_COLUMNS
        );

        Ok(sqlx::query_as::<_, Gift>(&sql)
            .bind(owner_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_non_cash_by_owner(&self, owner_id: Uuid) -> Result<Vec<Gift>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM gifts WHERE owner_id = $1 AND gift_type <> $2",
            GIFT_COLUMNS
        );

        Ok(sqlx::query_as::<_, Gift>(&sql)
            .bind(owner_id)
            .bind(GiftType::Cash.as_str())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_current_value(
        &self,
        owner_id: Uuid,
        gift_id: Uuid,
        current_value: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE gifts
            SET current_value = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(gift_id)
        .bind(owner_id)
        .bind(current_value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Gift {} not found", gift_id)));
        }
        Ok(())
    }
}
