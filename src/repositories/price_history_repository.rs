use crate::error::RepositoryError;
use crate::models::{PriceSnapshot, PriceSnapshotRow};
use crate::repositories::PriceHistoryStore;
use async_trait::async_trait;
use sqlx::PgPool;

/// Postgres-backed price history (`gold_price_history`)
pub struct PriceHistoryRepository {
    pool: PgPool,
}

impl PriceHistoryRepository {
    /// Create a new PriceHistoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceHistoryStore for PriceHistoryRepository {
    async fn append(&self, snapshot: &PriceSnapshot) -> Result<(), RepositoryError> {
        snapshot.validate().map_err(RepositoryError::InvalidInput)?;

        let mut tx = self.pool.begin().await?;

        // Appends are serialized so the clamp below sees every committed row
        // and recorded_at never moves backwards in commit order. Readers are
        // not blocked by this lock mode.
        sqlx::query("LOCK TABLE gold_price_history IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO gold_price_history
                (gram_gold, quarter_gold, half_gold, full_gold, bracelet22k, recorded_at)
            SELECT $1, $2, $3, $4, $5, GREATEST($6, COALESCE(MAX(recorded_at), $6))
            FROM gold_price_history
            "#,
        )
        .bind(snapshot.gram)
        .bind(snapshot.quarter_coin)
        .bind(snapshot.half_coin)
        .bind(snapshot.full_coin)
        .bind(snapshot.bracelet_22k)
        .bind(snapshot.recorded_at)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn latest(&self) -> Result<PriceSnapshot, RepositoryError> {
        let row = sqlx::query_as::<_, PriceSnapshotRow>(
            r#"
            SELECT id, gram_gold, quarter_gold, half_gold, full_gold, bracelet22k, recorded_at
            FROM gold_price_history
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(PriceSnapshot::from)
            .ok_or_else(|| RepositoryError::NotFound("No price snapshot recorded".to_string()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PriceSnapshot>, RepositoryError> {
        let rows = sqlx::query_as::<_, PriceSnapshotRow>(
            r#"
            SELECT id, gram_gold, quarter_gold, half_gold, full_gold, bracelet22k, recorded_at
            FROM gold_price_history
            ORDER BY recorded_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceSnapshot::from).collect())
    }
}
