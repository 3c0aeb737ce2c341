use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

/// One borrower row from the risky-position sweep.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserPosition {
    pub user_address: String,
    pub health_factor: f64,
    pub total_supplied: f64,
    pub total_borrowed: f64,
}

/// A supplier holding at least the whale share of total supply.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WhalePosition {
    pub user_address: String,
    pub total_supplied: f64,
    pub percentage: f64,
}

/// One of the largest borrowers, with its share of total borrows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BorrowerShare {
    pub user_address: String,
    pub total_borrowed: f64,
    pub percentage: f64,
}

/// Protocol-wide aggregates computed in one round trip.
#[derive(Debug, Clone, Default)]
pub struct AggregateMetrics {
    pub total_positions: i64,
    pub risky_positions: i64,
    pub total_supplied: f64,
    pub total_borrowed: f64,
    pub weighted_avg_hf: f64,
}

/// Read-only access to the externally maintained `UserPositions` table.
#[derive(Clone)]
pub struct PositionStore {
    pool: PgPool,
}

impl PositionStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to open database")?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .context("failed to ping database")?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn aggregate_metrics(&self) -> Result<AggregateMetrics> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_positions,
                COUNT(*) FILTER (WHERE health_factor > 0 AND health_factor < 1.2) AS risky_positions,
                COALESCE(SUM(total_supplied), 0) AS total_supplied,
                COALESCE(SUM(total_borrowed), 0) AS total_borrowed,
                COALESCE(SUM(LEAST(health_factor, 100) * total_borrowed), 0) AS weighted_hf_sum
            FROM public."UserPositions"
            WHERE health_factor > 0 AND health_factor < 1000
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("aggregate query failed")?;

        let total_borrowed: f64 = row.try_get("total_borrowed")?;
        let weighted_hf_sum: f64 = row.try_get("weighted_hf_sum")?;

        Ok(AggregateMetrics {
            total_positions: row.try_get("total_positions")?,
            risky_positions: row.try_get("risky_positions")?,
            total_supplied: row.try_get("total_supplied")?,
            total_borrowed,
            weighted_avg_hf: weighted_avg_hf(weighted_hf_sum, total_borrowed),
        })
    }

    /// Positions below the risk threshold, most endangered first.
    pub async fn risky_positions(&self, threshold: f64, limit: i64) -> Result<Vec<UserPosition>> {
        sqlx::query_as(
            r#"
            SELECT user_address, health_factor, total_supplied, total_borrowed
            FROM public."UserPositions"
            WHERE health_factor > 0 AND health_factor < $1
            ORDER BY health_factor ASC
            LIMIT $2
            "#,
        )
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("risky positions query failed")
    }

    /// Most recent position update, or None when the table is empty.
    pub async fn last_update(&self) -> Result<Option<DateTime<Utc>>> {
        sqlx::query_scalar(r#"SELECT MAX(last_updated) FROM public."UserPositions""#)
            .fetch_one(&self.pool)
            .await
            .context("freshness query failed")
    }

    /// Suppliers at or above `min_share` percent of total supply.
    pub async fn whale_positions(&self, min_share: f64) -> Result<Vec<WhalePosition>> {
        sqlx::query_as(
            r#"
            WITH total AS (
                SELECT SUM(total_supplied) AS total_supply
                FROM public."UserPositions"
                WHERE total_supplied > 0
            )
            SELECT
                user_address,
                total_supplied,
                (total_supplied / total.total_supply * 100) AS percentage
            FROM public."UserPositions", total
            WHERE total_supplied > 0
                AND (total_supplied / total.total_supply * 100) >= $1
            ORDER BY percentage DESC
            "#,
        )
        .bind(min_share)
        .fetch_all(&self.pool)
        .await
        .context("whale query failed")
    }

    pub async fn total_borrowed(&self) -> Result<f64> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_borrowed), 0)
            FROM public."UserPositions"
            WHERE total_borrowed > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("total borrows query failed")
    }

    /// Largest borrowers with their share of `total`.
    pub async fn top_borrowers(&self, total: f64, limit: i64) -> Result<Vec<BorrowerShare>> {
        sqlx::query_as(
            r#"
            SELECT
                user_address,
                total_borrowed,
                (total_borrowed / $1 * 100) AS percentage
            FROM public."UserPositions"
            WHERE total_borrowed > 0
            ORDER BY total_borrowed DESC
            LIMIT $2
            "#,
        )
        .bind(total)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("top borrowers query failed")
    }
}

/// Borrow-weighted mean health factor. Users with more debt weigh more,
/// the cap keeps outlier positions from hiding real drift, and an empty
/// borrow book reads as maximally healthy.
pub(crate) fn weighted_avg_hf(weighted_hf_sum: f64, total_borrowed: f64) -> f64 {
    if total_borrowed > 0.0 {
        (weighted_hf_sum / total_borrowed).min(100.0)
    } else {
        999.0
    }
}
