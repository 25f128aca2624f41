// In crates/database/src/lib.rs

use app_config::types::DatabaseSettings;
use chrono::{DateTime, Utc};
use core_types::{PlanTier, RawTrade, UserId};
use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::str::FromStr;
use tracing::debug;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{CachedInsightRow, ImportSummary, PlanRow, TradeFilters, TradeRow};

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(PgPool);

/// Establishes a connection pool to the PostgreSQL database and runs
/// migrations.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;

    // Run database migrations. This ensures the database schema is up-to-date.
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(Error::from)?;

    Ok(Db(pool))
}

impl Db {
    /// Lists a user's trades, optionally narrowed to one import batch, one
    /// linked account, and a date window. Ordered ascending by trade date.
    ///
    /// No pagination contract: the analytics engine consumes the full
    /// filtered collection.
    pub async fn list_trades(
        &self,
        user_id: &UserId,
        filters: &TradeFilters,
    ) -> Result<Vec<RawTrade>> {
        let rows = sqlx::query_as::<_, TradeRow>(
            r#"
            SELECT id, trade_date, pair, entry_price, exit_price, pips,
                   profit_dollar, risk_reward, tags, entry_time, exit_time
            FROM trades
            WHERE user_id = $1
              AND ($2::text IS NULL OR import_id = $2)
              AND ($3::text IS NULL OR account_id = $3)
              AND ($4::date IS NULL OR trade_date >= $4)
              AND ($5::date IS NULL OR trade_date <= $5)
            ORDER BY trade_date ASC, id ASC
            "#,
        )
        .bind(&user_id.0)
        .bind(&filters.import_id)
        .bind(&filters.account_id)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        debug!(user = %user_id, count = rows.len(), "listed trades");
        Ok(rows.into_iter().map(RawTrade::from).collect())
    }

    /// Fetches an import batch's summary, used to seed the balance drawdown.
    pub async fn get_import_summary(&self, import_id: &str) -> Result<Option<ImportSummary>> {
        sqlx::query_as::<_, ImportSummary>(
            "SELECT id, starting_balance FROM imports WHERE id = $1",
        )
        .bind(import_id)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)
    }

    /// The current balance of a linked broker account.
    pub async fn get_linked_account_balance(&self, account_id: &str) -> Result<Option<Decimal>> {
        let row: Option<(Decimal,)> =
            sqlx::query_as("SELECT balance FROM linked_accounts WHERE id = $1")
                .bind(account_id)
                .fetch_optional(&self.0)
                .await
                .map_err(Error::OperationFailed)?;
        Ok(row.map(|(balance,)| balance))
    }

    /// Reads a cached insight, treating expired entries as a miss.
    pub async fn get_cached_insight(
        &self,
        user_id: &UserId,
        cache_key: &str,
    ) -> Result<Option<CachedInsightRow>> {
        sqlx::query_as::<_, CachedInsightRow>(
            r#"
            SELECT response_text, expires_at
            FROM insight_cache
            WHERE user_id = $1 AND cache_key = $2 AND expires_at > NOW()
            "#,
        )
        .bind(&user_id.0)
        .bind(cache_key)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)
    }

    /// Writes (or replaces) a cached insight with a fresh expiry.
    pub async fn upsert_cached_insight(
        &self,
        user_id: &UserId,
        cache_key: &str,
        response_text: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO insight_cache (user_id, cache_key, response_text, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, cache_key)
            DO UPDATE SET response_text = EXCLUDED.response_text,
                          expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&user_id.0)
        .bind(cache_key)
        .bind(response_text)
        .bind(expires_at)
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;
        Ok(())
    }

    /// The user's plan tier and remaining credits. A user without a plan row
    /// is a free user with no credits.
    pub async fn get_plan(&self, user_id: &UserId) -> Result<(PlanTier, i64)> {
        let row = sqlx::query_as::<_, PlanRow>(
            "SELECT tier, credits_remaining FROM user_plans WHERE user_id = $1",
        )
        .bind(&user_id.0)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        match row {
            Some(plan) => Ok((PlanTier::from_str(&plan.tier)?, plan.credits_remaining)),
            None => Ok((PlanTier::Free, 0)),
        }
    }

    /// Atomically consumes `cost` credits if (and only if) enough remain.
    ///
    /// A single conditional UPDATE, so two concurrent requests near the
    /// credit boundary cannot both succeed.
    pub async fn try_consume_credits(&self, user_id: &UserId, cost: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_plans
            SET credits_remaining = credits_remaining - $2
            WHERE user_id = $1 AND credits_remaining >= $2
            "#,
        )
        .bind(&user_id.0)
        .bind(cost)
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Ok(result.rows_affected() > 0)
    }
}
