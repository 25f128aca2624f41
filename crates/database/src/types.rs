// In crates/database/src/types.rs

use chrono::{DateTime, NaiveDate, Utc};
use core_types::RawTrade;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// One persisted trade row, exactly as stored. Converted to the engine's
/// boundary shape before anything touches it.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub id: String,
    pub trade_date: NaiveDate,
    pub pair: String,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub pips: Option<Decimal>,
    pub profit_dollar: Option<Decimal>,
    pub risk_reward: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
}

impl From<TradeRow> for RawTrade {
    fn from(row: TradeRow) -> Self {
        RawTrade {
            id: row.id,
            trade_date: row.trade_date,
            pair: row.pair,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            pips: row.pips,
            profit_dollar: row.profit_dollar,
            risk_reward: row.risk_reward,
            tags: row.tags,
            entry_time: row.entry_time,
            exit_time: row.exit_time,
        }
    }
}

/// Optional narrowing for a trade listing: one import batch, one linked
/// account, a date window. All of them may be combined.
#[derive(Debug, Clone, Default)]
pub struct TradeFilters {
    pub import_id: Option<String>,
    pub account_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// The subset of an import batch the drawdown calculator cares about.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportSummary {
    pub id: String,
    pub starting_balance: Option<Decimal>,
}

/// One cached insight entry as read back from storage.
#[derive(Debug, Clone, FromRow)]
pub struct CachedInsightRow {
    pub response_text: String,
    pub expires_at: DateTime<Utc>,
}

/// A user's plan tier and remaining credit count for the current period.
#[derive(Debug, Clone, FromRow)]
pub struct PlanRow {
    pub tier: String,
    pub credits_remaining: i64,
}
