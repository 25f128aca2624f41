// In crates/core-types/src/types.rs

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A newtype wrapper for a user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A newtype wrapper for a traded instrument, e.g. "EURUSD".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair(pub String);

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trade row exactly as the persistence layer hands it over.
///
/// Numeric fields are optional because not every data source supplies them
/// (a pips-only import has no dollar P&L). This is the validated boundary
/// shape; everything downstream works with [`CalendarTrade`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrade {
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

/// A normalized, in-memory trade record used by the analytics engine.
///
/// The engine never mutates trades; it only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarTrade {
    pub id: String,
    pub trade_date: NaiveDate,
    pub pair: Pair,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    /// Signed result in instrument-native units.
    pub pips: Decimal,
    /// Signed result in account currency, when the data source supplied one.
    pub profit_dollar: Option<Decimal>,
    pub is_win: bool,
    pub risk_reward: Option<f64>,
    pub tags: Vec<String>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
}

impl CalendarTrade {
    /// Normalizes a raw persisted row into the engine's trade shape.
    ///
    /// The win flag prefers the sign of the dollar P&L and falls back to the
    /// sign of pips when no dollar value exists. Missing numeric fields
    /// become zero. Never fails.
    pub fn from_raw(raw: &RawTrade) -> Self {
        let pips = raw.pips.unwrap_or(Decimal::ZERO);
        let is_win = match raw.profit_dollar {
            Some(dollar) => dollar > Decimal::ZERO,
            None => pips > Decimal::ZERO,
        };

        Self {
            id: raw.id.clone(),
            trade_date: raw.trade_date,
            pair: Pair(raw.pair.clone()),
            entry_price: raw.entry_price.unwrap_or(Decimal::ZERO),
            exit_price: raw.exit_price.unwrap_or(Decimal::ZERO),
            pips,
            profit_dollar: raw.profit_dollar,
            is_win,
            risk_reward: raw.risk_reward,
            tags: raw.tags.clone().unwrap_or_default(),
            entry_time: raw.entry_time,
            exit_time: raw.exit_time,
        }
    }

    /// The signed P&L this trade contributes to aggregations.
    ///
    /// With `use_dollar` set, the dollar value is preferred when present;
    /// otherwise (or when absent) the pips value is used.
    pub fn signed_pnl(&self, use_dollar: bool) -> Decimal {
        if use_dollar {
            self.profit_dollar.unwrap_or(self.pips)
        } else {
            self.pips
        }
    }

    /// How long the position was held, when both timestamps are known.
    pub fn duration(&self) -> Option<Duration> {
        match (self.entry_time, self.exit_time) {
            (Some(entry), Some(exit)) => Some(exit - entry),
            _ => None,
        }
    }
}

/// The reporting window a dashboard request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "14d")]
    D14,
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "90d")]
    D90,
    #[serde(rename = "6m")]
    M6,
    #[serde(rename = "1y")]
    Y1,
    #[serde(rename = "ytd")]
    Ytd,
}

impl Period {
    /// Parses a period token. Unknown tokens fall back to the 30-day window,
    /// which is the documented default rather than an error.
    pub fn parse(token: &str) -> Self {
        match token {
            "all" => Period::All,
            "7d" => Period::D7,
            "14d" => Period::D14,
            "30d" => Period::D30,
            "90d" => Period::D90,
            "6m" => Period::M6,
            "1y" => Period::Y1,
            "ytd" => Period::Ytd,
            _ => Period::D30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::D7 => "7d",
            Period::D14 => "14d",
            Period::D30 => "30d",
            Period::D90 => "90d",
            Period::M6 => "6m",
            Period::Y1 => "1y",
            Period::Ytd => "ytd",
        }
    }

    /// The inclusive lower date bound for this window, or `None` for `all`.
    pub fn lower_bound(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::All => None,
            Period::D7 => Some(today - Duration::days(7)),
            Period::D14 => Some(today - Duration::days(14)),
            Period::D30 => Some(today - Duration::days(30)),
            Period::D90 => Some(today - Duration::days(90)),
            Period::M6 => Some(today.checked_sub_months(Months::new(6)).unwrap_or(today)),
            Period::Y1 => Some(today.checked_sub_months(Months::new(12)).unwrap_or(today)),
            // January 1 of the current year.
            Period::Ytd => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::D30
    }
}

/// A user's subscription tier, as stored by the billing integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Elite,
}

impl PlanTier {
    /// Whether this tier may invoke the given agent class at all.
    ///
    /// Free users get no AI analyses; Pro unlocks one-shot analyses; only
    /// Elite unlocks the conversational copilot.
    pub fn allows(&self, agent: AgentKind) -> bool {
        match (self, agent) {
            (PlanTier::Free, _) => false,
            (PlanTier::Pro, AgentKind::Analysis) => true,
            (PlanTier::Pro, AgentKind::Copilot) => false,
            (PlanTier::Elite, _) => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Elite => "elite",
        }
    }
}

impl FromStr for PlanTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "elite" => Ok(PlanTier::Elite),
            other => Err(Error::UnknownPlanTier(other.to_string())),
        }
    }
}

/// The class of AI-assisted analysis being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// A one-shot report summary.
    Analysis,
    /// A conversational copilot turn. Costs more.
    Copilot,
}

impl AgentKind {
    /// Credit cost of one invocation.
    pub fn cost(&self) -> i64 {
        match self {
            AgentKind::Analysis => 1,
            AgentKind::Copilot => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Analysis => "analysis",
            AgentKind::Copilot => "copilot",
        }
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analysis" => Ok(AgentKind::Analysis),
            "copilot" => Ok(AgentKind::Copilot),
            other => Err(Error::UnknownAgentKind(other.to_string())),
        }
    }
}

/// The scoping filters an insight request carries.
///
/// These participate in the insight cache key, so two requests over
/// different imports or locales never share a cached result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightFilters {
    pub import_id: Option<String>,
    pub account_id: Option<String>,
    #[serde(default)]
    pub period: Period,
    pub locale: Option<String>,
    pub report_type: Option<String>,
}
