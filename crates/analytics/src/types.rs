// In crates/analytics/src/types.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One point of the running-total equity curve, one per trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub cumulative_pnl: Decimal,
}

/// A chart-ready equity point. The date is a string so the documented
/// empty-state placeholder (`"—"`) can be represented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub cumulative: Decimal,
}

/// Per-day aggregation for the calendar heatmap. Only days with at least one
/// trade get a cell.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub trades_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
}

/// Weekly roll-up of the day cells within a month.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeekSummary {
    pub pnl: Decimal,
    pub trading_days: u32,
}

/// Calendar aggregation for one month: day cells plus week buckets.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarData {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayCell>,
    pub weeks: Vec<WeekSummary>,
}

/// Which weekday opens a calendar week. The product default is
/// Sunday-to-Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

/// The flat record of derived performance scalars. Never persisted;
/// recomputed on every request from the filtered trade collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceMetrics {
    pub total_trades: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage in `[0, 100]`; `0` for an empty collection.
    pub win_rate: f64,
    pub net_pnl: Decimal,
    /// Gross profit over gross loss; reported as `0` (not infinity) when
    /// there are no losing trades. Display-safety policy.
    pub profit_factor: f64,
    /// Arithmetic mean of winning trades' P&L, as a positive number.
    pub avg_win_dollar: Decimal,
    /// Arithmetic mean of losing trades' loss magnitude, as a positive number.
    pub avg_loss_dollar: Decimal,
    pub largest_winning_trade: Decimal,
    /// Signed; the most negative single-trade P&L.
    pub largest_losing_trade: Decimal,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub win_days: u32,
    pub loss_days: u32,
    pub breakeven_days: u32,
    /// How far below the running peak the equity curve fell; `<= 0` always.
    pub max_daily_drawdown: Decimal,
    /// `max_daily_drawdown / peak * 100` when the peak is positive, else `0`.
    pub max_drawdown_pct: f64,
}

/// A peak-to-trough decline, absolute and as a percentage of the peak.
/// The dollar figure is `<= 0` ("how far below peak"), matching the
/// convention in [`PerformanceMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Drawdown {
    pub drawdown_dollar: Decimal,
    pub drawdown_pct: f64,
}

/// One radar axis: the raw underlying value (for display) and its
/// normalized 0–100 score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RadarAxis {
    pub raw: f64,
    pub score: f64,
}

/// The fixed set of radar sub-metrics feeding the composite score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RadarMetrics {
    /// Win rate blended with the payoff ratio.
    pub win_rate_quality: RadarAxis,
    /// Profit-factor based consistency of results.
    pub consistency: RadarAxis,
    /// Average loss relative to average win; smaller is better.
    pub risk_discipline: RadarAxis,
    /// Depth of the worst drawdown; shallower is better.
    pub recovery: RadarAxis,
}

/// The radar breakdown plus the single composite score in `[0, 100]`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreBreakdown {
    pub radar: RadarMetrics,
    pub score: f64,
}
