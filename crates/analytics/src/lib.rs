// In crates/analytics/src/lib.rs

//! The pure analytics engine of the trading journal.
//!
//! Every function in this crate is synchronous, side-effect free, and total:
//! an empty trade list produces zero-valued output instead of an error, and
//! numeric edge cases (division by zero in rates, ratios, percentages)
//! substitute `0` so callers never see `NaN` or infinity.

pub mod calendar;
pub mod drawdown;
pub mod equity;
pub mod filter;
pub mod metrics;
pub mod score;
pub mod types;

// Re-export the engine's public surface.
pub use calendar::compute_calendar;
pub use drawdown::{balance_drawdown, equity_drawdown};
pub use equity::{chart_points, compute_equity_curve};
pub use filter::filter_by_period;
pub use metrics::compute_metrics;
pub use score::compute_radar_and_score;
pub use types::{
    CalendarData, ChartPoint, DayCell, Drawdown, EquityPoint, PerformanceMetrics, RadarAxis,
    RadarMetrics, ScoreBreakdown, WeekStart, WeekSummary,
};
