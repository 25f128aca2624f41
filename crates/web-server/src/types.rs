// In crates/web-server/src/types.rs

use analytics::{ChartPoint, Drawdown, PerformanceMetrics, ScoreBreakdown};
use core_types::AgentKind;
use serde::{Deserialize, Serialize};

/// Query parameters shared by the report endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeParams {
    /// Period token; unknown values fall back to the 30-day default.
    pub period: Option<String>,
    pub import_id: Option<String>,
    pub account_id: Option<String>,
    /// Prefer dollar P&L over pips where available. Defaults to true.
    pub use_dollar: Option<bool>,
}

impl RangeParams {
    pub fn use_dollar(&self) -> bool {
        self.use_dollar.unwrap_or(true)
    }
}

/// Query parameters for the calendar endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarParams {
    pub year: i32,
    pub month: u32,
    pub use_dollar: Option<bool>,
    /// "sunday" (default) or "monday".
    pub week_start: Option<String>,
}

/// Body of an insight request. The prompt itself is built server-side from
/// the computed metrics; a copilot turn may add a free-form question.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightRequest {
    pub agent: AgentKind,
    #[serde(flatten)]
    pub range: RangeParams,
    pub locale: Option<String>,
    pub report_type: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponseBody {
    pub text: String,
    pub cached: bool,
}

/// Metrics plus the chart-ready equity curve, the dashboard's main payload.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<ChartPoint>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub struct DrawdownResponse {
    pub equity: Drawdown,
    pub balance: Drawdown,
}
