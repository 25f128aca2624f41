// In crates/analytics/src/score.rs

use rust_decimal::prelude::*;

use crate::types::{PerformanceMetrics, RadarAxis, RadarMetrics, ScoreBreakdown};

// The radar curves and composite weights are product configuration, tuned by
// hand. Changing any value here silently changes every displayed score, so
// treat them as constants, not as something to re-derive.

/// Composite weights. Must sum to 1.
const WEIGHT_WIN_RATE_QUALITY: f64 = 0.30;
const WEIGHT_CONSISTENCY: f64 = 0.25;
const WEIGHT_RISK_DISCIPLINE: f64 = 0.25;
const WEIGHT_RECOVERY: f64 = 0.20;

/// Win rate (payoff-adjusted, percent) -> 0-100.
const WIN_RATE_QUALITY_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (30.0, 30.0),
    (40.0, 50.0),
    (50.0, 65.0),
    (60.0, 80.0),
    (70.0, 95.0),
    (100.0, 100.0),
];

/// Profit factor -> 0-100.
const CONSISTENCY_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.5, 20.0),
    (1.0, 40.0),
    (1.5, 60.0),
    (2.0, 75.0),
    (3.0, 90.0),
    (4.0, 100.0),
];

/// Average loss over average win -> 0-100. Smaller losses score higher.
const RISK_DISCIPLINE_CURVE: &[(f64, f64)] = &[
    (0.0, 100.0),
    (0.5, 90.0),
    (1.0, 70.0),
    (1.5, 50.0),
    (2.0, 30.0),
    (3.0, 10.0),
    (5.0, 0.0),
];

/// Max drawdown depth (percent, positive) -> 0-100. Shallower scores higher.
const RECOVERY_CURVE: &[(f64, f64)] = &[
    (0.0, 100.0),
    (5.0, 85.0),
    (10.0, 70.0),
    (20.0, 50.0),
    (35.0, 30.0),
    (50.0, 15.0),
    (100.0, 0.0),
];

/// Maps the performance record onto the radar sub-metrics and the composite
/// score.
///
/// An empty record (zero trades) scores zero across the board instead of
/// rewarding the absence of losses.
pub fn compute_radar_and_score(metrics: &PerformanceMetrics) -> ScoreBreakdown {
    if metrics.total_trades == 0 {
        return ScoreBreakdown::default();
    }

    let avg_win = metrics.avg_win_dollar.to_f64().unwrap_or(0.0);
    let avg_loss = metrics.avg_loss_dollar.to_f64().unwrap_or(0.0);

    // Payoff ratio nudges the win rate: winning often matters less when the
    // average loss dwarfs the average win.
    let payoff = if avg_loss > 0.0 { avg_win / avg_loss } else { 1.0 };
    let quality_raw = (metrics.win_rate + (payoff - 1.0) * 10.0).clamp(0.0, 100.0);

    let discipline_raw = if avg_win > 0.0 { avg_loss / avg_win } else { 0.0 };
    let recovery_raw = -metrics.max_drawdown_pct;

    let radar = RadarMetrics {
        win_rate_quality: axis(quality_raw, WIN_RATE_QUALITY_CURVE),
        consistency: axis(metrics.profit_factor, CONSISTENCY_CURVE),
        risk_discipline: axis(discipline_raw, RISK_DISCIPLINE_CURVE),
        recovery: axis(recovery_raw, RECOVERY_CURVE),
    };

    let score = (radar.win_rate_quality.score * WEIGHT_WIN_RATE_QUALITY
        + radar.consistency.score * WEIGHT_CONSISTENCY
        + radar.risk_discipline.score * WEIGHT_RISK_DISCIPLINE
        + radar.recovery.score * WEIGHT_RECOVERY)
        .clamp(0.0, 100.0);

    ScoreBreakdown { radar, score }
}

fn axis(raw: f64, curve: &[(f64, f64)]) -> RadarAxis {
    RadarAxis {
        raw,
        score: interpolate(raw, curve),
    }
}

/// Piecewise-linear interpolation through the curve's breakpoints, clamped
/// to the endpoint scores outside the table's range.
fn interpolate(raw: f64, curve: &[(f64, f64)]) -> f64 {
    let (first_x, first_y) = curve[0];
    if raw <= first_x {
        return first_y;
    }
    for window in curve.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if raw <= x1 {
            let t = (raw - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    curve[curve.len() - 1].1
}
