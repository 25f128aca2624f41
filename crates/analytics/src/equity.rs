// In crates/analytics/src/equity.rs

use core_types::CalendarTrade;
use rust_decimal::Decimal;

use crate::types::{ChartPoint, EquityPoint};

/// Builds the running-total equity curve, one point per trade.
///
/// Trades are sorted ascending by date (stable, so same-day trades keep
/// their stored order) and signed P&L is accumulated left to right, using
/// the dollar value when `use_dollar` is set and present, else pips.
///
/// An empty input yields an empty curve; chart rendering substitutes a
/// placeholder via [`chart_points`].
pub fn compute_equity_curve(trades: &[CalendarTrade], use_dollar: bool) -> Vec<EquityPoint> {
    let mut sorted: Vec<&CalendarTrade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.trade_date);

    let mut cumulative = Decimal::ZERO;
    sorted
        .iter()
        .map(|trade| {
            cumulative += trade.signed_pnl(use_dollar);
            EquityPoint {
                date: trade.trade_date,
                cumulative_pnl: cumulative,
            }
        })
        .collect()
}

/// Chart-ready points for an equity curve.
///
/// An empty curve becomes the single placeholder point `{"—", 0}` so the
/// chart component always has something to draw. This mirrors the UI
/// convention and is part of the engine's contract.
pub fn chart_points(curve: &[EquityPoint]) -> Vec<ChartPoint> {
    if curve.is_empty() {
        return vec![ChartPoint {
            date: "—".to_string(),
            cumulative: Decimal::ZERO,
        }];
    }

    curve
        .iter()
        .map(|p| ChartPoint {
            date: p.date.to_string(),
            cumulative: p.cumulative_pnl,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{dollar_trade_on, trade_on};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn accumulates_in_date_order() {
        // Deliberately out of order on input.
        let trades = vec![
            trade_on(day(3), -4.0),
            trade_on(day(1), 10.0),
            trade_on(day(2), 5.0),
        ];
        let curve = compute_equity_curve(&trades, false);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].date, day(1));
        assert_eq!(curve[0].cumulative_pnl, dec!(10));
        assert_eq!(curve[1].cumulative_pnl, dec!(15));
        assert_eq!(curve[2].cumulative_pnl, dec!(11));
    }

    #[test]
    fn last_point_equals_total_signed_pnl() {
        let trades = vec![
            dollar_trade_on(day(1), 100.0),
            dollar_trade_on(day(2), -50.0),
            dollar_trade_on(day(3), 25.0),
        ];
        let curve = compute_equity_curve(&trades, true);
        assert_eq!(curve.last().unwrap().cumulative_pnl, dec!(75));

        // Recomputing from the same input is idempotent.
        let again = compute_equity_curve(&trades, true);
        assert_eq!(curve, again);
    }

    #[test]
    fn dollar_preference_falls_back_per_trade() {
        // One trade has a dollar value, the other only pips.
        let trades = vec![dollar_trade_on(day(1), 100.0), trade_on(day(2), 7.0)];
        let curve = compute_equity_curve(&trades, true);
        assert_eq!(curve[1].cumulative_pnl, dec!(107));
    }

    #[test]
    fn empty_input_yields_empty_curve_and_placeholder_chart() {
        let curve = compute_equity_curve(&[], true);
        assert!(curve.is_empty());

        let points = chart_points(&curve);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "—");
        assert_eq!(points[0].cumulative, Decimal::ZERO);
    }
}
