// In crates/analytics/src/metrics.rs

use core_types::CalendarTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::calendar::daily_totals;
use crate::drawdown::equity_drawdown;
use crate::equity::compute_equity_curve;
use crate::types::PerformanceMetrics;

/// Computes the full performance record in a single chronological scan.
///
/// Policy notes, all deliberate and load-bearing for the UI:
/// - `win_rate` is `0` for an empty collection.
/// - `profit_factor` is `0` (not infinity) when there are no losing trades.
/// - A zero-P&L trade is not a win: it counts as a loss in the totals and
///   extends the loss streak, but it contributes neither to gross loss nor
///   to the average-loss denominator, which covers strictly-losing trades.
/// - Day classification goes by the sign of the daily P&L sum, not by the
///   majority of individual outcomes within the day.
pub fn compute_metrics(trades: &[CalendarTrade], use_dollar: bool) -> PerformanceMetrics {
    let mut report = PerformanceMetrics::default();
    if trades.is_empty() {
        return report;
    }

    let mut sorted: Vec<&CalendarTrade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.trade_date);

    report.total_trades = sorted.len() as u32;

    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    // Trades with pnl < 0, excluding breakevens. The average-loss
    // denominator, as opposed to `report.losses` which includes them.
    let mut strict_losses = 0u32;
    let mut current_wins = 0u32;
    let mut current_losses = 0u32;

    for trade in &sorted {
        let pnl = trade.signed_pnl(use_dollar);
        report.net_pnl += pnl;

        if trade.is_win {
            report.wins += 1;
            gross_profit += pnl;
            report.largest_winning_trade = report.largest_winning_trade.max(pnl);

            current_wins += 1;
            current_losses = 0;
            report.max_consecutive_wins = report.max_consecutive_wins.max(current_wins);
        } else {
            report.losses += 1;
            if pnl < Decimal::ZERO {
                gross_loss += pnl.abs();
                strict_losses += 1;
            }
            report.largest_losing_trade = report.largest_losing_trade.min(pnl);

            current_losses += 1;
            current_wins = 0;
            report.max_consecutive_losses = report.max_consecutive_losses.max(current_losses);
        }
    }

    report.win_rate = report.wins as f64 / report.total_trades as f64 * 100.0;

    report.profit_factor = if gross_loss > Decimal::ZERO {
        (gross_profit / gross_loss).to_f64().unwrap_or(0.0)
    } else {
        // No losses: reported as 0 rather than infinity so the UI can
        // render it without guarding.
        0.0
    };

    if report.wins > 0 {
        report.avg_win_dollar = gross_profit / Decimal::from(report.wins);
    }
    if strict_losses > 0 {
        report.avg_loss_dollar = gross_loss / Decimal::from(strict_losses);
    }

    // Day-level classification from the daily P&L sums.
    for totals in daily_totals(trades, use_dollar).values() {
        if totals.pnl > Decimal::ZERO {
            report.win_days += 1;
        } else if totals.pnl < Decimal::ZERO {
            report.loss_days += 1;
        } else {
            report.breakeven_days += 1;
        }
    }

    let curve = compute_equity_curve(trades, use_dollar);
    let drawdown = equity_drawdown(&curve);
    report.max_daily_drawdown = drawdown.drawdown_dollar;
    report.max_drawdown_pct = drawdown.drawdown_pct;

    report
}

/// Trade constructors shared by the test modules of this crate.
#[cfg(test)]
pub mod test_support {
    use chrono::NaiveDate;
    use core_types::{CalendarTrade, RawTrade};
    use rust_decimal::Decimal;
    use rust_decimal::prelude::*;

    fn raw(date: NaiveDate, pips: Option<f64>, dollar: Option<f64>) -> RawTrade {
        RawTrade {
            id: format!("t-{date}"),
            trade_date: date,
            pair: "EURUSD".to_string(),
            entry_price: None,
            exit_price: None,
            pips: pips.and_then(Decimal::from_f64),
            profit_dollar: dollar.and_then(Decimal::from_f64),
            risk_reward: None,
            tags: None,
            entry_time: None,
            exit_time: None,
        }
    }

    /// A pips-only trade.
    pub fn trade_on(date: NaiveDate, pips: f64) -> CalendarTrade {
        CalendarTrade::from_raw(&raw(date, Some(pips), None))
    }

    /// A trade with a dollar P&L of either sign.
    pub fn dollar_trade_on(date: NaiveDate, dollar: f64) -> CalendarTrade {
        CalendarTrade::from_raw(&raw(date, Some(dollar / 10.0), Some(dollar)))
    }

    /// A trade with a negative dollar P&L. Rejects non-negative input so
    /// the name cannot lie.
    pub fn losing_dollar_trade_on(date: NaiveDate, dollar: f64) -> CalendarTrade {
        assert!(dollar < 0.0, "losing trade needs a negative P&L, got {dollar}");
        dollar_trade_on(date, dollar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PerformanceMetrics;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use test_support::{dollar_trade_on, losing_dollar_trade_on, trade_on};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn empty_input_yields_zeroed_metrics() {
        let report = compute_metrics(&[], true);
        assert_eq!(report.total_trades, 0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.profit_factor, 0.0);
        assert_eq!(report.net_pnl, Decimal::ZERO);
    }

    #[test]
    fn six_wins_four_losses_scenario() {
        let mut trades = Vec::new();
        for d in 1..=6 {
            trades.push(dollar_trade_on(day(d), 100.0));
        }
        for d in 7..=10 {
            trades.push(losing_dollar_trade_on(day(d), -50.0));
        }

        let report = compute_metrics(&trades, true);
        assert_eq!(report.total_trades, 10);
        assert_eq!(report.wins + report.losses, report.total_trades);
        assert!((report.win_rate - 60.0).abs() < 1e-9);
        assert_eq!(report.net_pnl, dec!(400));
        assert!((report.profit_factor - 3.0).abs() < 1e-9);
        assert_eq!(report.avg_win_dollar, dec!(100));
        assert_eq!(report.avg_loss_dollar, dec!(50));
        assert_eq!(report.largest_winning_trade, dec!(100));
        assert_eq!(report.largest_losing_trade, dec!(-50));
    }

    #[test]
    fn profit_factor_is_zero_without_losses() {
        let trades = vec![dollar_trade_on(day(1), 100.0), dollar_trade_on(day(2), 50.0)];
        let report = compute_metrics(&trades, true);
        assert_eq!(report.profit_factor, 0.0);
        assert_eq!(report.avg_loss_dollar, Decimal::ZERO);
    }

    #[test]
    fn streaks_follow_chronological_order() {
        // W W L W W W L
        let trades = vec![
            trade_on(day(1), 1.0),
            trade_on(day(2), 1.0),
            trade_on(day(3), -1.0),
            trade_on(day(4), 1.0),
            trade_on(day(5), 1.0),
            trade_on(day(6), 1.0),
            trade_on(day(7), -1.0),
        ];
        let report = compute_metrics(&trades, false);
        assert_eq!(report.max_consecutive_wins, 3);
        assert_eq!(report.max_consecutive_losses, 1);
    }

    #[test]
    fn streaks_ignore_input_order() {
        // Same sequence handed over shuffled; the scan sorts first.
        let trades = vec![
            trade_on(day(7), -1.0),
            trade_on(day(4), 1.0),
            trade_on(day(1), 1.0),
            trade_on(day(5), 1.0),
            trade_on(day(3), -1.0),
            trade_on(day(2), 1.0),
            trade_on(day(6), 1.0),
        ];
        let report = compute_metrics(&trades, false);
        assert_eq!(report.max_consecutive_wins, 3);
        assert_eq!(report.max_consecutive_losses, 1);
    }

    #[test]
    fn breakeven_trade_counts_as_loss_and_extends_the_loss_streak() {
        // Documented policy: a zero-P&L trade is not a win.
        let trades = vec![
            trade_on(day(1), -1.0),
            trade_on(day(2), 0.0),
            trade_on(day(3), 1.0),
        ];
        let report = compute_metrics(&trades, false);
        assert_eq!(report.wins, 1);
        assert_eq!(report.losses, 2);
        assert_eq!(report.wins + report.losses, report.total_trades);
        assert_eq!(report.max_consecutive_losses, 2);
        // The zero trade contributes nothing to gross loss, and the average
        // loss divides by strictly-losing trades only.
        assert_eq!(report.avg_loss_dollar, dec!(1));
    }

    #[test]
    fn average_loss_divides_by_strictly_losing_trades() {
        // Two real losses and one breakeven: mean loss is 2, not 4/3.
        let trades = vec![
            trade_on(day(1), -1.0),
            trade_on(day(2), -3.0),
            trade_on(day(3), 0.0),
        ];
        let report = compute_metrics(&trades, false);
        assert_eq!(report.losses, 3);
        assert_eq!(report.avg_loss_dollar, dec!(2));
        assert_eq!(report.max_consecutive_losses, 3);
    }

    #[test]
    fn day_classification_uses_the_daily_sum() {
        // Day 1: +100 and -40 -> win day despite the losing trade.
        // Day 2: +30 and -30 -> breakeven day.
        // Day 3: one loss -> loss day.
        let trades = vec![
            dollar_trade_on(day(1), 100.0),
            losing_dollar_trade_on(day(1), -40.0),
            dollar_trade_on(day(2), 30.0),
            losing_dollar_trade_on(day(2), -30.0),
            losing_dollar_trade_on(day(3), -10.0),
        ];
        let report = compute_metrics(&trades, true);
        assert_eq!(report.win_days, 1);
        assert_eq!(report.breakeven_days, 1);
        assert_eq!(report.loss_days, 1);
    }

    #[test]
    fn drawdown_fields_are_populated_from_the_equity_curve() {
        let trades = vec![
            dollar_trade_on(day(1), 100.0),
            losing_dollar_trade_on(day(2), -60.0),
            dollar_trade_on(day(3), 20.0),
        ];
        let report = compute_metrics(&trades, true);
        assert_eq!(report.max_daily_drawdown, dec!(-60));
        assert!((report.max_drawdown_pct - (-60.0)).abs() < 1e-9);
    }

    #[test]
    fn default_report_is_all_zero() {
        let report = PerformanceMetrics::default();
        assert_eq!(report.max_daily_drawdown, Decimal::ZERO);
        assert_eq!(report.max_consecutive_wins, 0);
    }
}
