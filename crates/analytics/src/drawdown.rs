// In crates/analytics/src/drawdown.rs

use core_types::CalendarTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::equity::compute_equity_curve;
use crate::types::{Drawdown, EquityPoint};

/// Maximum peak-to-trough decline of the equity curve.
///
/// The running peak starts at zero (cumulative P&L before any trade), so a
/// curve that only ever goes down still reports its full decline. The dollar
/// figure is `<= 0`; the percentage is relative to the overall peak and `0`
/// whenever that peak is not positive.
pub fn equity_drawdown(curve: &[EquityPoint]) -> Drawdown {
    max_decline(Decimal::ZERO, curve.iter().map(|p| p.cumulative_pnl))
}

/// Maximum peak-to-trough decline of the simulated account balance.
///
/// The engine has no notion of account balance on its own; `initial_balance`
/// is supplied externally (an import's stated starting balance, or
/// `current_balance - net_pnl`). Balance at each point is
/// `initial_balance + cumulative_pnl`.
pub fn balance_drawdown(
    initial_balance: Decimal,
    trades: &[CalendarTrade],
    use_dollar: bool,
) -> Drawdown {
    let curve = compute_equity_curve(trades, use_dollar);
    max_decline(
        initial_balance,
        curve.iter().map(|p| initial_balance + p.cumulative_pnl),
    )
}

/// Shared peak-tracking scan. `start` seeds the running peak.
fn max_decline(start: Decimal, values: impl Iterator<Item = Decimal>) -> Drawdown {
    let mut peak = start;
    let mut max_drawdown = Decimal::ZERO;
    for value in values {
        peak = peak.max(value);
        max_drawdown = max_drawdown.max(peak - value);
    }

    let drawdown_pct = if peak > Decimal::ZERO && max_drawdown > Decimal::ZERO {
        (-max_drawdown / peak).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    };

    Drawdown {
        drawdown_dollar: -max_drawdown,
        drawdown_pct,
    }
}
