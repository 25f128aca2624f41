// In crates/analytics/src/filter.rs

use chrono::NaiveDate;
use core_types::{CalendarTrade, Period};

/// Restricts a trade collection to the requested reporting window.
///
/// Order-preserving: the output is the subsequence of `trades` whose trade
/// date falls within `[lower_bound, today]`. `Period::All` passes the whole
/// list through unchanged.
pub fn filter_by_period(
    trades: &[CalendarTrade],
    period: Period,
    today: NaiveDate,
) -> Vec<CalendarTrade> {
    match period.lower_bound(today) {
        None => trades.to_vec(),
        Some(lower) => trades
            .iter()
            .filter(|t| t.trade_date >= lower && t.trade_date <= today)
            .cloned()
            .collect(),
    }
}
