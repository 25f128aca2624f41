// In crates/analytics/src/calendar.rs

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::CalendarTrade;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::types::{CalendarData, DayCell, WeekStart, WeekSummary};

/// Running per-day totals used by both the calendar and the day-level
/// win/loss/breakeven classification in the metrics aggregator.
#[derive(Debug, Clone, Default)]
pub struct DayTotals {
    pub pnl: Decimal,
    pub trades_count: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Groups trades by calendar day, summing P&L and counting outcomes.
/// The map is ordered by date.
pub fn daily_totals(trades: &[CalendarTrade], use_dollar: bool) -> BTreeMap<NaiveDate, DayTotals> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for trade in trades {
        let entry = days.entry(trade.trade_date).or_default();
        entry.pnl += trade.signed_pnl(use_dollar);
        entry.trades_count += 1;
        if trade.is_win {
            entry.wins += 1;
        } else {
            entry.losses += 1;
        }
    }
    days
}

/// Builds the calendar aggregation for one month: a `DayCell` per trading
/// day plus week buckets rolled up from the day cells.
///
/// Week boundaries default to Sunday-to-Saturday; `week_start` makes the
/// boundary configurable. Weeks are aligned to the real calendar, so the
/// first bucket may cover fewer than seven days of the month.
pub fn compute_calendar(
    trades: &[CalendarTrade],
    year: i32,
    month: u32,
    use_dollar: bool,
    week_start: WeekStart,
) -> CalendarData {
    let (first, last) = match month_bounds(year, month) {
        Some(bounds) => bounds,
        None => {
            // Out-of-range month: an empty calendar, not an error.
            return CalendarData {
                year,
                month,
                days: Vec::new(),
                weeks: Vec::new(),
            };
        }
    };

    let in_month: Vec<CalendarTrade> = trades
        .iter()
        .filter(|t| t.trade_date >= first && t.trade_date <= last)
        .cloned()
        .collect();
    let totals = daily_totals(&in_month, use_dollar);

    let days: Vec<DayCell> = totals
        .iter()
        .map(|(date, agg)| DayCell {
            date: *date,
            pnl: agg.pnl,
            trades_count: agg.trades_count,
            wins: agg.wins,
            losses: agg.losses,
            win_rate: if agg.trades_count > 0 {
                agg.wins as f64 / agg.trades_count as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    // Offset of the month's first day within its calendar week.
    let first_offset = weekday_offset(first.weekday(), week_start);
    let week_count = (first_offset + last.day() + 6) / 7;
    let mut weeks = vec![WeekSummary::default(); week_count as usize];
    for cell in &days {
        let index = (first_offset + cell.date.day() - 1) / 7;
        let week = &mut weeks[index as usize];
        week.pnl += cell.pnl;
        week.trading_days += 1;
    }

    CalendarData {
        year,
        month,
        days,
        weeks,
    }
}

/// First and last day of the given month, or `None` for an invalid month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month - Duration::days(1)))
}

/// Days since the start of the week for the given weekday.
fn weekday_offset(weekday: Weekday, week_start: WeekStart) -> u32 {
    match week_start {
        WeekStart::Sunday => weekday.num_days_from_sunday(),
        WeekStart::Monday => weekday.num_days_from_monday(),
    }
}
