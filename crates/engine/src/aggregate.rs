//! Pure aggregation over the movement collection.
//!
//! Everything here is stateless: callers pass the movements and a reference
//! date. Movements without a usable date are excluded from every window; bad
//! amounts were already coerced to zero at the wire boundary.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{Movement, MovementKind};

/// Aggregation time bucket relative to a reference date.
///
/// `Day` is exact date equality. `Month` is the same calendar year and month
/// as the reference date, not a trailing 30-day window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    Day,
    Month,
}

/// Whether `date` falls inside the window anchored at `ref_date`.
pub fn date_in_window(date: NaiveDate, window: Window, ref_date: NaiveDate) -> bool {
    match window {
        Window::Day => date == ref_date,
        Window::Month => date.year() == ref_date.year() && date.month() == ref_date.month(),
    }
}

/// Sums the amounts of one movement kind inside a window.
pub fn sum_by_kind_and_window(
    movements: &[Movement],
    kind: MovementKind,
    window: Window,
    ref_date: NaiveDate,
) -> f64 {
    movements
        .iter()
        .filter(|movement| movement.kind == kind)
        .filter_map(|movement| movement.date.map(|date| (date, movement.amount)))
        .filter(|(date, _)| date_in_window(*date, window, ref_date))
        .map(|(_, amount)| amount)
        .sum()
}

/// Income minus expenses inside a window.
pub fn balance_in_window(movements: &[Movement], window: Window, ref_date: NaiveDate) -> f64 {
    sum_by_kind_and_window(movements, MovementKind::Income, window, ref_date)
        - sum_by_kind_and_window(movements, MovementKind::Expense, window, ref_date)
}

/// Number of movements of any kind inside a window.
pub fn count_in_window(movements: &[Movement], window: Window, ref_date: NaiveDate) -> usize {
    movements
        .iter()
        .filter_map(|movement| movement.date)
        .filter(|date| date_in_window(*date, window, ref_date))
        .count()
}

/// The movement with the greatest creation timestamp. Ties keep the first
/// inserted; empty input yields `None`.
pub fn most_recent(movements: &[Movement]) -> Option<&Movement> {
    let mut best: Option<&Movement> = None;
    for movement in movements {
        match best {
            Some(current) if movement.created_at <= current.created_at => {}
            _ => best = Some(movement),
        }
    }
    best
}

/// The most recent movement, reduced to what the dashboard shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMovement {
    pub kind: MovementKind,
    pub amount: f64,
    #[serde(with = "crate::wire::date")]
    pub date: Option<NaiveDate>,
}

/// Dashboard KPI block: day and month totals plus the latest entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub income_today: f64,
    pub expenses_today: f64,
    pub balance_today: f64,
    pub income_month: f64,
    pub expenses_month: f64,
    pub balance_month: f64,
    pub movements_this_month: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_movement: Option<LastMovement>,
}

/// Computes the full KPI block in one pass over the movements.
pub fn dashboard_summary(movements: &[Movement], today: NaiveDate) -> DashboardSummary {
    let mut summary = DashboardSummary::default();
    for movement in movements {
        let Some(date) = movement.date else {
            continue;
        };
        if date_in_window(date, Window::Day, today) {
            match movement.kind {
                MovementKind::Income => summary.income_today += movement.amount,
                MovementKind::Expense => summary.expenses_today += movement.amount,
            }
        }
        if date_in_window(date, Window::Month, today) {
            match movement.kind {
                MovementKind::Income => summary.income_month += movement.amount,
                MovementKind::Expense => summary.expenses_month += movement.amount,
            }
            summary.movements_this_month += 1;
        }
    }
    summary.balance_today = summary.income_today - summary.expenses_today;
    summary.balance_month = summary.income_month - summary.expenses_month;
    summary.last_movement = most_recent(movements).map(|movement| LastMovement {
        kind: movement.kind,
        amount: movement.amount,
        date: movement.date,
    });
    summary
}
