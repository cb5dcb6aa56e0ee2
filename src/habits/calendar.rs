//! Month calendar, completion metrics and per-day habit status

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use super::models::Habit;

/// Cells in a six-week calendar grid
pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub is_current_month: bool,
    pub is_completed: bool,
    pub is_future: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub completed_days: usize,
    pub days_in_month: u32,
    pub completed_label: String,
    pub percentage: u32,
    pub percentage_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitDayStatus {
    pub habit_id: String,
    pub name: String,
    pub is_completed: bool,
}

/// Six-week grid for the month containing `month`, weeks starting on Sunday
pub fn month_grid(month: NaiveDate, completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> Vec<CalendarDay> {
    let first = first_of_month(month);
    let days_in_month = days_in_month(first);
    let leading = first.weekday().num_days_from_sunday() as i64;

    let mut days = Vec::with_capacity(GRID_CELLS);

    for offset in (1..=leading).rev() {
        let date = first - Duration::days(offset);
        days.push(CalendarDay {
            date,
            day: date.day(),
            is_current_month: false,
            is_completed: false,
            is_future: false,
        });
    }

    for offset in 0..days_in_month as i64 {
        let date = first + Duration::days(offset);
        days.push(CalendarDay {
            date,
            day: date.day(),
            is_current_month: true,
            is_completed: completed.contains(&date),
            is_future: date > today,
        });
    }

    let next_month = first + Duration::days(days_in_month as i64);
    let trailing = GRID_CELLS - days.len();
    for offset in 0..trailing as i64 {
        let date = next_month + Duration::days(offset);
        days.push(CalendarDay {
            date,
            day: date.day(),
            is_current_month: false,
            is_completed: false,
            is_future: true,
        });
    }

    days
}

/// Completion count and percentage for the month containing `month`
pub fn month_summary(month: NaiveDate, completed: &BTreeSet<NaiveDate>) -> MonthSummary {
    let first = first_of_month(month);
    let days_in_month = days_in_month(first);
    let last = first + Duration::days(days_in_month as i64 - 1);

    let completed_days = completed.range(first..=last).count();
    let percentage = if days_in_month > 0 {
        (completed_days as f64 / days_in_month as f64 * 100.0).round() as u32
    } else {
        0
    };

    MonthSummary {
        month: first.format("%Y-%m").to_string(),
        completed_days,
        days_in_month,
        completed_label: format!("{}/{}", completed_days, days_in_month),
        percentage,
        percentage_label: format!("{}%", percentage),
    }
}

/// Status of every habit that existed on `date`. Future dates have no data.
pub fn day_statuses(habits: &[Habit], date: NaiveDate, today: NaiveDate) -> Vec<HabitDayStatus> {
    if date > today {
        return Vec::new();
    }

    habits
        .iter()
        .filter(|habit| habit.existed_on(date))
        .map(|habit| HabitDayStatus {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            is_completed: habit.completed_on(date),
        })
        .collect()
}

/// Local mirror of a toggle: flips today's completion. Returns the new value.
pub fn today_toggle(habit: &mut Habit, today: NaiveDate) -> bool {
    if habit.completed_dates.remove(&today) {
        false
    } else {
        habit.completed_dates.insert(today);
        true
    }
}

/// Parse `YYYY-MM` into the first day of that month
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(month: NaiveDate) -> u32 {
    let first = first_of_month(month);
    first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}
