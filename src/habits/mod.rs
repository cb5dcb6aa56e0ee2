//! Habit data and the calendar views built from it

pub mod calendar;
pub mod models;

pub use calendar::{day_statuses, month_grid, month_summary, today_toggle, CalendarDay, HabitDayStatus, MonthSummary};
pub use models::{BackendHabit, BackendHabitMetrics, Habit, HabitMetrics};
