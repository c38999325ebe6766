//! Calendar month grid and date bookkeeping for the booking form.
//!
//! The grid is derived on demand from the displayed month, the injected
//! reserved/holiday sets and the current selection. Nothing here is stored.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::FormError;

/// Column headers, weeks start on Sunday.
pub const WEEKDAY_HEADERS: [&str; 7] = ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"];

/// Fixed reserved and holiday dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRules {
    /// Dates already committed to another booking; never selectable.
    #[serde(default)]
    pub reserved: BTreeSet<NaiveDate>,
    /// Public holidays; selectable with a surcharge warning.
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl CalendarRules {
    pub fn new(
        reserved: impl IntoIterator<Item = NaiveDate>,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            reserved: reserved.into_iter().collect(),
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Peruvian public holidays for 2025 and the dates already booked.
    pub fn peru_2025() -> Self {
        let ymd = |m, d| NaiveDate::from_ymd_opt(2025, m, d);
        Self::new(
            [ymd(4, 16), ymd(4, 18)].into_iter().flatten(),
            [
                ymd(1, 1),  // Año Nuevo
                ymd(4, 2),  // Jueves Santo
                ymd(4, 3),  // Viernes Santo
                ymd(5, 1),  // Día del Trabajo
                ymd(6, 29), // San Pedro y San Pablo
                ymd(7, 28), // Independencia
                ymd(7, 29), // Fiestas Patrias
            ]
            .into_iter()
            .flatten(),
        )
    }

    /// Load rules from a JSON file of the form `{"reserved": [...], "holidays": [...]}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_reserved(&self, date: NaiveDate) -> bool {
        self.reserved.contains(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self::peru_2025()
    }
}

/// How a grid cell should be presented, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    OutsideMonth,
    Reserved,
    SelectedHoliday,
    Selected,
    Holiday,
    Available,
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub holiday: bool,
    pub reserved: bool,
    pub selected: bool,
}

impl CalendarDay {
    pub fn status(&self) -> DayStatus {
        if !self.in_month {
            DayStatus::OutsideMonth
        } else if self.reserved {
            DayStatus::Reserved
        } else if self.selected && self.holiday {
            DayStatus::SelectedHoliday
        } else if self.selected {
            DayStatus::Selected
        } else if self.holiday {
            DayStatus::Holiday
        } else {
            DayStatus::Available
        }
    }

    /// Spillover and reserved cells are disabled.
    pub fn is_selectable(&self) -> bool {
        self.in_month && !self.reserved
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a month anchor by `delta` months; stays put if the result is out of range.
pub fn shift_month(month: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(month);
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    };

    shifted.unwrap_or_else(|| {
        warn!(%first, delta, "Month navigation out of range");
        first
    })
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Build the Sunday-aligned grid of whole weeks covering `month`.
pub fn month_grid(month: NaiveDate, rules: &CalendarRules, selected: &[NaiveDate]) -> Vec<CalendarDay> {
    let first = first_of_month(month);
    let last = last_of_month(first);

    let lead = i64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - i64::from(last.weekday().num_days_from_sunday());
    let start = first
        .checked_sub_signed(Duration::days(lead))
        .unwrap_or(first);
    let end = last.checked_add_signed(Duration::days(trail)).unwrap_or(last);

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| CalendarDay {
            date,
            in_month: date.year() == first.year() && date.month() == first.month(),
            holiday: rules.is_holiday(date),
            reserved: rules.is_reserved(date),
            selected: selected.contains(&date),
        })
        .collect()
}

/// Title shown above the grid, e.g. "April 2025".
pub fn month_title(month: NaiveDate) -> String {
    first_of_month(month).format("%B %Y").to_string()
}
