//! Repeating spending rules and their occurrence counter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::PDate;
use crate::error::InvariantViolation;
use crate::record::Record;

/// Cadence of a repeating rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulePeriod {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for RulePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RulePeriod::Day => "Day",
            RulePeriod::Week => "Week",
            RulePeriod::Month => "Month",
            RulePeriod::Year => "Year",
        };
        f.write_str(label)
    }
}

/// One budgeting rule of a category.
///
/// `amount` is in minor units of the owning category's currency. A `None`
/// period marks a one-shot rule: it occurs once if the query window
/// intersects `[start_date, end_date]`. Open bounds (`None` dates) extend to
/// the query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub amount: i64,
    #[serde(default)]
    pub start_date: Option<PDate>,
    #[serde(default)]
    pub end_date: Option<PDate>,
    /// Skip factor: fire every `repeat_n` periods. Meaningless without a
    /// period.
    pub repeat_n: u32,
    pub period: Option<RulePeriod>,
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self {
            amount: 0,
            start_date: None,
            end_date: None,
            repeat_n: 1,
            period: None,
        }
    }
}

impl Record for CategoryRule {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.repeat_n == 0 {
            return Err(InvariantViolation::RuleRepeatZero);
        }
        Ok(())
    }
}

impl CategoryRule {
    pub fn new(amount: i64, period: Option<RulePeriod>) -> Self {
        Self {
            amount,
            period,
            ..Self::default()
        }
    }

    pub fn anchored(mut self, start_date: PDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn until(mut self, end_date: PDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn every(mut self, repeat_n: u32) -> Self {
        self.repeat_n = repeat_n;
        self
    }

    /// How many times the rule fires within the inclusive window
    /// `[date_begin, date_end]`.
    ///
    /// Periodic occurrences are anchored to the rule's own `start_date`: when
    /// the rule starts before the window, the firings that land before
    /// `date_begin` are counted over `[start_date, date_begin - 1]` and
    /// subtracted, leaving only those inside the window.
    pub fn count_occurrences_between(&self, date_begin: PDate, date_end: PDate) -> u32 {
        debug_assert!(date_end >= date_begin);
        if let Some(start) = self.start_date {
            if date_end < start {
                return 0;
            }
        }
        if let Some(end) = self.end_date {
            if date_begin > end {
                return 0;
            }
        }
        let Some(period) = self.period else {
            return 1;
        };

        let first_day = self.start_date.unwrap_or(date_begin);
        let last_day = match self.end_date {
            Some(end) => end.min(date_end),
            None => date_end,
        };
        let count = occurrences_from_anchor(period, self.repeat_n, first_day, last_day);

        if first_day < date_begin {
            let before = self.count_occurrences_between(first_day, date_begin.pred());
            count.saturating_sub(before)
        } else {
            count
        }
    }
}

/// Occurrence count over `[first_day, last_day]` for a rule anchored on
/// `first_day`.
fn occurrences_from_anchor(period: RulePeriod, repeat_n: u32, first_day: PDate, last_day: PDate) -> u32 {
    let n = repeat_n as i32;
    match period {
        RulePeriod::Day => {
            let days_diff = (last_day - first_day).max(0);
            (days_diff / n + 1) as u32
        }
        RulePeriod::Week => {
            let days_diff = (last_day - first_day).max(0);
            (days_diff / (n * 7) + 1) as u32
        }
        RulePeriod::Month => {
            // A short month still counts when the anchor day overshoots it:
            // the comparator is day-of-month only.
            let months = 12 * (last_day.year() - first_day.year())
                + (last_day.month() as i32 - first_day.month() as i32)
                + i32::from(last_day.day() >= first_day.day());
            ((months - 1).div_euclid(n) + 1).max(0) as u32
        }
        RulePeriod::Year => {
            let whole = last_day.month() > first_day.month()
                || (last_day.month() == first_day.month() && last_day.day() >= first_day.day());
            (last_day.year() - first_day.year() + i32::from(whole)).max(0) as u32
        }
    }
}
