//! Advancing a cursor from one occurrence to the next.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};

use super::rule::RecurrenceRule;

impl RecurrenceRule {
    /// ## Summary
    /// Returns the occurrence following `cursor` under this rule.
    ///
    /// - `Daily`: `interval` days later.
    /// - `Weekly` with days: the first listed weekday strictly after `cursor`
    ///   (at most 7 days ahead); without days: `interval` weeks later.
    /// - `MonthlyByDay` / `Monthly`: `interval` calendar months later, clamped
    ///   to the last day of the target month.
    /// - `MonthlyByWeekday`: the Nth weekday of the month `interval` months
    ///   later, at midnight. A 5th weekday the month lacks spills into the next.
    /// - `Yearly`: `interval` years later, Feb 29 clamping to Feb 28.
    ///
    /// Returns `None` for one-off rules and when the result is out of range.
    #[must_use]
    pub fn next_after(&self, cursor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Self::None => None,
            Self::Daily { interval } => {
                cursor.checked_add_signed(TimeDelta::try_days(i64::from(interval.max(1)))?)
            }
            Self::Weekly { interval, days } if days.is_empty() => {
                cursor.checked_add_signed(TimeDelta::try_weeks(i64::from(interval.max(1)))?)
            }
            Self::Weekly { days, .. } => (1..=7)
                .filter_map(|n| cursor.checked_add_days(Days::new(n)))
                .find(|candidate| days.contains(candidate.weekday())),
            Self::MonthlyByDay { interval, .. } | Self::Monthly { interval } => {
                cursor.checked_add_months(Months::new(interval.max(1)))
            }
            Self::MonthlyByWeekday {
                interval,
                week_of_month,
                day_of_week,
            } => {
                let next_month = cursor.checked_add_months(Months::new(interval.max(1)))?;
                nth_weekday_of_month(next_month, week_of_month, day_of_week)
            }
            Self::Yearly { interval } => {
                cursor.checked_add_months(Months::new(interval.max(1).checked_mul(12)?))
            }
        }
    }
}

/// ## Summary
/// Returns midnight of the `week_of_month`-th `day_of_week` in the month of `anchor`.
///
/// The offset from the 1st is not range-checked, so week 5 of a month with
/// only four such weekdays lands in the following month. Returns `None` when
/// the offset leaves the representable range.
#[must_use]
pub fn nth_weekday_of_month(
    anchor: DateTime<Utc>,
    week_of_month: u32,
    day_of_week: Weekday,
) -> Option<DateTime<Utc>> {
    let first = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)?;
    let first_weekday = first.weekday().num_days_from_sunday();
    let target = day_of_week.num_days_from_sunday();

    let lead = u64::from((target + 7 - first_weekday) % 7);
    let offset = u64::from(week_of_month.saturating_sub(1))
        .checked_mul(7)?
        .checked_add(lead)?;

    let day = first.checked_add_days(Days::new(offset))?;
    Some(day.and_time(NaiveTime::MIN).and_utc())
}
