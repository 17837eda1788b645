//! Typed recurrence rules and their flat storage form.

use almanac_db::db::enums::RecurrenceFrequency;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Weekdays in storage order, indexed by day number (0 = Sunday).
const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// ## Summary
/// Maps a day number (0 = Sunday through 6 = Saturday) to a `Weekday`.
///
/// Returns `None` for numbers above 6.
#[must_use]
pub fn weekday_from_number(number: u32) -> Option<Weekday> {
    usize::try_from(number)
        .ok()
        .and_then(|idx| WEEKDAYS_FROM_SUNDAY.get(idx))
        .copied()
}

/// Set of weekdays, stored as a bitmask keyed by `num_days_from_sunday`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);

    /// Builds a set from day numbers, dropping any above 6.
    #[must_use]
    pub fn from_numbers<I: IntoIterator<Item = u32>>(numbers: I) -> Self {
        numbers
            .into_iter()
            .filter_map(weekday_from_number)
            .collect()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Day numbers in ascending order.
    #[must_use]
    pub fn numbers(self) -> Vec<u32> {
        WEEKDAYS_FROM_SUNDAY
            .iter()
            .filter(|day| self.contains(**day))
            .map(Weekday::num_days_from_sunday)
            .collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// How a recurring event steps from one occurrence to the next.
///
/// Each variant only carries the parameters meaningful for its frequency, so a
/// rule can never be contradictory. Intervals are at least 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecurrenceRule {
    #[default]
    None,
    Daily {
        interval: u32,
    },
    /// With an empty `days` set, steps by `interval` weeks. Otherwise walks to the
    /// next listed weekday and ignores `interval`.
    Weekly {
        interval: u32,
        days: WeekdaySet,
    },
    /// Steps by calendar months; `day_of_month` is recorded but not re-applied.
    MonthlyByDay {
        interval: u32,
        day_of_month: u32,
    },
    /// The `week_of_month`-th `day_of_week` of every `interval`-th month.
    MonthlyByWeekday {
        interval: u32,
        week_of_month: u32,
        day_of_week: Weekday,
    },
    Monthly {
        interval: u32,
    },
    Yearly {
        interval: u32,
    },
}

impl RecurrenceRule {
    #[must_use]
    pub const fn frequency(&self) -> RecurrenceFrequency {
        match self {
            Self::None => RecurrenceFrequency::None,
            Self::Daily { .. } => RecurrenceFrequency::Daily,
            Self::Weekly { .. } => RecurrenceFrequency::Weekly,
            Self::MonthlyByDay { .. } | Self::MonthlyByWeekday { .. } | Self::Monthly { .. } => {
                RecurrenceFrequency::Monthly
            }
            Self::Yearly { .. } => RecurrenceFrequency::Yearly,
        }
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Step size in units of the frequency; `None` for one-off events.
    #[must_use]
    pub const fn interval(&self) -> Option<u32> {
        match *self {
            Self::None => None,
            Self::Daily { interval }
            | Self::Weekly { interval, .. }
            | Self::MonthlyByDay { interval, .. }
            | Self::MonthlyByWeekday { interval, .. }
            | Self::Monthly { interval }
            | Self::Yearly { interval } => Some(interval),
        }
    }
}

/// Hard stops applied on top of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RecurrenceBounds {
    /// No occurrence starts after this instant.
    pub until: Option<DateTime<Utc>>,
    /// Maximum occurrences counted from the event's own start.
    pub count: Option<u32>,
}

/// Rule plus bounds, as attached to an event template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Recurrence {
    pub rule: RecurrenceRule,
    pub bounds: RecurrenceBounds,
}

/// Flat recurrence columns, as stored and as exchanged over the API.
#[expect(clippy::struct_field_names)] // names match the storage columns and JSON keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceFields {
    #[serde(default)]
    pub recurrence_frequency: RecurrenceFrequency,
    pub recurrence_interval: Option<u32>,
    pub recurrence_days: Option<Vec<u32>>,
    pub recurrence_day_of_month: Option<u32>,
    pub recurrence_week_of_month: Option<u32>,
    pub recurrence_day_of_week: Option<u32>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub recurrence_count: Option<u32>,
}

impl Recurrence {
    /// ## Summary
    /// Interprets flat recurrence columns.
    ///
    /// Zero or missing intervals become 1 and zero counts mean "no count". For
    /// `MONTHLY`, `recurrence_day_of_month` wins over the week-of-month pair; the
    /// pair is used only when both halves are set, otherwise the rule is a plain
    /// monthly step. Unknown weekday numbers in `recurrence_days` are dropped and
    /// `recurrence_day_of_week` is taken modulo 7.
    #[must_use]
    pub fn from_fields(fields: &RecurrenceFields) -> Self {
        let interval = fields.recurrence_interval.filter(|n| *n > 0).unwrap_or(1);

        let rule = match fields.recurrence_frequency {
            RecurrenceFrequency::None => RecurrenceRule::None,
            RecurrenceFrequency::Daily => RecurrenceRule::Daily { interval },
            RecurrenceFrequency::Weekly => RecurrenceRule::Weekly {
                interval,
                days: WeekdaySet::from_numbers(
                    fields.recurrence_days.iter().flatten().copied(),
                ),
            },
            RecurrenceFrequency::Monthly => monthly_rule(fields, interval),
            RecurrenceFrequency::Yearly => RecurrenceRule::Yearly { interval },
        };

        let bounds = if rule.is_recurring() {
            RecurrenceBounds {
                until: fields.recurrence_end_date,
                count: fields.recurrence_count.filter(|n| *n > 0),
            }
        } else {
            RecurrenceBounds::default()
        };

        Self { rule, bounds }
    }

    /// ## Summary
    /// Flattens the rule back to its column form. Only columns meaningful for
    /// the rule's frequency are set.
    #[must_use]
    pub fn to_fields(&self) -> RecurrenceFields {
        let mut fields = RecurrenceFields {
            recurrence_frequency: self.rule.frequency(),
            recurrence_interval: self.rule.interval(),
            recurrence_end_date: self.bounds.until,
            recurrence_count: self.bounds.count,
            ..RecurrenceFields::default()
        };

        match self.rule {
            RecurrenceRule::Weekly { days, .. } if !days.is_empty() => {
                fields.recurrence_days = Some(days.numbers());
            }
            RecurrenceRule::MonthlyByDay { day_of_month, .. } => {
                fields.recurrence_day_of_month = Some(day_of_month);
            }
            RecurrenceRule::MonthlyByWeekday {
                week_of_month,
                day_of_week,
                ..
            } => {
                fields.recurrence_week_of_month = Some(week_of_month);
                fields.recurrence_day_of_week = Some(day_of_week.num_days_from_sunday());
            }
            _ => {}
        }

        fields
    }
}

fn monthly_rule(fields: &RecurrenceFields, interval: u32) -> RecurrenceRule {
    let day_of_month = fields.recurrence_day_of_month.filter(|d| *d > 0);
    let week_of_month = fields.recurrence_week_of_month.filter(|w| *w > 0);
    let day_of_week = fields
        .recurrence_day_of_week
        .and_then(|d| weekday_from_number(d % 7));

    match (day_of_month, week_of_month, day_of_week) {
        (Some(day_of_month), week, _) => {
            if week.is_some() {
                tracing::warn!(
                    day_of_month,
                    "Monthly rule sets both day-of-month and week-of-month; using day-of-month"
                );
            }
            RecurrenceRule::MonthlyByDay {
                interval,
                day_of_month,
            }
        }
        (None, Some(week_of_month), Some(day_of_week)) => RecurrenceRule::MonthlyByWeekday {
            interval,
            week_of_month,
            day_of_week,
        },
        _ => RecurrenceRule::Monthly { interval },
    }
}
