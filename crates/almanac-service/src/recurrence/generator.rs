//! Expansion of one template into the occurrences that fall inside a window.

use almanac_core::types::Window;
use chrono::{DateTime, TimeDelta, Utc};

use super::rule::Recurrence;

/// Start and end instants of one materialized occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// ## Summary
/// Expands a template spanning `[start, end]` into its occurrences inside `window`.
///
/// One-off templates yield themselves iff they overlap the window. Recurring
/// templates are scanned forward from `start`, one rule step at a time. The
/// scan stops at the first of:
/// - a cursor past the window end,
/// - a cursor past `bounds.until`,
/// - `bounds.count` cursors visited (counted from `start`, not from the window),
/// - `safety_cap` cursors visited,
/// - a step that leaves the representable range.
///
/// Only cursors at or after the window start are emitted; each keeps the
/// template's duration. Output is chronological.
#[must_use]
pub fn occurrence_spans(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    recurrence: &Recurrence,
    window: &Window,
    safety_cap: u32,
) -> Vec<OccurrenceSpan> {
    if !recurrence.rule.is_recurring() {
        return if window.overlaps(start, end) {
            vec![OccurrenceSpan { start, end }]
        } else {
            Vec::new()
        };
    }

    let duration: TimeDelta = end - start;
    let limit = recurrence
        .bounds
        .count
        .map_or(safety_cap, |count| count.min(safety_cap));
    let until = recurrence.bounds.until;

    let spans: Vec<OccurrenceSpan> =
        std::iter::successors(Some(start), |cursor| recurrence.rule.next_after(*cursor))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .take_while(|cursor| *cursor <= window.end())
            .take_while(|cursor| until.is_none_or(|until| *cursor <= until))
            .filter(|cursor| *cursor >= window.start())
            .filter_map(|cursor| {
                cursor
                    .checked_add_signed(duration)
                    .map(|end| OccurrenceSpan { start: cursor, end })
            })
            .collect();

    tracing::trace!(
        rule = ?recurrence.rule,
        emitted = spans.len(),
        limit,
        "Expanded recurring template"
    );

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::rule::{RecurrenceBounds, RecurrenceRule, WeekdaySet};
    use chrono::{Datelike, TimeZone, Weekday};

    const CAP: u32 = 1000;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Window {
        Window::new(start, end).unwrap()
    }

    fn recurring(rule: RecurrenceRule) -> Recurrence {
        Recurrence {
            rule,
            bounds: RecurrenceBounds::default(),
        }
    }

    #[test]
    fn test_one_off_emitted_only_when_overlapping() {
        let once = Recurrence::default();
        let (start, end) = (utc(2025, 3, 10, 9), utc(2025, 3, 10, 10));

        let hit = occurrence_spans(
            start,
            end,
            &once,
            &window(utc(2025, 3, 10, 10), utc(2025, 3, 11, 0)),
            CAP,
        );
        assert_eq!(hit, vec![OccurrenceSpan { start, end }]);

        let miss = occurrence_spans(
            start,
            end,
            &once,
            &window(utc(2025, 3, 10, 11), utc(2025, 3, 11, 0)),
            CAP,
        );
        assert!(miss.is_empty());
    }

    #[test]
    fn test_daily_every_other_day() {
        let spans = occurrence_spans(
            utc(2025, 1, 1, 0),
            utc(2025, 1, 1, 1),
            &recurring(RecurrenceRule::Daily { interval: 2 }),
            &window(utc(2025, 1, 1, 0), utc(2025, 1, 10, 0)),
            CAP,
        );

        let days: Vec<u32> = spans.iter().map(|span| span.start.day()).collect();
        assert_eq!(days, vec![1, 3, 5, 7, 9]);
        assert!(
            spans
                .iter()
                .all(|span| span.end - span.start == TimeDelta::hours(1))
        );
    }

    #[test]
    fn test_weekly_listed_days_over_two_weeks() {
        // 2025-01-06 is a Monday.
        let spans = occurrence_spans(
            utc(2025, 1, 6, 9),
            utc(2025, 1, 6, 10),
            &recurring(RecurrenceRule::Weekly {
                interval: 1,
                days: WeekdaySet::from_numbers([1, 3, 5]),
            }),
            &window(utc(2025, 1, 6, 0), utc(2025, 1, 19, 23)),
            CAP,
        );

        assert_eq!(spans.len(), 6);
        let weekdays: Vec<Weekday> = spans.iter().map(|span| span.start.weekday()).collect();
        assert_eq!(
            weekdays,
            vec![
                Weekday::Mon,
                Weekday::Wed,
                Weekday::Fri,
                Weekday::Mon,
                Weekday::Wed,
                Weekday::Fri
            ]
        );
    }

    #[test]
    fn test_second_monday_january_through_june() {
        // 2025-01-13 is the second Monday of January.
        let spans = occurrence_spans(
            utc(2025, 1, 13, 0),
            utc(2025, 1, 13, 1),
            &recurring(RecurrenceRule::MonthlyByWeekday {
                interval: 1,
                week_of_month: 2,
                day_of_week: Weekday::Mon,
            }),
            &window(utc(2025, 1, 1, 0), utc(2025, 6, 30, 23)),
            CAP,
        );

        let days: Vec<(u32, u32)> = spans
            .iter()
            .map(|span| (span.start.month(), span.start.day()))
            .collect();
        assert_eq!(days, vec![(1, 13), (2, 10), (3, 10), (4, 14), (5, 12), (6, 9)]);
        assert!(spans.iter().all(|span| span.start.weekday() == Weekday::Mon));
    }

    #[test]
    fn test_count_bounds_unbounded_window() {
        let recurrence = Recurrence {
            rule: RecurrenceRule::Weekly {
                interval: 1,
                days: WeekdaySet::EMPTY,
            },
            bounds: RecurrenceBounds {
                until: None,
                count: Some(5),
            },
        };
        let (start, end) = (utc(2025, 2, 3, 8), utc(2025, 2, 3, 9));

        let spans = occurrence_spans(
            start,
            end,
            &recurrence,
            &window(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC),
            CAP,
        );

        assert_eq!(spans.len(), 5);
        assert!(spans.windows(2).all(|pair| pair[0].start < pair[1].start));
        assert!(spans.iter().all(|span| span.end - span.start == end - start));
    }

    #[test]
    fn test_count_includes_occurrences_before_window() {
        let recurrence = Recurrence {
            rule: RecurrenceRule::Daily { interval: 1 },
            bounds: RecurrenceBounds {
                until: None,
                count: Some(5),
            },
        };

        // Jan 1..=5 exist; only Jan 4 and 5 fall inside the window.
        let spans = occurrence_spans(
            utc(2025, 1, 1, 12),
            utc(2025, 1, 1, 13),
            &recurrence,
            &window(utc(2025, 1, 4, 0), utc(2025, 1, 31, 0)),
            CAP,
        );

        let days: Vec<u32> = spans.iter().map(|span| span.start.day()).collect();
        assert_eq!(days, vec![4, 5]);
    }

    #[test]
    fn test_until_is_inclusive() {
        let recurrence = Recurrence {
            rule: RecurrenceRule::Daily { interval: 1 },
            bounds: RecurrenceBounds {
                until: Some(utc(2025, 1, 3, 12)),
                count: None,
            },
        };

        let spans = occurrence_spans(
            utc(2025, 1, 1, 12),
            utc(2025, 1, 1, 13),
            &recurrence,
            &window(utc(2025, 1, 1, 0), utc(2025, 12, 31, 0)),
            CAP,
        );

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[2].start, utc(2025, 1, 3, 12));
    }

    #[test]
    fn test_safety_cap_bounds_long_scans() {
        let spans = occurrence_spans(
            utc(2000, 1, 1, 0),
            utc(2000, 1, 1, 1),
            &recurring(RecurrenceRule::Daily { interval: 1 }),
            &window(utc(2000, 1, 1, 0), utc(2100, 1, 1, 0)),
            CAP,
        );
        assert_eq!(spans.len(), 1000);

        let small = occurrence_spans(
            utc(2000, 1, 1, 0),
            utc(2000, 1, 1, 1),
            &recurring(RecurrenceRule::Daily { interval: 1 }),
            &window(utc(2000, 1, 1, 0), utc(2100, 1, 1, 0)),
            10,
        );
        assert_eq!(small.len(), 10);
    }

    #[test]
    fn test_cap_counts_cursors_before_window() {
        // 1000 daily steps from 2000-01-01 end in late 2002.
        let spans = occurrence_spans(
            utc(2000, 1, 1, 0),
            utc(2000, 1, 1, 1),
            &recurring(RecurrenceRule::Daily { interval: 1 }),
            &window(utc(2010, 1, 1, 0), utc(2011, 1, 1, 0)),
            CAP,
        );
        assert!(spans.is_empty());
    }

    #[test]
    fn test_recurring_template_starting_after_window() {
        let spans = occurrence_spans(
            utc(2026, 1, 1, 0),
            utc(2026, 1, 1, 1),
            &recurring(RecurrenceRule::Yearly { interval: 1 }),
            &window(utc(2025, 1, 1, 0), utc(2025, 12, 31, 0)),
            CAP,
        );
        assert!(spans.is_empty());
    }

    #[test]
    fn test_unreachable_week_of_month_stops_after_first() {
        let spans = occurrence_spans(
            utc(2025, 1, 6, 9),
            utc(2025, 1, 6, 10),
            &recurring(RecurrenceRule::MonthlyByWeekday {
                interval: 1,
                week_of_month: u32::MAX,
                day_of_week: Weekday::Mon,
            }),
            &window(utc(2025, 1, 1, 0), utc(2025, 12, 31, 0)),
            CAP,
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, utc(2025, 1, 6, 9));
    }
}
