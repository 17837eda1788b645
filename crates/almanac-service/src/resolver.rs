//! Window queries: candidate fetch, per-template expansion and merge.

use almanac_core::config::ExpansionConfig;
use almanac_core::types::Window;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::candidate::CandidateSource;
use crate::error::ServiceResult;
use crate::event::Event;

/// Answers "which occurrences of this user's events fall inside this window".
pub struct OccurrenceResolver<S> {
    source: S,
    safety_cap: u32,
}

impl<S: CandidateSource> OccurrenceResolver<S> {
    #[must_use]
    pub const fn new(source: S, expansion: ExpansionConfig) -> Self {
        Self {
            source,
            safety_cap: expansion.safety_cap,
        }
    }

    #[must_use]
    pub const fn safety_cap(&self) -> u32 {
        self.safety_cap
    }

    /// ## Summary
    /// Resolves every occurrence of `user_id`'s events inside the inclusive
    /// window `[window_start, window_end]`.
    ///
    /// Occurrences are copies of their templates with the dates replaced. The
    /// result is stable-sorted by start, so occurrences starting together keep
    /// the order their templates were fetched in.
    ///
    /// ## Errors
    /// Returns `InvalidWindow` if `window_start` is after `window_end`, before
    /// any fetch. Returns `StorageUnavailable` if the candidate fetch fails; no
    /// partial result is produced.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(
        &self,
        user_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ServiceResult<Vec<Event>> {
        let window = Window::new(window_start, window_end)?;

        let templates = self.source.candidates(user_id, window).await?;
        let occurrences = expand_all(&templates, &window, self.safety_cap);

        tracing::info!(
            templates = templates.len(),
            occurrences = occurrences.len(),
            "Resolved occurrences"
        );

        Ok(occurrences)
    }
}

/// ## Summary
/// Expands each template against `window` and merges the results, stable-sorted
/// by occurrence start.
#[must_use]
pub fn expand_all(templates: &[Event], window: &Window, safety_cap: u32) -> Vec<Event> {
    let mut occurrences: Vec<Event> = templates
        .iter()
        .flat_map(|template| {
            let expanded = template.occurrences(window, safety_cap);
            tracing::debug!(
                event_id = %template.id,
                frequency = %template.recurrence.rule.frequency(),
                count = expanded.len(),
                "Expanded template"
            );
            expanded
        })
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.start_date);
    occurrences
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::error::ServiceError;
    use crate::event::tests::{template, utc};
    use crate::recurrence::{Recurrence, RecurrenceBounds, RecurrenceRule, WeekdaySet};
    use almanac_db::error::DbError;

    /// In-memory store applying the same selection rules as the database query.
    struct MemorySource {
        events: Vec<Event>,
        calls: Mutex<usize>,
    }

    impl MemorySource {
        fn with(events: Vec<Event>) -> Self {
            Self {
                events,
                calls: Mutex::new(0),
            }
        }
    }

    impl CandidateSource for MemorySource {
        fn candidates<'a>(
            &'a self,
            user_id: Uuid,
            window: Window,
        ) -> Pin<Box<dyn Future<Output = ServiceResult<Vec<Event>>> + Send + 'a>> {
            Box::pin(async move {
                *self.calls.lock().unwrap() += 1;
                let mut selected: Vec<Event> = self
                    .events
                    .iter()
                    .filter(|event| event.user_id == user_id)
                    .filter(|event| {
                        event.recurrence.rule.is_recurring()
                            || window.overlaps(event.start_date, event.end_date)
                    })
                    .cloned()
                    .collect();
                selected.sort_by_key(|event| event.start_date);
                Ok(selected)
            })
        }
    }

    struct FailingSource;

    impl CandidateSource for FailingSource {
        fn candidates<'a>(
            &'a self,
            _user_id: Uuid,
            _window: Window,
        ) -> Pin<Box<dyn Future<Output = ServiceResult<Vec<Event>>> + Send + 'a>> {
            Box::pin(async {
                Err(ServiceError::from(DbError::DatabaseError(
                    diesel::result::Error::BrokenTransactionManager,
                )))
            })
        }
    }

    fn daily(interval: u32) -> Recurrence {
        Recurrence {
            rule: RecurrenceRule::Daily { interval },
            bounds: RecurrenceBounds::default(),
        }
    }

    fn resolver(events: Vec<Event>) -> OccurrenceResolver<MemorySource> {
        OccurrenceResolver::new(MemorySource::with(events), ExpansionConfig::default())
    }

    #[test_log::test(tokio::test)]
    async fn test_reversed_window_rejected_before_fetch() {
        let resolver = resolver(Vec::new());

        let err = resolver
            .resolve(Uuid::now_v7(), utc(2025, 2, 1, 0), utc(2025, 1, 1, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidWindow { .. }));
        assert_eq!(*resolver.source.calls.lock().unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_storage_failure_propagates() {
        let resolver = OccurrenceResolver::new(FailingSource, ExpansionConfig::default());

        let err = resolver
            .resolve(Uuid::now_v7(), utc(2025, 1, 1, 0), utc(2025, 2, 1, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::StorageUnavailable(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_recurring_template_starting_before_window() {
        let user = Uuid::now_v7();
        let resolver = resolver(vec![template(user, utc(2024, 12, 1, 9), daily(7))]);

        let occurrences = resolver
            .resolve(user, utc(2025, 1, 1, 0), utc(2025, 1, 14, 23))
            .await
            .unwrap();

        // Dec 1 + 5 weeks = Jan 5, then Jan 12.
        let starts: Vec<_> = occurrences.iter().map(|o| o.start_date).collect();
        assert_eq!(starts, vec![utc(2025, 1, 5, 9), utc(2025, 1, 12, 9)]);
    }

    #[test_log::test(tokio::test)]
    async fn test_merge_is_sorted_across_templates() {
        let user = Uuid::now_v7();
        let gym = template(
            user,
            utc(2025, 1, 6, 7),
            Recurrence {
                rule: RecurrenceRule::Weekly {
                    interval: 1,
                    days: WeekdaySet::from_numbers([1, 3]),
                },
                bounds: RecurrenceBounds::default(),
            },
        );
        let dentist = template(user, utc(2025, 1, 7, 15), Recurrence::default());
        let resolver = resolver(vec![dentist.clone(), gym.clone()]);

        let occurrences = resolver
            .resolve(user, utc(2025, 1, 6, 0), utc(2025, 1, 9, 0))
            .await
            .unwrap();

        let ids: Vec<Uuid> = occurrences.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![gym.id, dentist.id, gym.id]);
        assert!(
            occurrences
                .windows(2)
                .all(|pair| pair[0].start_date <= pair[1].start_date)
        );
    }

    #[test_log::test]
    fn test_equal_starts_keep_fetch_order() {
        let user = Uuid::now_v7();
        let first = template(user, utc(2025, 3, 1, 9), daily(1));
        let second = template(user, utc(2025, 3, 2, 9), daily(2));

        let occurrences = expand_all(
            &[first.clone(), second.clone()],
            &Window::new(utc(2025, 3, 2, 0), utc(2025, 3, 2, 23)).unwrap(),
            1000,
        );

        let ids: Vec<Uuid> = occurrences.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test_log::test(tokio::test)]
    async fn test_other_users_events_excluded() {
        let user = Uuid::now_v7();
        let other = Uuid::now_v7();
        let resolver = resolver(vec![
            template(user, utc(2025, 5, 1, 9), Recurrence::default()),
            template(other, utc(2025, 5, 1, 9), daily(1)),
        ]);

        let occurrences = resolver
            .resolve(user, utc(2025, 5, 1, 0), utc(2025, 5, 31, 0))
            .await
            .unwrap();

        assert_eq!(occurrences.len(), 1);
        assert!(occurrences.iter().all(|o| o.user_id == user));
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_is_idempotent() {
        let user = Uuid::now_v7();
        let resolver = resolver(vec![
            template(user, utc(2025, 1, 31, 12), daily(3)),
            template(user, utc(2025, 2, 10, 12), Recurrence::default()),
        ]);

        let first = resolver
            .resolve(user, utc(2025, 2, 1, 0), utc(2025, 3, 1, 0))
            .await
            .unwrap();
        let second = resolver
            .resolve(user, utc(2025, 2, 1, 0), utc(2025, 3, 1, 0))
            .await
            .unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test_log::test(tokio::test)]
    async fn test_injected_cap_limits_expansion() {
        let user = Uuid::now_v7();
        let resolver = OccurrenceResolver::new(
            MemorySource::with(vec![template(user, utc(2000, 1, 1, 0), daily(1))]),
            ExpansionConfig { safety_cap: 25 },
        );

        let occurrences = resolver
            .resolve(user, utc(2000, 1, 1, 0), utc(2100, 1, 1, 0))
            .await
            .unwrap();

        assert_eq!(resolver.safety_cap(), 25);
        assert_eq!(occurrences.len(), 25);
    }
}
