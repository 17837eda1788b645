//! Candidate selection: the broad-phase fetch behind a window query.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use almanac_core::types::Window;
use almanac_db::db::DbProvider;
use almanac_db::db::query::event as event_query;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::event::Event;

/// Storage contract for window queries.
///
/// Implementations return the union of the user's one-off templates that
/// overlap `window` (inclusive) and all of the user's recurring templates,
/// whatever their own dates. Over-fetching recurring templates is expected;
/// expansion decides which of their occurrences land in the window.
pub trait CandidateSource: Send + Sync {
    fn candidates<'a>(
        &'a self,
        user_id: Uuid,
        window: Window,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<Vec<Event>>> + Send + 'a>>;
}

/// Candidate source backed by the `calendar_event` table.
#[derive(Clone)]
pub struct DbCandidateSource {
    provider: Arc<dyn DbProvider + Send + Sync>,
}

impl DbCandidateSource {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider + Send + Sync>) -> Self {
        Self { provider }
    }
}

impl CandidateSource for DbCandidateSource {
    fn candidates<'a>(
        &'a self,
        user_id: Uuid,
        window: Window,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<Vec<Event>>> + Send + 'a>> {
        Box::pin(async move {
            let mut conn = self.provider.get_connection().await?;
            let rows = event_query::find_candidates(&mut conn, user_id, &window).await?;
            Ok(rows.into_iter().map(Event::from).collect())
        })
    }
}
