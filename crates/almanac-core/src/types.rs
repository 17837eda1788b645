//! Time types shared by storage, expansion and the HTTP layer.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};

/// Inclusive `[start, end]` range of instants a caller asks occurrences for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// ## Summary
    /// Builds a window from its bounds.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidWindow` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// ## Summary
    /// Inclusive overlap test between this window and a `[start, end]` span.
    ///
    /// A span overlaps when it starts inside the window, ends inside the window,
    /// or covers the whole window.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.contains(start) || self.contains(end) || (start <= self.start && end >= self.end)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
