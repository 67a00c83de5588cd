//! Read-only event queries for inspection and debugging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_store::StoredEvent;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination parameters for event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of events to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }

    /// Lower the limit to `max` if it exceeds it.
    pub fn capped(self, max: u32) -> Self {
        Self {
            limit: self.limit.min(max),
            ..self
        }
    }
}

/// Filter criteria for event queries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// e.g. "finance.account"
    pub aggregate_type: Option<String>,
    /// e.g. "finance.account.deposited"
    pub event_type: Option<String>,
    pub occurred_after: Option<DateTime<Utc>>,
    pub occurred_before: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn aggregate_type(aggregate_type: impl Into<String>) -> Self {
        Self {
            aggregate_type: Some(aggregate_type.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &StoredEvent) -> bool {
        self.aggregate_type
            .as_deref()
            .is_none_or(|t| t == event.aggregate_type)
            && self.event_type.as_deref().is_none_or(|t| t == event.event_type)
            && self.occurred_after.is_none_or(|t| event.occurred_at > t)
            && self.occurred_before.is_none_or(|t| event.occurred_at < t)
    }
}

/// One page of a filtered event query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    pub events: Vec<StoredEvent>,
    /// Number of events matching the filter across all pages.
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

impl EventPage {
    /// Filter `events` (already in sequence order) and cut out one page.
    pub fn collect(
        events: impl IntoIterator<Item = StoredEvent>,
        filter: &EventFilter,
        pagination: Pagination,
    ) -> Self {
        let matching: Vec<StoredEvent> = events.into_iter().filter(|e| filter.matches(e)).collect();
        let total = matching.len();
        let start = (pagination.offset as usize).min(total);
        let end = start.saturating_add(pagination.limit as usize).min(total);

        Self {
            events: matching[start..end].to_vec(),
            total: total as u64,
            pagination,
            has_more: end < total,
        }
    }
}
