use chrono::{DateTime, Utc};

/// A domain event: an immutable fact appended to the log.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - grouped into **streams** by `AGGREGATE_TYPE`, so projectors only see the
///   events they understand
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stream the events of this type are stored under (e.g. "finance.account").
    const AGGREGATE_TYPE: &'static str;

    /// Stable event name/type identifier (e.g. "finance.account.deposited").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
