//! Boundaries to the outside world: the agenda being mirrored and the calendar it is mirrored into.
//!
//! Implementations live in their own crates (`confcal-scraper`,
//! `confcal-provider-google`). Calls are awaited one at a time; timeouts and
//! retries, if any, belong to the implementation.

use crate::error::ConfcalResult;
use crate::event::{CalendarEntry, CanonicalEvent, RawEventRecord};

/// The remote calendar store for one named calendar.
#[allow(async_fn_in_trait)]
pub trait CalendarGateway {
    /// Every entry currently in the calendar, all pages concatenated.
    async fn list_entries(&self) -> ConfcalResult<Vec<CalendarEntry>>;

    async fn insert(&self, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry>;

    /// Overwrite entry `id` with the content of `event`.
    async fn patch(&self, id: &str, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry>;

    async fn delete(&self, id: &str) -> ConfcalResult<()>;
}

/// Where agenda records come from, in page order.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    async fn fetch_records(&self) -> ConfcalResult<Vec<RawEventRecord>>;
}
