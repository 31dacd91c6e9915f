//! Core of confcal: mirrors a conference agenda into a calendar.
//!
//! - `transform` turns scraped agenda records into calendar-ready events
//! - `reconcile` decides which calendar entries to create, update and delete
//! - `taxonomy` tracks the category values events are tagged with
//! - `sync` runs the whole pass against an `EventSource` and a `CalendarGateway`

pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod reconcile;
pub mod sync;
pub mod taxonomy;
pub mod transform;

pub use error::{ConfcalError, ConfcalResult};
pub use event::{CalendarEntry, CanonicalEvent, RawEventRecord};
pub use gateway::{CalendarGateway, EventSource};
