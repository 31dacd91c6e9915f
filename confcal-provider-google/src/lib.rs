//! Google Calendar gateway for confcal.
//!
//! Talks to the Calendar v3 REST API directly. The calendar is found by its
//! display name and created on first use.

mod api;
mod app_config;
mod google_event;
mod session;
mod types;

pub use api::GoogleCalendar;
pub use app_config::AppConfig;
pub use session::Session;
