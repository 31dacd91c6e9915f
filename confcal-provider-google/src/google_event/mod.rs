//! Conversion between confcal events and Google Calendar events.

mod from_google;
mod to_google;

pub use from_google::FromGoogle;
pub use to_google::ToGoogle;
