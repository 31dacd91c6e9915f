use anyhow::{Result, bail};
use confcal_core::CalendarEntry;

use crate::types::GoogleEvent;

pub trait FromGoogle {
    fn from_google(event: GoogleEvent) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for CalendarEntry {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let Some(id) = event.id.filter(|id| !id.is_empty()) else {
            bail!("Event has no id");
        };

        Ok(CalendarEntry {
            id,
            // events created by hand in the calendar UI may have no title
            title: event.summary.unwrap_or_default(),
            html_link: event.html_link,
        })
    }
}
