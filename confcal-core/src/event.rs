//! Agenda and calendar event types.
//!
//! `RawEventRecord` is what the agenda scraper hands over, `CanonicalEvent` is
//! the calendar-ready form produced by the transformer, and `CalendarEntry` is
//! an event already stored in the remote calendar.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const START_DATE_LABEL: &str = "Start Date: ";
pub const START_TIME_LABEL: &str = "Start Time: ";
pub const END_TIME_LABEL: &str = "End Time: ";
pub const LOCATION_LABEL: &str = "Location: ";

/// One session as scraped from the agenda page.
///
/// Session-info fields are keyed by the label the page prints in front of
/// them (e.g. `"Start Date: "`), trailing separator included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub presenters: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl RawEventRecord {
    pub fn new(title: &str) -> Self {
        RawEventRecord {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_field(mut self, label: &str, value: &str) -> Self {
        self.fields.insert(label.to_string(), value.to_string());
        self
    }

    pub fn with_presenter(mut self, name: &str) -> Self {
        self.presenters.push(name.to_string());
        self
    }

    /// Value of a labelled field, `None` when absent or blank.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .get(label)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn start_date(&self) -> Option<&str> {
        self.field(START_DATE_LABEL)
    }

    pub fn start_time(&self) -> Option<&str> {
        self.field(START_TIME_LABEL)
    }

    pub fn end_time(&self) -> Option<&str> {
        self.field(END_TIME_LABEL)
    }

    pub fn location(&self) -> Option<&str> {
        self.field(LOCATION_LABEL)
    }
}

/// A calendar-ready session, independent of how the agenda page formats it.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    pub title: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub presenters: Vec<String>,
    /// Values per taxonomy dimension name. Never empty for a known dimension.
    pub tags: BTreeMap<String, Vec<String>>,
}

impl CanonicalEvent {
    pub fn time_zone(&self) -> Tz {
        self.start.timezone()
    }
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An event that already exists in the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
    /// Link to the entry in the calendar's web UI, if the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

impl CalendarEntry {
    pub fn new(id: &str, title: &str) -> Self {
        CalendarEntry {
            id: id.to_string(),
            title: title.to_string(),
            html_link: None,
        }
    }
}

impl fmt::Display for CalendarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
