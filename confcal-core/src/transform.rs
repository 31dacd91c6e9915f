//! Raw agenda record → calendar-ready event.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{ConfcalError, ConfcalResult};
use crate::event::{CanonicalEvent, RawEventRecord};
use crate::taxonomy::{Taxonomy, UNDEFINED_VALUE};

/// Agenda dates look like `06/15/20 9:00 AM`.
pub const DATE_TIME_FORMAT: &str = "%m/%d/%y %I:%M %p";

const UNTITLED: &str = "(untitled)";

pub struct Transformer {
    zone: Tz,
}

impl Transformer {
    pub fn new(zone: Tz) -> Self {
        Transformer { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Build the canonical event for `record`, recording its tag values in `taxonomy`.
    ///
    /// The taxonomy is only touched when the whole record transforms cleanly.
    pub fn transform(
        &self,
        record: &RawEventRecord,
        taxonomy: &mut Taxonomy,
    ) -> ConfcalResult<CanonicalEvent> {
        let title = record.title().ok_or(ConfcalError::MissingRequiredField {
            title: UNTITLED.to_string(),
            field: "title",
        })?;
        let start_date = required(record.start_date(), title, "Start Date")?;
        let start_time = required(record.start_time(), title, "Start Time")?;
        let end_time = required(record.end_time(), title, "End Time")?;

        let start = self.instant(title, start_date, start_time)?;
        let end = self.end_instant(title, start_date, end_time)?;
        if end < start {
            warn!(title, "Session ends before it starts; sessions cannot cross midnight");
        }

        let tags = tags_for(record, taxonomy);
        let description = describe(record, taxonomy);

        for (name, values) in &tags {
            taxonomy.observe(name, values);
        }

        Ok(CanonicalEvent {
            title: title.to_string(),
            description,
            start,
            end,
            location: record.location().map(str::to_string),
            presenters: record.presenters.clone(),
            tags,
        })
    }

    /// The agenda has no end date: a session ends on the day it starts.
    fn end_instant(&self, title: &str, start_date: &str, end_time: &str) -> ConfcalResult<DateTime<Tz>> {
        self.instant(title, start_date, end_time)
    }

    fn instant(&self, title: &str, date: &str, time: &str) -> ConfcalResult<DateTime<Tz>> {
        let input = format!("{} {}", date, time);
        let parse_error = || ConfcalError::DateParse {
            title: title.to_string(),
            input: input.clone(),
        };

        let naive = NaiveDateTime::parse_from_str(&input, DATE_TIME_FORMAT).map_err(|_| parse_error())?;

        // Ambiguous local times (DST fall-back) resolve to the earlier instant;
        // times skipped by a DST jump do not exist and are rejected.
        self.zone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(parse_error)
    }
}

fn required<'a>(value: Option<&'a str>, title: &str, field: &'static str) -> ConfcalResult<&'a str> {
    value.ok_or_else(|| ConfcalError::MissingRequiredField {
        title: title.to_string(),
        field,
    })
}

fn tags_for(record: &RawEventRecord, taxonomy: &Taxonomy) -> BTreeMap<String, Vec<String>> {
    taxonomy
        .dimensions()
        .iter()
        .map(|dimension| {
            let values: Vec<String> = record
                .field(&dimension.label)
                .map(split_values)
                .unwrap_or_default();

            let values = if values.is_empty() {
                vec![UNDEFINED_VALUE.to_string()]
            } else {
                values
            };

            (dimension.name.clone(), values)
        })
        .collect()
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn describe(record: &RawEventRecord, taxonomy: &Taxonomy) -> String {
    let mut description = format!("{}\n\n", record.description.as_deref().unwrap_or("").trim());

    if !record.presenters.is_empty() {
        description.push_str(&format!("Presenter(s):\t{}\n", record.presenters.join(", ")));
    }

    for dimension in taxonomy.dimensions() {
        if let Some(value) = record.field(&dimension.label) {
            description.push_str(&format!("{}\t{}\n", dimension.label, value));
        }
    }

    description
}
