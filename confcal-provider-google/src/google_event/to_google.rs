use chrono::DateTime;
use chrono_tz::Tz;
use confcal_core::CanonicalEvent;
use confcal_core::taxonomy::dimension_key;

use crate::types::{EventDateTime, ExtendedProperties, GoogleEvent, Reminders};

/// Value stored under every tag property; only the property name carries information.
const TAG_PRESENT: &str = "yes";

pub trait ToGoogle {
    fn to_google(&self) -> GoogleEvent;
}

impl ToGoogle for CanonicalEvent {
    fn to_google(&self) -> GoogleEvent {
        let shared = self
            .tags
            .iter()
            .flat_map(|(dimension, values)| {
                let key = dimension_key(dimension);
                values
                    .iter()
                    .map(move |value| (format!("{}{}", key, value), TAG_PRESENT.to_string()))
            })
            .collect::<std::collections::BTreeMap<_, _>>();

        let extended_properties = if shared.is_empty() {
            None
        } else {
            Some(ExtendedProperties { shared })
        };

        GoogleEvent {
            id: None,
            summary: Some(self.title.clone()),
            description: Some(self.description.clone()),
            location: self.location.clone(),
            // agenda sessions never block the attendee's time
            transparency: Some("transparent".to_string()),
            reminders: Some(Reminders { use_default: false }),
            start: Some(event_time_to_google(&self.start)),
            end: Some(event_time_to_google(&self.end)),
            extended_properties,
            html_link: None,
        }
    }
}

fn event_time_to_google(time: &DateTime<Tz>) -> EventDateTime {
    EventDateTime {
        date_time: Some(time.to_rfc3339()),
        time_zone: Some(time.timezone().name().to_string()),
    }
}
