//! Matching agenda events against calendar entries.

mod op_kind;
mod plan;

pub use op_kind::OpKind;
pub use plan::{AppliedOperation, ApplyReport, FailedOperation, Operation, ReconciliationPlan, Update};

use std::collections::{HashMap, HashSet};

use crate::error::{ConfcalError, ConfcalResult};
use crate::event::{CalendarEntry, CanonicalEvent};

/// Decide, for one run, which events to create, which entries to update and which to delete.
///
/// Events match entries by exact, case-sensitive title. When several entries
/// share a title the first one in `existing` is updated and the others are
/// deleted. Two agenda events with the same title reject the whole batch.
pub fn reconcile(
    existing: &[CalendarEntry],
    events: Vec<CanonicalEvent>,
) -> ConfcalResult<ReconciliationPlan> {
    let mut seen = HashSet::new();
    if let Some(dup) = events.iter().find(|e| !seen.insert(e.title.as_str())) {
        return Err(ConfcalError::DuplicateTitle(dup.title.clone()));
    }

    let mut by_title: HashMap<&str, usize> = HashMap::with_capacity(existing.len());
    for (i, entry) in existing.iter().enumerate() {
        by_title.entry(entry.title.as_str()).or_insert(i);
    }

    let mut matched = vec![false; existing.len()];
    let mut plan = ReconciliationPlan::default();

    for event in events {
        match by_title.get(event.title.as_str()).copied() {
            Some(i) => {
                matched[i] = true;
                plan.to_update.push(Update {
                    entry: existing[i].clone(),
                    event,
                });
            }
            None => plan.to_create.push(event),
        }
    }

    plan.to_delete = existing
        .iter()
        .zip(matched)
        .filter(|(_, matched)| !matched)
        .map(|(entry, _)| entry.clone())
        .collect();

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;
    use std::collections::BTreeMap;

    fn event(title: &str) -> CanonicalEvent {
        CanonicalEvent {
            title: title.to_string(),
            description: String::new(),
            start: New_York.with_ymd_and_hms(2020, 6, 15, 9, 0, 0).unwrap(),
            end: New_York.with_ymd_and_hms(2020, 6, 15, 10, 0, 0).unwrap(),
            location: None,
            presenters: vec![],
            tags: BTreeMap::new(),
        }
    }

    fn entries(titles: &[&str]) -> Vec<CalendarEntry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| CalendarEntry::new(&format!("id-{i}"), t))
            .collect()
    }

    #[test]
    fn test_partitions_entries_and_events() {
        let existing = entries(&["Keynote", "Old Session", "Lunch"]);
        let events = vec![event("Lunch"), event("Workshop"), event("Keynote")];

        let plan = reconcile(&existing, events).unwrap();

        let created: Vec<_> = plan.to_create.iter().map(|e| e.title.as_str()).collect();
        let updated: Vec<_> = plan.to_update.iter().map(|u| u.entry.id.as_str()).collect();
        let deleted: Vec<_> = plan.to_delete.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(created, ["Workshop"]);
        assert_eq!(updated, ["id-2", "id-0"]);
        assert_eq!(deleted, ["id-1"]);

        // every entry exactly once across updated + deleted
        let mut ids: Vec<_> = updated.iter().chain(&deleted).copied().collect();
        ids.sort();
        assert_eq!(ids, ["id-0", "id-1", "id-2"]);
        // every event exactly once across created + updated
        assert_eq!(plan.to_create.len() + plan.to_update.len(), 3);
        assert_eq!(plan.counts(), (1, 2, 1));
    }

    #[test]
    fn test_no_events_deletes_everything() {
        let existing = entries(&["A", "B"]);
        let plan = reconcile(&existing, vec![]).unwrap();

        assert!(plan.to_create.is_empty());
        assert!(plan.to_update.is_empty());
        assert_eq!(plan.to_delete, existing);
    }

    #[test]
    fn test_empty_calendar_creates_everything() {
        let plan = reconcile(&[], vec![event("A"), event("B")]).unwrap();

        assert!(plan.to_delete.is_empty());
        assert!(plan.to_update.is_empty());
        let created: Vec<_> = plan.to_create.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(created, ["A", "B"]);
    }

    #[test]
    fn test_title_match_is_case_sensitive() {
        let existing = entries(&["intro to cs"]);
        let plan = reconcile(&existing, vec![event("Intro to CS")]).unwrap();

        assert_eq!(plan.to_create.len(), 1);
        assert!(plan.to_update.is_empty());
        assert_eq!(plan.to_delete, existing);
    }

    #[test]
    fn test_duplicate_entries_first_match_wins() {
        let existing = entries(&["Keynote", "Keynote"]);
        let plan = reconcile(&existing, vec![event("Keynote")]).unwrap();

        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].entry.id, "id-0");
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id, "id-1");
    }

    #[test]
    fn test_duplicate_agenda_titles_rejected() {
        let existing = entries(&["Keynote"]);
        let result = reconcile(&existing, vec![event("Keynote"), event("Keynote")]);

        match result {
            Err(ConfcalError::DuplicateTitle(title)) => assert_eq!(title, "Keynote"),
            other => panic!("Expected DuplicateTitle, got {:?}", other),
        }
    }

    #[test]
    fn test_operations_order() {
        let existing = entries(&["Gone", "Kept"]);
        let plan = reconcile(&existing, vec![event("Kept"), event("New")]).unwrap();

        let ops: Vec<_> = plan
            .operations()
            .iter()
            .map(|op| format!("{} {}", op.kind(), op.title()))
            .collect();
        assert_eq!(ops, ["+ New", "~ Kept", "- Gone"]);
    }
}
