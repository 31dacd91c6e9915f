//! One end-to-end mirroring run.

use chrono_tz::Tz;
use tracing::{info, instrument, warn};

use crate::error::ConfcalResult;
use crate::event::{CanonicalEvent, RawEventRecord};
use crate::gateway::{CalendarGateway, EventSource};
use crate::reconcile::{ApplyReport, ReconciliationPlan, reconcile};
use crate::taxonomy::{Taxonomy, TaxonomyStore};
use crate::transform::Transformer;

/// An agenda record that could not be turned into an event.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub title: Option<String>,
    pub error: String,
}

#[derive(Debug)]
pub struct SyncReport {
    pub scraped: usize,
    pub skipped: Vec<SkippedRecord>,
    pub plan: ReconciliationPlan,
    /// `None` on dry runs.
    pub applied: Option<ApplyReport>,
    pub taxonomy: Taxonomy,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.applied.as_ref().is_none_or(ApplyReport::is_success)
    }
}

pub struct SyncRun<'a, S, G> {
    source: &'a S,
    gateway: &'a G,
    store: &'a TaxonomyStore,
    transformer: Transformer,
}

impl<'a, S: EventSource, G: CalendarGateway> SyncRun<'a, S, G> {
    pub fn new(source: &'a S, gateway: &'a G, store: &'a TaxonomyStore, zone: Tz) -> Self {
        SyncRun {
            source,
            gateway,
            store,
            transformer: Transformer::new(zone),
        }
    }

    /// Fetch both sides, reconcile them and, unless `dry_run`, apply the plan
    /// and persist the taxonomy.
    #[instrument(skip(self), fields(zone = %self.transformer.zone()))]
    pub async fn run(&self, dry_run: bool) -> ConfcalResult<SyncReport> {
        let existing = self.gateway.list_entries().await?;
        info!(count = existing.len(), "Listed calendar entries");

        let records = self.source.fetch_records().await?;
        info!(count = records.len(), "Fetched agenda sessions");

        let mut taxonomy = self.store.load()?;
        let (events, skipped) = transform_all(&self.transformer, &records, &mut taxonomy);

        let plan = reconcile(&existing, events)?;
        let (create, update, delete) = plan.counts();
        info!(create, update, delete, "Reconciled");

        let applied = if dry_run {
            None
        } else {
            let report = plan.apply(self.gateway).await;
            self.store.persist(&taxonomy)?;
            Some(report)
        };

        Ok(SyncReport {
            scraped: records.len(),
            skipped,
            plan,
            applied,
            taxonomy,
        })
    }
}

/// Transform every record, skipping the ones that fail.
pub fn transform_all(
    transformer: &Transformer,
    records: &[RawEventRecord],
    taxonomy: &mut Taxonomy,
) -> (Vec<CanonicalEvent>, Vec<SkippedRecord>) {
    let mut events = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        match transformer.transform(record, taxonomy) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(title = record.title().unwrap_or_default(), error = %e, "Skipping session");
                skipped.push(SkippedRecord {
                    title: record.title().map(str::to_string),
                    error: e.to_string(),
                });
            }
        }
    }

    (events, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfcalError;
    use crate::event::{CalendarEntry, END_TIME_LABEL, START_DATE_LABEL, START_TIME_LABEL};
    use crate::reconcile::OpKind;
    use chrono_tz::America::New_York;
    use std::cell::RefCell;

    struct FakeSource(Vec<RawEventRecord>);

    impl EventSource for FakeSource {
        async fn fetch_records(&self) -> ConfcalResult<Vec<RawEventRecord>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakeCalendar {
        entries: Vec<CalendarEntry>,
        calls: RefCell<Vec<String>>,
        fail_title: Option<String>,
    }

    impl FakeCalendar {
        fn with_entries(titles: &[&str]) -> Self {
            FakeCalendar {
                entries: titles
                    .iter()
                    .enumerate()
                    .map(|(i, t)| CalendarEntry::new(&format!("evt{i}"), t))
                    .collect(),
                ..Default::default()
            }
        }

        fn check(&self, title: &str) -> ConfcalResult<()> {
            if self.fail_title.as_deref() == Some(title) {
                return Err(ConfcalError::Gateway("backend unavailable".into()));
            }
            Ok(())
        }
    }

    impl CalendarGateway for FakeCalendar {
        async fn list_entries(&self) -> ConfcalResult<Vec<CalendarEntry>> {
            Ok(self.entries.clone())
        }

        async fn insert(&self, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry> {
            self.check(&event.title)?;
            self.calls.borrow_mut().push(format!("insert {}", event.title));
            Ok(CalendarEntry::new("new", &event.title))
        }

        async fn patch(&self, id: &str, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry> {
            self.check(&event.title)?;
            self.calls.borrow_mut().push(format!("patch {id} {}", event.title));
            Ok(CalendarEntry::new(id, &event.title))
        }

        async fn delete(&self, id: &str) -> ConfcalResult<()> {
            self.calls.borrow_mut().push(format!("delete {id}"));
            Ok(())
        }
    }

    fn keynote() -> RawEventRecord {
        RawEventRecord::new("Keynote")
            .with_description("Opening remarks")
            .with_field(START_DATE_LABEL, "06/15/20")
            .with_field(START_TIME_LABEL, "9:00 AM")
            .with_field(END_TIME_LABEL, "10:00 AM")
    }

    fn store_in(dir: &tempfile::TempDir) -> TaxonomyStore {
        let categories = dir.path().join("categories.json");
        std::fs::write(&categories, r#"[{"name": "Session Type"}]"#).unwrap();
        TaxonomyStore::new(categories, dir.path().join("filter.json"))
    }

    #[tokio::test]
    async fn test_first_run_creates_keynote() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let source = FakeSource(vec![keynote()]);
        let calendar = FakeCalendar::default();

        let report = SyncRun::new(&source, &calendar, &store, New_York)
            .run(false)
            .await
            .unwrap();

        assert_eq!(report.plan.counts(), (1, 0, 0));
        let created = &report.plan.to_create[0];
        assert_eq!(created.title, "Keynote");
        assert_eq!(created.location, None);
        assert_eq!(*calendar.calls.borrow(), ["insert Keynote"]);
        assert!(report.is_success());

        // taxonomy persisted once the pass is done
        let persisted = store.read_persisted().unwrap();
        let values: Vec<_> = persisted.dimensions()[0].values.iter().cloned().collect();
        assert_eq!(values, ["Undefined"]);
    }

    #[tokio::test]
    async fn test_second_run_patches_keynote() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let source = FakeSource(vec![keynote()]);
        let calendar = FakeCalendar::with_entries(&["Keynote"]);

        let report = SyncRun::new(&source, &calendar, &store, New_York)
            .run(false)
            .await
            .unwrap();

        assert_eq!(report.plan.counts(), (0, 1, 0));
        assert_eq!(*calendar.calls.borrow(), ["patch evt0 Keynote"]);
    }

    #[tokio::test]
    async fn test_bad_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let broken = RawEventRecord::new("Broken")
            .with_field(START_DATE_LABEL, "June 15")
            .with_field(START_TIME_LABEL, "9:00 AM")
            .with_field(END_TIME_LABEL, "10:00 AM");
        let source = FakeSource(vec![broken, keynote()]);
        let calendar = FakeCalendar::with_entries(&["Broken"]);

        let report = SyncRun::new(&source, &calendar, &store, New_York)
            .run(false)
            .await
            .unwrap();

        assert_eq!(report.scraped, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].title.as_deref(), Some("Broken"));
        // the unparseable session is no longer on the agenda as far as the calendar knows
        assert_eq!(report.plan.counts(), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_failed_operation_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut lunch = keynote();
        lunch.title = Some("Lunch".into());
        let source = FakeSource(vec![keynote(), lunch]);
        let calendar = FakeCalendar {
            fail_title: Some("Keynote".into()),
            ..FakeCalendar::with_entries(&["Stale"])
        };

        let report = SyncRun::new(&source, &calendar, &store, New_York)
            .run(false)
            .await
            .unwrap();

        let applied = report.applied.as_ref().unwrap();
        assert_eq!(applied.failed.len(), 1);
        assert_eq!(applied.failed[0].kind, OpKind::Create);
        assert_eq!(applied.failed[0].title, "Keynote");
        assert_eq!(applied.counts(), (1, 0, 1));
        assert!(!report.is_success());
        assert_eq!(*calendar.calls.borrow(), ["insert Lunch", "delete evt0"]);
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let source = FakeSource(vec![keynote()]);
        let calendar = FakeCalendar::with_entries(&["Stale"]);

        let report = SyncRun::new(&source, &calendar, &store, New_York)
            .run(true)
            .await
            .unwrap();

        assert_eq!(report.plan.counts(), (1, 0, 1));
        assert!(report.applied.is_none());
        assert!(calendar.calls.borrow().is_empty());
        assert!(!store.filter_path().exists());
    }

    #[tokio::test]
    async fn test_duplicate_agenda_titles_abort_before_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let source = FakeSource(vec![keynote(), keynote()]);
        let calendar = FakeCalendar::default();

        let result = SyncRun::new(&source, &calendar, &store, New_York).run(false).await;

        assert!(matches!(result, Err(ConfcalError::DuplicateTitle(_))));
        assert!(calendar.calls.borrow().is_empty());
    }
}
