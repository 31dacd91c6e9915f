//! The operations needed to make the calendar match the agenda, and their application.

use tracing::{info, instrument, warn};

use crate::error::ConfcalResult;
use crate::event::{CalendarEntry, CanonicalEvent};
use crate::gateway::CalendarGateway;
use crate::reconcile::OpKind;

/// An existing entry paired with the agenda event that replaces its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub entry: CalendarEntry,
    pub event: CanonicalEvent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub to_create: Vec<CanonicalEvent>,
    pub to_update: Vec<Update>,
    pub to_delete: Vec<CalendarEntry>,
}

/// One step of a plan.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Create(&'a CanonicalEvent),
    Update(&'a Update),
    Delete(&'a CalendarEntry),
}

impl Operation<'_> {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Create(_) => OpKind::Create,
            Operation::Update(_) => OpKind::Update,
            Operation::Delete(_) => OpKind::Delete,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Operation::Create(event) => &event.title,
            Operation::Update(update) => &update.event.title,
            Operation::Delete(entry) => &entry.title,
        }
    }
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.to_create.len(), self.to_update.len(), self.to_delete.len())
    }

    /// Operations in application order: creates, then updates, then deletes.
    pub fn operations(&self) -> Vec<Operation<'_>> {
        self.to_create
            .iter()
            .map(Operation::Create)
            .chain(self.to_update.iter().map(Operation::Update))
            .chain(self.to_delete.iter().map(Operation::Delete))
            .collect()
    }

    /// Apply every operation through `gateway`, one at a time.
    ///
    /// A failed operation is recorded and the remaining ones still run.
    #[instrument(skip_all, fields(operations = self.len()))]
    pub async fn apply<G: CalendarGateway>(&self, gateway: &G) -> ApplyReport {
        let mut report = ApplyReport::default();

        for op in self.operations() {
            let result = match op {
                Operation::Create(event) => gateway.insert(event).await.map(Some),
                Operation::Update(update) => {
                    gateway.patch(&update.entry.id, &update.event).await.map(Some)
                }
                Operation::Delete(entry) => gateway.delete(&entry.id).await.map(|()| None),
            };
            report.record(op, result);
        }

        report
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOperation {
    pub kind: OpKind,
    pub title: String,
    /// The entry as the calendar returned it (`None` for deletes).
    pub entry: Option<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedOperation {
    pub kind: OpKind,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: Vec<AppliedOperation>,
    pub failed: Vec<FailedOperation>,
}

impl ApplyReport {
    fn record(&mut self, op: Operation<'_>, result: ConfcalResult<Option<CalendarEntry>>) {
        let kind = op.kind();
        let title = op.title().to_string();

        match result {
            Ok(entry) => {
                let link = entry.as_ref().and_then(|e| e.html_link.as_deref()).unwrap_or("");
                match kind {
                    OpKind::Create => info!(%title, link, "Event created"),
                    OpKind::Update => info!(%title, link, "Event updated"),
                    OpKind::Delete => info!(%title, "Event deleted"),
                }
                self.applied.push(AppliedOperation { kind, title, entry });
            }
            Err(e) => {
                warn!(%title, %kind, error = %e, "Operation failed");
                self.failed.push(FailedOperation {
                    kind,
                    title,
                    error: e.to_string(),
                });
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Applied (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut created = 0;
        let mut updated = 0;
        let mut deleted = 0;

        for op in &self.applied {
            match op.kind {
                OpKind::Create => created += 1,
                OpKind::Update => updated += 1,
                OpKind::Delete => deleted += 1,
            }
        }

        (created, updated, deleted)
    }
}
