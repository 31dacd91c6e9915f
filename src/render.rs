//! TUI rendering traits for confcal types.
//!
//! Extension traits that add colored terminal rendering to confcal-core
//! types using owo_colors.

use confcal_core::CanonicalEvent;
use confcal_core::reconcile::{ApplyReport, FailedOperation, OpKind, Operation, ReconciliationPlan};
use confcal_core::sync::SkippedRecord;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for OpKind {
    fn render(&self) -> String {
        colorize(*self, self.symbol())
    }
}

fn colorize(kind: OpKind, text: &str) -> String {
    match kind {
        OpKind::Create => text.green().to_string(),
        OpKind::Update => text.yellow().to_string(),
        OpKind::Delete => text.red().to_string(),
    }
}

fn event_time(event: &CanonicalEvent) -> String {
    format!(
        "{} - {}",
        event.start.format("%a %b %-d %H:%M"),
        event.end.format("%H:%M")
    )
}

impl Render for Operation<'_> {
    fn render(&self) -> String {
        let kind = self.kind();
        let title = colorize(kind, self.title());

        let time = match self {
            Operation::Create(event) => event_time(event),
            Operation::Update(update) => event_time(&update.event),
            Operation::Delete(_) => String::new(),
        };

        format!("{} {} {}", kind.render(), title, time.dimmed())
            .trim_end()
            .to_string()
    }
}

impl Render for SkippedRecord {
    fn render(&self) -> String {
        let title = self.title.as_deref().unwrap_or("(untitled)");
        format!("{} {} {}", "!".yellow(), title, self.error.dimmed())
    }
}

impl Render for FailedOperation {
    fn render(&self) -> String {
        format!("{} {} {}", self.kind.render(), self.title, self.error.red())
    }
}

/// Show counts instead of individual operations above this many.
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

pub trait PlanRender {
    fn render(&self, verbose: bool) -> String;
}

impl PlanRender for ReconciliationPlan {
    fn render(&self, verbose: bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();

        if verbose || self.len() <= COMPACT_THRESHOLD {
            for op in self.operations() {
                lines.push(format!("   {}", op.render()));
            }
        } else {
            let (creates, updates, deletes) = self.counts();

            if creates > 0 {
                let label = format!("({} new {})", creates, pluralize("event", creates));
                lines.push(format!("   {} {}", "+".green(), label.green()));
            }
            if updates > 0 {
                let label = format!("({} changed {})", updates, pluralize("event", updates));
                lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
            }
            if deletes > 0 {
                let label = format!("({} deleted {})", deletes, pluralize("event", deletes));
                lines.push(format!("   {} {}", "-".red(), label.red()));
            }
        }

        lines.join("\n")
    }
}

pub fn render_summary(report: &ApplyReport) -> String {
    let (created, updated, deleted) = report.counts();
    let mut summary = format!(
        "Created: {}, updated: {}, deleted: {}",
        created, updated, deleted
    );

    if !report.is_success() {
        let failed = report.failed.len();
        summary.push_str(&format!(
            ", {}",
            format!("{} {} failed", failed, pluralize("operation", failed)).red()
        ));
    }

    summary
}
