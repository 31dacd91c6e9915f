pub mod config;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use confcal_core::config::ConfcalConfig;
use confcal_core::sync::{SyncReport, SyncRun};
use confcal_provider_google::{GoogleCalendar, Session};
use confcal_scraper::AgendaSource;

use crate::utils::tui;

pub fn load_config(path: Option<&Path>) -> Result<ConfcalConfig> {
    let config = match path {
        Some(path) => ConfcalConfig::load_from(path),
        None => ConfcalConfig::load(),
    };
    config.context("Failed to load config")
}

/// Connect to both sides and run one pass, behind a spinner.
async fn run_pass(config: &ConfcalConfig, dry_run: bool) -> Result<SyncReport> {
    let spinner = tui::create_spinner(format!("Mirroring agenda into '{}'", config.calendar_name));

    let result = async {
        let zone = config.zone()?;
        let store = config.taxonomy_store()?;
        let source = AgendaSource::new(&config.agenda_url)?;

        let session = Session::load_valid(config.google_account.as_deref()).await?;
        let calendar =
            GoogleCalendar::connect(session, &config.calendar_name, &config.time_zone).await?;

        let report = SyncRun::new(&source, &calendar, &store, zone)
            .run(dry_run)
            .await?;
        anyhow::Ok(report)
    }
    .await;

    spinner.finish_and_clear();
    result
}
