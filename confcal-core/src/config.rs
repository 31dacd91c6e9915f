//! confcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfcalError, ConfcalResult};
use crate::taxonomy::TaxonomyStore;

static DEFAULT_AGENDA_URL: &str = "https://www.cvent.com/events/2020-csta-annual-conference/agenda-236d288a403041f8a7a935b0bd74131c.aspx";
static DEFAULT_CALENDAR_NAME: &str = "CSTA Conference";
static DEFAULT_TIME_ZONE: &str = "America/New_York";
static DEFAULT_CATEGORIES_PATH: &str = "~/.config/confcal/categories.json";
static DEFAULT_FILTER_PATH: &str = "~/.config/confcal/filter.json";

fn default_agenda_url() -> String {
    DEFAULT_AGENDA_URL.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_categories_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATEGORIES_PATH)
}

fn default_filter_path() -> PathBuf {
    PathBuf::from(DEFAULT_FILTER_PATH)
}

/// Configuration at ~/.config/confcal/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfcalConfig {
    /// Agenda page that is the source of truth.
    #[serde(default = "default_agenda_url")]
    pub agenda_url: String,

    /// Calendar (by display name) that mirrors the agenda. Created if missing.
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// IANA zone the agenda's wall-clock times are in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default = "default_categories_path")]
    pub categories_path: PathBuf,

    #[serde(default = "default_filter_path")]
    pub filter_path: PathBuf,

    /// Selects the stored provider session; the default session when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_account: Option<String>,
}

impl Default for ConfcalConfig {
    fn default() -> Self {
        ConfcalConfig {
            agenda_url: default_agenda_url(),
            calendar_name: default_calendar_name(),
            time_zone: default_time_zone(),
            categories_path: default_categories_path(),
            filter_path: default_filter_path(),
            google_account: None,
        }
    }
}

impl ConfcalConfig {
    pub fn config_dir() -> ConfcalResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| ConfcalError::Config("Could not determine config directory".into()))?
            .join("confcal"))
    }

    pub fn config_path() -> ConfcalResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> ConfcalResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn load() -> ConfcalResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn parse(content: &str) -> ConfcalResult<Self> {
        let config: ConfcalConfig =
            toml::from_str(content).map_err(|e| ConfcalError::Config(e.to_string()))?;
        config.zone()?;
        Ok(config)
    }

    pub fn zone(&self) -> ConfcalResult<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| ConfcalError::Config(format!("Unknown time zone '{}'", self.time_zone)))
    }

    pub fn taxonomy_store(&self) -> ConfcalResult<TaxonomyStore> {
        Ok(TaxonomyStore::new(
            expand_path(&self.categories_path)?,
            expand_path(&self.filter_path)?,
        ))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ConfcalResult<()> {
        let contents = format!(
            "\
# confcal configuration

# Agenda page to mirror:
# agenda_url = \"{DEFAULT_AGENDA_URL}\"

# Calendar that mirrors it (created if it does not exist):
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"

# Time zone of the agenda's times:
# time_zone = \"{DEFAULT_TIME_ZONE}\"

# Category dimensions to tag events with (JSON list of {{\"name\": ...}}):
# categories_path = \"{DEFAULT_CATEGORIES_PATH}\"

# Where observed category values are written:
# filter_path = \"{DEFAULT_FILTER_PATH}\"

# Google account whose stored session to use:
# google_account = \"you@example.com\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ConfcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand_path(path: &Path) -> ConfcalResult<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| ConfcalError::Config(format!("Could not expand path '{raw}': {e}")))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
