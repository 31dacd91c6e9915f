use std::time::Duration;

use confcal_core::{ConfcalError, ConfcalResult, EventSource, RawEventRecord};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::parse::parse_agenda;

const USER_AGENT: &str = concat!("confcal/", env!("CARGO_PKG_VERSION"));

/// The published agenda page of one conference.
pub struct AgendaSource {
    url: Url,
    client: Client,
}

impl AgendaSource {
    pub fn new(url: &str) -> ConfcalResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| ConfcalError::Config(format!("Invalid agenda URL '{url}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConfcalError::Source(format!("Failed to build HTTP client: {e}")))?;

        Ok(AgendaSource { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_page(&self) -> ConfcalResult<String> {
        let url = &self.url;
        debug!(%url, "Fetching agenda");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ConfcalError::Source(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfcalError::Source(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ConfcalError::Source(format!("{url}: body read failed: {e}")))
    }
}

impl EventSource for AgendaSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_records(&self) -> ConfcalResult<Vec<RawEventRecord>> {
        let body = self.fetch_page().await?;
        parse_agenda(&body)
    }
}
