//! Google Calendar v3 gateway.

use anyhow::{Context, Result};
use confcal_core::{CalendarEntry, CalendarGateway, CanonicalEvent, ConfcalError, ConfcalResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::google_event::{FromGoogle, ToGoogle};
use crate::session::Session;
use crate::types::{CalendarList, CreatedCalendar, EventList, GoogleEvent, NewCalendar};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "2500";

/// One Google calendar, resolved by display name.
pub struct GoogleCalendar {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
    calendar_id: String,
}

impl GoogleCalendar {
    /// Find the calendar whose summary is `name`, creating it in `time_zone` if there is none.
    pub async fn connect(session: Session, name: &str, time_zone: &str) -> Result<Self> {
        Self::connect_at(API_BASE, session, name, time_zone).await
    }

    pub async fn connect_at(
        base_url: &str,
        session: Session,
        name: &str,
        time_zone: &str,
    ) -> Result<Self> {
        let mut calendar = GoogleCalendar {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)
                .with_context(|| format!("Invalid API base URL: {base_url}"))?,
            session,
            calendar_id: String::new(),
        };

        calendar.calendar_id = match calendar.find_calendar(name).await? {
            Some(id) => id,
            None => calendar.create_calendar(name, time_zone).await?,
        };
        debug!(calendar_id = %calendar.calendar_id, "Resolved calendar");

        Ok(calendar)
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("API base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        match event_id {
            Some(id) => self.url(&["calendars", &self.calendar_id, "events", id]),
            None => self.url(&["calendars", &self.calendar_id, "events"]),
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.session.access_token())
    }

    async fn find_calendar(&self, name: &str) -> Result<Option<String>> {
        let url = self.url(&["users", "me", "calendarList"])?;
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: CalendarList = read_json(request.send().await?)
                .await
                .context("Failed to list calendars")?;

            if let Some(entry) = page.items.into_iter().find(|c| c.summary == name) {
                return Ok(Some(entry.id));
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(None),
            }
        }
    }

    async fn create_calendar(&self, name: &str, time_zone: &str) -> Result<String> {
        let body = NewCalendar {
            summary: name.to_string(),
            time_zone: time_zone.to_string(),
        };

        let created: CreatedCalendar = read_json(
            self.request(Method::POST, self.url(&["calendars"])?)
                .json(&body)
                .send()
                .await?,
        )
        .await
        .with_context(|| format!("Failed to create calendar: {name}"))?;

        tracing::info!(name, "Created calendar");
        Ok(created.id)
    }

    async fn fetch_entries(&self) -> Result<Vec<CalendarEntry>> {
        let url = self.events_url(None)?;
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, url.clone())
                .query(&[("maxResults", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: EventList = read_json(request.send().await?)
                .await
                .context("Failed to fetch events")?;

            for event in page.items {
                entries.push(CalendarEntry::from_google(event)?);
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(entries),
            }
        }
    }

    async fn write_event(
        &self,
        method: Method,
        event_id: Option<&str>,
        event: &CanonicalEvent,
    ) -> Result<CalendarEntry> {
        let response = self
            .request(method, self.events_url(event_id)?)
            .json(&event.to_google())
            .send()
            .await?;

        let written: GoogleEvent = read_json(response).await?;
        CalendarEntry::from_google(written)
    }

    async fn remove_event(&self, event_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.events_url(Some(event_id))?)
            .send()
            .await?;

        match response.status() {
            // already gone
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(()),
            _ => check(response).await.map(|_| ()),
        }
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("Google Calendar API returned {status}: {body}")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    response
        .json()
        .await
        .context("Failed to parse Google Calendar API response")
}

fn gateway_error(e: anyhow::Error) -> ConfcalError {
    ConfcalError::Gateway(format!("{:#}", e))
}

impl CalendarGateway for GoogleCalendar {
    #[instrument(skip(self), fields(calendar_id = %self.calendar_id))]
    async fn list_entries(&self) -> ConfcalResult<Vec<CalendarEntry>> {
        self.fetch_entries().await.map_err(gateway_error)
    }

    #[instrument(skip_all, fields(title = %event.title))]
    async fn insert(&self, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry> {
        self.write_event(Method::POST, None, event)
            .await
            .with_context(|| format!("Failed to create event: {}", event.title))
            .map_err(gateway_error)
    }

    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn patch(&self, id: &str, event: &CanonicalEvent) -> ConfcalResult<CalendarEntry> {
        self.write_event(Method::PATCH, Some(id), event)
            .await
            .with_context(|| format!("Failed to update event: {}", event.title))
            .map_err(gateway_error)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ConfcalResult<()> {
        self.remove_event(id)
            .await
            .with_context(|| format!("Failed to delete event: {id}"))
            .map_err(gateway_error)
    }
}
