//! Agenda HTML parsing.
//!
//! A session block looks like:
//!
//! ```html
//! <div class="reg-matrix-header-container">
//!   <div><h3>Keynote</h3></div>
//!   <div>
//!     <div class="session-description">Opening remarks</div>
//!     <div class="session-info">
//!       <p><span>Start Date: <span>06/15/20</span></span></p>
//!       <p><span class="speaker-name"><a>Ada Lovelace</a></span></p>
//!     </div>
//!   </div>
//! </div>
//! ```

use confcal_core::{ConfcalError, ConfcalResult, RawEventRecord};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const SESSION_SELECTOR: &str = "div.reg-matrix-header-container";
const SPEAKER_CLASS: &str = "speaker-name";

/// Extract one record per session block, in page order.
pub fn parse_agenda(html: &str) -> ConfcalResult<Vec<RawEventRecord>> {
    let doc = Html::parse_document(html);
    let sessions = Selector::parse(SESSION_SELECTOR)
        .map_err(|e| ConfcalError::Source(format!("Invalid session selector: {e}")))?;

    let records: Vec<RawEventRecord> = doc.select(&sessions).map(parse_session).collect();
    debug!(sessions = records.len(), "Parsed agenda");

    Ok(records)
}

fn parse_session(session: ElementRef<'_>) -> RawEventRecord {
    let mut record = RawEventRecord::default();

    for block in child_elements(session, "div") {
        if record.title.is_none() {
            record.title = child_elements(block, "h3").find_map(own_text);
        }

        for inner in child_elements(block, "div") {
            match inner.value().attr("class") {
                Some("session-description") if record.description.is_none() => {
                    record.description = own_text(inner);
                }
                Some("session-info") => {
                    for info in child_elements(inner, "p").flat_map(|p| child_elements(p, "span")) {
                        read_info(info, &mut record);
                    }
                }
                _ => {}
            }
        }
    }

    record
}

/// A labelled field (`Label: <span>value</span>`) or a speaker list.
fn read_info(info: ElementRef<'_>, record: &mut RawEventRecord) {
    if let Some(value) = child_elements(info, "span").find_map(own_text) {
        if let Some(label) = own_text(info) {
            record.fields.insert(format!("{label} "), value);
        }
    } else if info.value().attr("class") == Some(SPEAKER_CLASS) {
        record
            .presenters
            .extend(child_elements(info, "a").filter_map(own_text));
    }
}

fn child_elements<'a>(parent: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

/// First non-blank text node directly inside `el`, trimmed.
fn own_text(el: ElementRef<'_>) -> Option<String> {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confcal_core::event::{END_TIME_LABEL, LOCATION_LABEL, START_DATE_LABEL, START_TIME_LABEL};

    const AGENDA: &str = r#"
        <html><body>
        <div class="reg-matrix-header-container">
          <div><h3>
            Keynote
          </h3></div>
          <div>
            <div class="session-description">  Opening remarks  </div>
            <div class="session-info">
              <p><span>Start Date: <span>06/15/20</span></span></p>
              <p><span>Start Time: <span>9:00 AM</span></span></p>
              <p><span>End Time: <span>10:30 AM</span></span></p>
              <p><span>Location:<span>Ballroom A</span></span></p>
              <p><span class="speaker-name"><a>Ada Lovelace</a>, <a>Alan Turing</a></span></p>
              <p><span>Computer Science Keywords: <span>Robotics, AI</span></span></p>
            </div>
          </div>
        </div>
        <div class="reg-matrix-header-container">
          <div><h3>Lunch</h3></div>
          <div>
            <div class="session-description">Food</div>
            <div class="session-info">
              <p><span>Start Date: <span>06/15/20</span></span></p>
            </div>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_sessions_in_page_order() {
        let records = parse_agenda(AGENDA).unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title()).collect();
        assert_eq!(titles, [Some("Keynote"), Some("Lunch")]);
    }

    #[test]
    fn test_parse_session_fields() {
        let records = parse_agenda(AGENDA).unwrap();
        let keynote = &records[0];

        assert_eq!(keynote.description.as_deref(), Some("Opening remarks"));
        assert_eq!(keynote.field(START_DATE_LABEL), Some("06/15/20"));
        assert_eq!(keynote.field(START_TIME_LABEL), Some("9:00 AM"));
        assert_eq!(keynote.field(END_TIME_LABEL), Some("10:30 AM"));
        assert_eq!(keynote.field(LOCATION_LABEL), Some("Ballroom A"));
        assert_eq!(
            keynote.field("Computer Science Keywords: "),
            Some("Robotics, AI")
        );
        assert_eq!(keynote.presenters, ["Ada Lovelace", "Alan Turing"]);
    }

    #[test]
    fn test_parse_partial_session() {
        let records = parse_agenda(AGENDA).unwrap();
        let lunch = &records[1];

        assert_eq!(lunch.field(START_DATE_LABEL), Some("06/15/20"));
        assert_eq!(lunch.start_time(), None);
        assert!(lunch.presenters.is_empty());
    }

    #[test]
    fn test_session_without_heading() {
        let html = r#"<div class="reg-matrix-header-container"><div><p>No title</p></div></div>"#;
        let records = parse_agenda(html).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), None);
    }

    #[test]
    fn test_nested_sessions_info_ignored() {
        // Only direct children count: a session-info buried deeper is not read
        let html = r#"
            <div class="reg-matrix-header-container">
              <div><h3>Workshop</h3>
                <section><div class="session-info"><p><span>Start Date: <span>06/16/20</span></span></p></div></section>
              </div>
            </div>
        "#;
        let records = parse_agenda(html).unwrap();

        assert_eq!(records[0].title(), Some("Workshop"));
        assert!(records[0].fields.is_empty());
    }

    #[test]
    fn test_page_without_sessions() {
        assert!(parse_agenda("<html><body><p>Closed</p></body></html>").unwrap().is_empty());
    }
}
