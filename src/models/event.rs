//! Tournament event model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{EventId, ValidationError};

/// A tournament or competition grouping teams and games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    /// Display name
    pub name: String,

    /// Day the event takes place
    pub date: NaiveDate,

    /// Public page for the event
    pub event_url: String,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

/// Raw event submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub event_url: String,
}

/// A validated event, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub event_url: Url,
}

impl EventForm {
    /// All three fields are required; the date must be `YYYY-MM-DD` and the
    /// URL absolute.
    pub fn validate(self) -> Result<NewEvent, ValidationError> {
        let name = self.name.trim();
        let date = self.date.trim();
        let event_url = self.event_url.trim();

        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if date.is_empty() {
            return Err(ValidationError::Required("date"));
        }
        if event_url.is_empty() {
            return Err(ValidationError::Required("event_url"));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        let event_url =
            Url::parse(event_url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

        Ok(NewEvent {
            name: name.to_string(),
            date,
            event_url,
        })
    }
}
