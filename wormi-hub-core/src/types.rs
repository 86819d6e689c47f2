use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One event to put in a calendar document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    /// May contain line breaks
    pub description: String,
    pub location: String,
    pub start: DateTime<FixedOffset>,
    /// Expected to be >= `start`; not checked
    pub end: DateTime<FixedOffset>,
    pub url: Option<String>,
}

/// How the `UID` property is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UidStrategy {
    /// Milliseconds since the epoch, strictly increasing within the process
    #[default]
    Timestamp,
    /// Random UUID v4
    Random,
}

/// Generator options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcsOptions {
    pub product_id: String,
    /// Suffix after `@` in the generated UID
    pub uid_domain: String,
    pub uid_strategy: UidStrategy,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            product_id: "-//Wormi Hub//Events//EN".to_string(),
            uid_domain: "wormihub.org".to_string(),
            uid_strategy: UidStrategy::Timestamp,
        }
    }
}

/// Parse an event timestamp. RFC 3339 first; a value without an offset is read as UTC.
pub fn parse_timestamp(value: &str) -> crate::Result<DateTime<FixedOffset>> {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc3339(value).or_else(|err| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|_| err)
    })?;
    Ok(parsed)
}

pub(crate) mod timestamp {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Entry of `events.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    /// Workshop, Pop-up, Volunteer Shift, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "timestamp")]
    pub end: DateTime<FixedOffset>,
    pub venue: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
}

impl EventRecord {
    /// `venue, address, city, state`
    pub fn location_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.venue, self.address, self.city, self.state
        )
    }

    pub fn to_calendar_event(&self) -> CalendarEvent {
        CalendarEvent {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location_line(),
            start: self.start,
            end: self.end,
            url: self.registration_url.clone(),
        }
    }

    /// Suggested save name for the exported calendar file
    pub fn ics_filename(&self) -> String {
        format!("{}.ics", self.id)
    }
}

/// Kind of network node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Dropoff,
    Dispense,
    Popup,
}

impl LocationKind {
    pub const ALL: [LocationKind; 3] = [Self::Dropoff, Self::Dispense, Self::Popup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dropoff => "dropoff",
            Self::Dispense => "dispense",
            Self::Popup => "popup",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Config(format!("Unknown location type: {}", s)))
    }
}

/// Drop-off, dispense or pop-up node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub address: String,
    pub city: String,
    pub hours: String,
    pub accepted: String,
    pub rules: String,
    pub lat: f64,
    pub lng: f64,
    pub active: bool,
}

/// Educational material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub file_url: String,
    pub version: String,
}

/// A value that the datasets store either as a number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Network metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub label: String,
    pub value: NumberOrText,
    pub unit: String,
    pub as_of: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcStatus {
    Pass,
    Pending,
    Fail,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Pending => "pending",
            Self::Fail => "fail",
            Self::Unknown => "unknown",
        })
    }
}

/// Lab results of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTests {
    /// Germination index
    #[serde(rename = "GI")]
    pub gi: NumberOrText,
    pub respiration: String,
    #[serde(rename = "CN")]
    pub cn: String,
    #[serde(rename = "EC")]
    pub ec: String,
    #[serde(rename = "pH")]
    pub ph: String,
}

/// Compost / vermicast batch with its QC record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_code: String,
    pub product: String,
    pub qc_status: QcStatus,
    pub tests: BatchTests,
    pub released_at: Option<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_JSON: &str = r#"{
        "id": "evt-001",
        "title": "Drop-off Day",
        "type": "Pop-up",
        "start": "2024-05-01T14:00:00Z",
        "end": "2024-05-01T16:00:00",
        "venue": "Market Hall",
        "address": "123 Main St",
        "city": "Charlottesville",
        "state": "VA",
        "description": "Bring scraps"
    }"#;

    #[test]
    fn event_record_deserializes_with_naive_end_as_utc() {
        let event: EventRecord = serde_json::from_str(EVENT_JSON).unwrap();
        assert_eq!(event.kind, "Pop-up");
        assert_eq!(event.registration_url, None);
        assert_eq!(event.end.offset().local_minus_utc(), 0);
        assert_eq!(event.end.to_rfc3339(), "2024-05-01T16:00:00+00:00");
    }

    #[test]
    fn event_record_builds_calendar_event() {
        let event: EventRecord = serde_json::from_str(EVENT_JSON).unwrap();
        let calendar = event.to_calendar_event();

        assert_eq!(
            calendar.location,
            "Market Hall, 123 Main St, Charlottesville, VA"
        );
        assert_eq!(calendar.start, event.start);
        assert_eq!(event.ics_filename(), "evt-001.ics");
    }

    #[test]
    fn unparseable_timestamp_is_a_date_time_error() {
        assert!(matches!(
            parse_timestamp("May 1st, 2pm"),
            Err(crate::Error::DateTime(_))
        ));

        let offset = parse_timestamp(" 2024-05-01T10:00:00-04:00 ").unwrap();
        assert_eq!(offset.to_rfc3339(), "2024-05-01T10:00:00-04:00");
    }

    #[test]
    fn location_kind_parses_case_insensitively() {
        assert_eq!(
            "Dropoff".parse::<LocationKind>().unwrap(),
            LocationKind::Dropoff
        );
        assert!("compost".parse::<LocationKind>().is_err());
    }

    #[test]
    fn batch_accepts_numeric_or_text_gi_and_unknown_status() {
        let raw = r#"[
            {"batch_code": "VC-24-01", "product": "vermicast", "qc_status": "pass",
             "tests": {"GI": 92, "respiration": "low", "CN": "14:1", "EC": "2.1", "pH": "6.8"},
             "released_at": "2024-04-02", "notes": ""},
            {"batch_code": "CP-24-02", "product": "compost", "qc_status": "quarantine",
             "tests": {"GI": "n/a", "respiration": "-", "CN": "-", "EC": "-", "pH": "-"},
             "released_at": null, "notes": "awaiting lab"}
        ]"#;
        let batches: Vec<Batch> = serde_json::from_str(raw).unwrap();

        assert_eq!(batches[0].tests.gi.to_string(), "92");
        assert_eq!(batches[0].qc_status, QcStatus::Pass);
        assert_eq!(batches[1].tests.gi.to_string(), "n/a");
        assert_eq!(batches[1].qc_status, QcStatus::Unknown);
        assert!(batches[1].released_at.is_none());
    }

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(NumberOrText::Number(1250.0).to_string(), "1250");
        assert_eq!(NumberOrText::Number(3.5).to_string(), "3.5");
    }
}
