use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{CalendarEvent, IcsOptions, UidStrategy};


/// Compact UTC form used for every date-time property
pub const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const CRLF: &str = "\r\n";

static LAST_UID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Builds single-event iCalendar documents
pub struct IcsGenerator {
    options: IcsOptions,
}

impl IcsGenerator {
    pub fn new(options: IcsOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IcsOptions {
        &self.options
    }

    /// Calendar document for `event`, stamped with the current time
    pub fn generate(&self, event: &CalendarEvent) -> String {
        self.generate_at(event, Utc::now())
    }

    /// Same as [`generate`](Self::generate) with an explicit generation time.
    pub fn generate_at(&self, event: &CalendarEvent, now: DateTime<Utc>) -> String {
        let mut lines = Vec::with_capacity(18);

        lines.push("BEGIN:VCALENDAR".to_string());
        lines.push("VERSION:2.0".to_string());
        lines.push(format!("PRODID:{}", self.options.product_id));
        lines.push("CALSCALE:GREGORIAN".to_string());
        lines.push("METHOD:PUBLISH".to_string());

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("DTSTART:{}", format_timestamp(&event.start)));
        lines.push(format!("DTEND:{}", format_timestamp(&event.end)));
        lines.push(format!("DTSTAMP:{}", format_timestamp(&now)));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
        lines.push(format!("LOCATION:{}", escape_text(&event.location)));

        if let Some(url) = event.url.as_deref().filter(|url| !url.is_empty()) {
            lines.push(format!("URL:{}", url));
        }

        lines.push(format!("UID:{}", self.next_uid(now)));
        lines.push("STATUS:CONFIRMED".to_string());
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        tracing::debug!(title = %event.title, "generated calendar document");

        lines.join(CRLF)
    }

    fn next_uid(&self, now: DateTime<Utc>) -> String {
        let local = match self.options.uid_strategy {
            UidStrategy::Timestamp => next_uid_millis(now.timestamp_millis()).to_string(),
            UidStrategy::Random => Uuid::new_v4().to_string(),
        };
        format!("{}@{}", local, self.options.uid_domain)
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}

/// Render a timestamp as `YYYYMMDDTHHMMSSZ`. Sub-second digits are dropped, not rounded.
pub fn format_timestamp<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    value
        .with_timezone(&Utc)
        .format(ICS_DATETIME_FORMAT)
        .to_string()
}

/// Escape a TEXT value: backslash, comma, semicolon and newline.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ',' | ';' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Inverse of [`escape_text`]; unknown escapes are kept as written.
pub fn unescape_text(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => unescaped.push('\n'),
            Some(next @ (',' | ';' | '\\')) => unescaped.push(next),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

/// Next UID value: the clock reading, bumped past the last value handed out.
fn next_uid_millis(now_millis: i64) -> i64 {
    let previous = LAST_UID_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_millis.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now_millis.max(previous + 1)
}
