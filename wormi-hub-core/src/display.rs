use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::{Metric, parse_timestamp};

/// Shown where a batch has not been released yet
pub const NOT_RELEASED: &str = "—";

/// `Wednesday, May 1, 2024 • 2:00 PM - 4:00 PM`, in the start's own offset
pub fn format_event_schedule(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> String {
    let end = end.with_timezone(start.offset());
    format!(
        "{} • {} - {}",
        start.format("%A, %B %-d, %Y"),
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p")
    )
}

/// `5/1/2024` for a timestamp or a plain `YYYY-MM-DD` date; anything else is returned unchanged
pub fn format_short_date(raw: &str) -> String {
    if let Ok(timestamp) = parse_timestamp(raw) {
        return timestamp.format("%-m/%-d/%Y").to_string();
    }
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn format_release(released_at: Option<&str>) -> String {
    released_at
        .map(format_short_date)
        .unwrap_or_else(|| NOT_RELEASED.to_string())
}

/// Metric value followed by its unit, when it has one
pub fn format_metric_value(metric: &Metric) -> String {
    let unit = metric.unit.trim();
    if unit.is_empty() {
        metric.value.to_string()
    } else {
        format!("{} {}", metric.value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NumberOrText;

    #[test]
    fn schedule_line_uses_start_offset() {
        let start = DateTime::parse_from_rfc3339("2024-05-01T14:00:00-04:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2024-05-01T20:30:00Z").unwrap();

        assert_eq!(
            format_event_schedule(&start, &end),
            "Wednesday, May 1, 2024 • 2:00 PM - 4:30 PM"
        );
    }

    #[test]
    fn short_dates() {
        assert_eq!(format_short_date("2024-05-01"), "5/1/2024");
        assert_eq!(format_short_date("2024-11-23T08:00:00-05:00"), "11/23/2024");
        assert_eq!(format_short_date("spring"), "spring");
        assert_eq!(format_release(None), NOT_RELEASED);
        assert_eq!(format_release(Some("2024-04-02")), "4/2/2024");
    }

    #[test]
    fn metric_values_with_and_without_unit() {
        let mut metric = Metric {
            key: "diverted".to_string(),
            label: "Scraps diverted".to_string(),
            value: NumberOrText::Number(1250.0),
            unit: "kg".to_string(),
            as_of: "2024-05-01".to_string(),
        };
        assert_eq!(format_metric_value(&metric), "1250 kg");

        metric.unit = String::new();
        metric.value = NumberOrText::Text("12+".to_string());
        assert_eq!(format_metric_value(&metric), "12+");
    }
}
