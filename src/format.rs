//! Display Formatting
//!
//! Durations, dates and relative times as the templates show them, plus a
//! pass that fills `data-*` tagged elements with the formatted text.

use chrono::{DateTime, NaiveDate, Utc};
use web_sys::Document;

use crate::dispatcher::select_all;

/// `65` -> `"1h 5m"`, `45` -> `"45m"`
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// `"Mar 5, 2025"`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        "Just now".to_string()
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// `"2025-03-05"` -> `"Wed"`; unparseable input is returned unchanged
pub fn weekday_label(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive ISO timestamps from the backend are UTC
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Browser clock
pub fn now_utc() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Fill `[data-duration-minutes]`, `[data-format-date]` and `[data-time-ago]`
pub fn decorate_timestamps(doc: &Document, now: DateTime<Utc>) {
    for el in select_all(doc, "[data-duration-minutes]") {
        let minutes = el
            .get_attribute("data-duration-minutes")
            .and_then(|m| m.trim().parse().ok());
        if let Some(minutes) = minutes {
            el.set_text_content(Some(&format_duration(minutes)));
        }
    }
    for el in select_all(doc, "[data-format-date]") {
        if let Some(date) = el.get_attribute("data-format-date").as_deref().and_then(parse_date) {
            el.set_text_content(Some(&format_date(date)));
        }
    }
    for el in select_all(doc, "[data-time-ago]") {
        if let Some(then) = el.get_attribute("data-time-ago").as_deref().and_then(parse_timestamp) {
            el.set_text_content(Some(&time_ago(then, now)));
        }
    }
}
