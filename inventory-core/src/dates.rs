use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

static YMD_PREFIX: OnceLock<Regex> = OnceLock::new();

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%d %b %Y", "%B %d, %Y"];
const DATETIME_FORMATS: [&str; 2] = ["%a, %d %b %Y %H:%M:%S GMT", "%Y/%m/%d %H:%M:%S"];

/// Normalises whatever date shape the inventory service returns to
/// `YYYY-MM-DD`, the value a date input accepts. Unparseable input becomes
/// an empty string.
pub fn normalize_date_to_ymd(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let prefix = YMD_PREFIX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("ymd pattern"));
    if let Some(m) = prefix.find(raw) {
        return m.as_str().to_string();
    }

    parse_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
