//! Multi-token filter and autocomplete over the already-fetched stock table.
//!
//! Values are entered as a list separated by commas, semicolons or newlines.
//! The last, still-being-typed segment drives the suggestion list; applying
//! the filter keeps every row whose chosen column contains any of the tokens,
//! case-insensitively.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::models::{StockDevice, StockField};

pub const MAX_SUGGESTIONS: usize = 100;
pub const MAX_VISIBLE_SUGGESTIONS: usize = 20;
const TOKEN_SEPARATOR: &str = ", ";

static DELIMITED_END: OnceLock<Regex> = OnceLock::new();
static TRAILING_SEGMENT: OnceLock<Regex> = OnceLock::new();

fn is_delimiter(c: char) -> bool {
    matches!(c, ',' | ';' | '\n')
}

fn ends_with_delimiter(value: &str) -> bool {
    DELIMITED_END
        .get_or_init(|| Regex::new(r"[,;\n]\s?$").expect("delimiter pattern"))
        .is_match(value)
}

/// A filter as chosen in the toolbar: a column plus the raw token text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    pub field: Option<StockField>,
    pub value: String,
}

impl ResourceFilter {
    pub fn new(field: Option<StockField>, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.field.is_some() && !self.value.trim().is_empty()
    }

    pub fn tokens(&self) -> Vec<String> {
        split_tokens(&self.value)
    }

    pub fn apply<'a>(&self, rows: &'a [StockDevice]) -> Vec<&'a StockDevice> {
        apply(rows, self.field, &self.value)
    }
}

pub fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(is_delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn locale_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Unique, non-blank values of `field`, sorted, capped at [`MAX_SUGGESTIONS`].
pub fn suggestions(rows: &[StockDevice], field: Option<StockField>) -> Vec<String> {
    let Some(field) = field else {
        return Vec::new();
    };

    let unique: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| row.field_value(field))
        .filter(|v| !v.trim().is_empty())
        .collect();

    let mut sorted: Vec<String> = unique.into_iter().collect();
    sorted.sort_by(|a, b| locale_order(a, b));
    sorted.truncate(MAX_SUGGESTIONS);
    sorted
}

/// The segment after the last delimiter, trimmed and lower-cased.
pub fn active_query(value: &str) -> String {
    value
        .rsplit(is_delimiter)
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

pub fn filtered_suggestions(suggestions: &[String], value: &str) -> Vec<String> {
    let tokens = split_tokens(value);
    let query = active_query(value);

    suggestions
        .iter()
        .filter(|s| !tokens.contains(s))
        .filter(|s| query.is_empty() || s.to_lowercase().contains(&query))
        .take(MAX_VISIBLE_SUGGESTIONS)
        .cloned()
        .collect()
}

/// Replaces the partially typed trailing segment with `suggestion`.
pub fn pick_suggestion(value: &str, suggestion: &str) -> String {
    let prefix = TRAILING_SEGMENT
        .get_or_init(|| Regex::new(r"[^,\n;]*$").expect("segment pattern"))
        .replace(value, "");
    format!("{}{}{}", prefix, suggestion, TOKEN_SEPARATOR)
}

/// Input change handler: an exact suggestion match gets its separator
/// appended so the next value can be typed straight away.
pub fn on_value_change(raw: &str, suggestions: &[String]) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty()
        && suggestions.iter().any(|s| s == trimmed)
        && !ends_with_delimiter(raw)
    {
        format!("{}{}", trimmed, TOKEN_SEPARATOR)
    } else {
        raw.to_string()
    }
}

/// Enter/Tab commits the current token. `None` means the key should keep its
/// default behaviour.
pub fn commit_on_key(value: &str) -> Option<String> {
    if value.trim().is_empty() || ends_with_delimiter(value) {
        None
    } else {
        Some(format!("{}{}", value, TOKEN_SEPARATOR))
    }
}

pub fn apply<'a>(rows: &'a [StockDevice], field: Option<StockField>, value: &str) -> Vec<&'a StockDevice> {
    let Some(field) = field else {
        return rows.iter().collect();
    };
    if value.trim().is_empty() {
        return rows.iter().collect();
    }

    let needles: Vec<String> = split_tokens(value)
        .into_iter()
        .map(|n| n.to_lowercase())
        .collect();
    if needles.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| match row.field_value(field) {
            Some(v) => {
                let hay = v.to_lowercase();
                needles.iter().any(|n| hay.contains(n.as_str()))
            }
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device(tag: &str, status: &str, model: &str, year: serde_json::Value) -> StockDevice {
        StockDevice {
            service_tag_number: tag.to_string(),
            status: status.to_string(),
            make_model: model.to_string(),
            year,
            ..Default::default()
        }
    }

    fn rows() -> Vec<StockDevice> {
        vec![
            device("C02A", "In Stock", "MacBook Pro 14", json!(2022)),
            device("C02B", "In Stock", "macbook Air", json!(2023)),
            device("C02C", "Deployed", "ThinkPad T14", json!(null)),
            device("C02D", "In Stock", "MacBook Pro 14", json!(2022)),
        ]
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens(" a, b;;c\n\n d ,"), vec!["a", "b", "c", "d"]);
        assert!(split_tokens(" ,;\n").is_empty());
    }

    #[test]
    fn test_suggestions_unique_sorted() {
        let s = suggestions(&rows(), Some(StockField::MakeModel));
        assert_eq!(s, vec!["macbook Air", "MacBook Pro 14", "ThinkPad T14"]);
        assert!(suggestions(&rows(), None).is_empty());
    }

    #[test]
    fn test_suggestions_skip_null_year() {
        assert_eq!(suggestions(&rows(), Some(StockField::Year)), vec!["2022", "2023"]);
    }

    #[test]
    fn test_suggestions_capped() {
        let many: Vec<StockDevice> = (0..150)
            .map(|i| device(&format!("T{:03}", i), "In Stock", "M", json!(null)))
            .collect();
        assert_eq!(suggestions(&many, Some(StockField::ServiceTagNumber)).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_active_query_uses_last_segment() {
        assert_eq!(active_query("MacBook Pro 14, Thin"), "thin");
        assert_eq!(active_query("MacBook Pro 14, "), "");
        assert_eq!(active_query(""), "");
    }

    #[test]
    fn test_filtered_suggestions_exclude_entered_tokens() {
        let s = suggestions(&rows(), Some(StockField::MakeModel));
        assert_eq!(filtered_suggestions(&s, "MacBook Pro 14, "), vec!["macbook Air", "ThinkPad T14"]);
        assert_eq!(filtered_suggestions(&s, "MacBook Pro 14, air"), vec!["macbook Air"]);
    }

    #[test]
    fn test_pick_suggestion_replaces_partial() {
        assert_eq!(pick_suggestion("MacBook Pro 14, Thi", "ThinkPad T14"), "MacBook Pro 14,ThinkPad T14, ");
        assert_eq!(
            split_tokens(&pick_suggestion("MacBook Pro 14, Thi", "ThinkPad T14")),
            vec!["MacBook Pro 14", "ThinkPad T14"]
        );
        assert_eq!(pick_suggestion("", "C02A"), "C02A, ");
    }

    #[test]
    fn test_on_value_change_appends_separator_for_exact_match() {
        let s = vec!["C02A".to_string()];
        assert_eq!(on_value_change("C02A", &s), "C02A, ");
        assert_eq!(on_value_change("C02", &s), "C02");
        assert_eq!(on_value_change("C02A, ", &s), "C02A, ");
    }

    #[test]
    fn test_commit_on_key() {
        assert_eq!(commit_on_key("C02A").as_deref(), Some("C02A, "));
        assert_eq!(commit_on_key("C02A;"), None);
        assert_eq!(commit_on_key("   "), None);
    }

    #[test]
    fn test_apply_matches_any_token_case_insensitively() {
        let data = rows();
        let hits = apply(&data, Some(StockField::MakeModel), "thinkpad; AIR");
        let tags: Vec<&str> = hits.iter().map(|d| d.service_tag_number.as_str()).collect();
        assert_eq!(tags, vec!["C02B", "C02C"]);
    }

    #[test]
    fn test_apply_without_filter_returns_everything() {
        let data = rows();
        assert_eq!(apply(&data, None, "air").len(), 4);
        assert_eq!(apply(&data, Some(StockField::Status), "  ").len(), 4);
        assert_eq!(apply(&data, Some(StockField::Status), ",;").len(), 4);
    }

    #[test]
    fn test_apply_null_never_matches() {
        let data = rows();
        let hits = apply(&data, Some(StockField::Year), "20");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_resource_filter_is_active() {
        assert!(!ResourceFilter::new(None, "x").is_active());
        assert!(!ResourceFilter::new(Some(StockField::Po), " ").is_active());
        assert!(ResourceFilter::new(Some(StockField::Po), "PO-1").is_active());
    }
}
