//! Stock listing with the multi-value column filter.
//!
//! The page is stateless: the applied filter travels as `field`/`value`
//! query parameters and the one being edited as `draft_field`/`draft`.
//! Suggestion links carry the draft with the picked value spliced in.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
};
use inventory_core::encoding::encode_component;
use inventory_core::filter::{
    commit_on_key, filtered_suggestions, on_value_change, pick_suggestion, suggestions,
    ResourceFilter,
};
use inventory_core::models::{StockDevice, StockField};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::shell;
use crate::remote::RemoteError;
use crate::views::escape_html;
use crate::AppState;

pub const LOAD_FAILED: &str = "Failed to load data";
pub const REQUEST_FAILED: &str = "Request failed";
pub const UNEXPECTED_SHAPE: &str = "Unexpected response shape";
pub const NO_DEVICES: &str = "No stock devices found.";

const TITLE: &str = "Available Resources";
const PATH: &str = "/available-resources";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub field: String,
    pub value: String,
    pub draft_field: Option<String>,
    pub draft: Option<String>,
    /// `commit`, `apply` or `clear`; anything else just reloads.
    pub action: String,
}

fn parse_field(key: &str) -> Option<StockField> {
    key.parse().ok()
}

/// Applied and draft filters after the toolbar action is taken into account.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub applied: ResourceFilter,
    pub draft: ResourceFilter,
}

impl FilterState {
    pub fn from_query(query: &FilterQuery, rows: &[StockDevice]) -> Self {
        let applied = ResourceFilter::new(parse_field(&query.field), query.value.clone());
        let draft_field = match &query.draft_field {
            Some(key) => parse_field(key),
            None => applied.field,
        };
        let draft_value = query.draft.clone().unwrap_or_else(|| applied.value.clone());

        match query.action.as_str() {
            "clear" => FilterState {
                applied: ResourceFilter::default(),
                draft: ResourceFilter::default(),
            },
            "apply" => {
                let draft = ResourceFilter::new(draft_field, draft_value);
                FilterState {
                    applied: draft.clone(),
                    draft,
                }
            }
            "commit" => {
                let value = commit_on_key(&draft_value).unwrap_or(draft_value);
                FilterState {
                    applied,
                    draft: ResourceFilter::new(draft_field, value),
                }
            }
            _ => {
                let known = suggestions(rows, draft_field);
                FilterState {
                    applied,
                    draft: ResourceFilter::new(draft_field, on_value_change(&draft_value, &known)),
                }
            }
        }
    }

    fn href(&self, draft_value: &str) -> String {
        let key = |field: Option<StockField>| field.map(|f| f.key()).unwrap_or("");
        format!(
            "{}?field={}&value={}&draft_field={}&draft={}",
            PATH,
            key(self.applied.field),
            encode_component(&self.applied.value),
            key(self.draft.field),
            encode_component(draft_value)
        )
    }
}

fn load_error_message(err: &RemoteError) -> &'static str {
    match err {
        RemoteError::Status { .. } => REQUEST_FAILED,
        RemoteError::UnexpectedShape(_) => UNEXPECTED_SHAPE,
        _ => LOAD_FAILED,
    }
}

fn badge(color: &str, text: &str) -> String {
    format!(r#"<span class="badge badge-{}">{}</span>"#, color, escape_html(text))
}

fn device_row(device: &StockDevice) -> String {
    let warranty_color = if device.warranty_active() { "green" } else { "red" };
    let cells: String = StockField::ALL
        .iter()
        .map(|field| {
            let text = device.field_value(*field).unwrap_or_default();
            let cell = match field {
                StockField::Status => badge("indigo", &text),
                StockField::SubStatus => badge("gray", &text),
                StockField::WarrantyStatus => badge(warranty_color, &text),
                _ => escape_html(&text),
            };
            format!("<td>{}</td>", cell)
        })
        .collect();
    format!("<tr>{}</tr>", cells)
}

fn device_table(rows: &[&StockDevice]) -> String {
    let head: String = StockField::ALL
        .iter()
        .map(|f| format!(r#"<th scope="col">{}</th>"#, f.label()))
        .collect();
    let body = if rows.is_empty() {
        format!(
            r#"<tr><td colspan="{}" class="empty">{}</td></tr>"#,
            StockField::ALL.len(),
            NO_DEVICES
        )
    } else {
        rows.iter().map(|d| device_row(d)).collect()
    };
    format!(
        r#"<section class="panel table-panel"><table class="data-table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></section>"#,
        head, body
    )
}

fn toolbar(state: &FilterState, rows: &[StockDevice]) -> String {
    let options: String = StockField::ALL
        .iter()
        .map(|f| {
            let selected = if state.draft.field == Some(*f) { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, f.key(), selected, f.label())
        })
        .collect();

    let known = suggestions(rows, state.draft.field);
    let visible = filtered_suggestions(&known, &state.draft.value);
    let datalist: String = visible
        .iter()
        .map(|s| format!(r#"<option value="{}"></option>"#, escape_html(s)))
        .collect();
    let picks: String = visible
        .iter()
        .map(|s| {
            format!(
                r#"<a class="suggestion" href="{}">{}</a>"#,
                escape_html(&state.href(&pick_suggestion(&state.draft.value, s))),
                escape_html(s)
            )
        })
        .collect();

    let tokens = state.draft.tokens();
    let chips: String = tokens
        .iter()
        .map(|token| {
            let rest: Vec<&str> = tokens
                .iter()
                .filter(|t| *t != token)
                .map(String::as_str)
                .collect();
            let remaining = if rest.is_empty() {
                String::new()
            } else {
                format!("{}, ", rest.join(", "))
            };
            format!(
                r#"<span class="chip">{}<a class="chip-remove" href="{}" aria-label="Remove">×</a></span>"#,
                escape_html(token),
                escape_html(&state.href(&remaining))
            )
        })
        .collect();

    let applied_field = state.applied.field.map(|f| f.key()).unwrap_or("");

    format!(
        r#"<section class="panel toolbar">
<form method="get" action="{path}" class="form filter-form">
    <input type="hidden" name="field" value="{applied_field}"/>
    <input type="hidden" name="value" value="{applied_value}"/>
    <label class="field"><span>Filter by</span><select name="draft_field"><option value="">Select field</option>{options}</select></label>
    <label class="field grow"><span>Values</span><input type="text" name="draft" value="{draft}" list="filter-suggestions" placeholder="Type values separated by commas"/></label>
    <datalist id="filter-suggestions">{datalist}</datalist>
    <div class="actions">
        <button type="submit" name="action" value="commit" class="btn btn-secondary">Add</button>
        <button type="submit" name="action" value="apply" class="btn btn-primary">Apply Filters</button>
        <button type="submit" name="action" value="clear" class="btn btn-secondary">Clear Filters</button>
        <button type="submit" name="action" value="refresh" class="btn btn-primary">Refresh</button>
    </div>
</form>
<div class="chips">{chips}</div>
<div class="suggestions">{picks}</div>
</section>"#,
        path = PATH,
        applied_field = applied_field,
        applied_value = escape_html(&state.applied.value),
        options = options,
        draft = escape_html(&state.draft.value),
        datalist = datalist,
        chips = chips,
        picks = picks
    )
}

pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Html<String> {
    info!("📦 Loading stock devices");

    let (rows, load_error) = match state.api.stock_devices().await {
        Ok(rows) => (rows, None),
        Err(e) => {
            if matches!(e, RemoteError::UnexpectedShape(_)) {
                warn!("⚠️  Stock list had an unexpected shape");
            } else {
                error!("❌ Loading stock devices failed: {}", e);
            }
            (Vec::new(), Some(load_error_message(&e)))
        }
    };

    let filters = FilterState::from_query(&query, &rows);
    let visible = filters.applied.apply(&rows);

    let error_html = load_error
        .map(|m| format!(r#"<div class="banner banner-error">{}</div>"#, m))
        .unwrap_or_default();

    let content = format!(
        "{}{}{}",
        toolbar(&filters, &rows),
        error_html,
        device_table(&visible)
    );
    shell(&headers, TITLE, PATH, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<StockDevice> {
        vec![
            StockDevice {
                service_tag_number: "C02A".to_string(),
                make_model: "MacBook Pro 14".to_string(),
                warranty_status: "Active".to_string(),
                year: json!(2022),
                ..Default::default()
            },
            StockDevice {
                service_tag_number: "C02B".to_string(),
                make_model: "ThinkPad T14".to_string(),
                warranty_status: "Expired".to_string(),
                ..Default::default()
            },
        ]
    }

    fn query(field: &str, value: &str, draft: Option<&str>, action: &str) -> FilterQuery {
        FilterQuery {
            field: field.to_string(),
            value: value.to_string(),
            draft_field: Some("make_model".to_string()),
            draft: draft.map(String::from),
            action: action.to_string(),
        }
    }

    #[test]
    fn test_apply_promotes_draft() {
        let state = FilterState::from_query(&query("", "", Some("thinkpad"), "apply"), &rows());
        assert_eq!(state.applied.field, Some(StockField::MakeModel));
        assert_eq!(state.applied.value, "thinkpad");
        let data = rows();
        assert_eq!(state.applied.apply(&data).len(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let state = FilterState::from_query(&query("make_model", "air", Some("x"), "clear"), &rows());
        assert!(!state.applied.is_active());
        assert_eq!(state.draft, ResourceFilter::default());
    }

    #[test]
    fn test_commit_appends_separator() {
        let state = FilterState::from_query(&query("", "", Some("C02"), "commit"), &rows());
        assert_eq!(state.draft.value, "C02, ");
        assert!(!state.applied.is_active());
    }

    #[test]
    fn test_exact_suggestion_gets_separator() {
        let state = FilterState::from_query(&query("", "", Some("ThinkPad T14"), ""), &rows());
        assert_eq!(state.draft.value, "ThinkPad T14, ");
    }

    #[test]
    fn test_draft_defaults_to_applied() {
        let q = FilterQuery {
            field: "po".to_string(),
            value: "PO-1".to_string(),
            ..Default::default()
        };
        let state = FilterState::from_query(&q, &rows());
        assert_eq!(state.draft.field, Some(StockField::Po));
        assert_eq!(state.draft.value, "PO-1");
    }

    #[test]
    fn test_table_badges_and_empty_state() {
        let data = rows();
        let refs: Vec<&StockDevice> = data.iter().collect();
        let html = device_table(&refs);
        assert!(html.contains("badge-green\">Active"));
        assert!(html.contains("badge-red\">Expired"));
        assert!(device_table(&[]).contains(NO_DEVICES));
    }

    #[test]
    fn test_toolbar_renders_chip_per_draft_token() {
        let data = rows();
        let state = FilterState::from_query(&query("", "", Some("C02A; C02B,"), "refresh"), &data);
        assert_eq!(state.draft.tokens(), vec!["C02A", "C02B"]);
        let html = toolbar(&state, &data);
        assert_eq!(html.matches(r#"<span class="chip">"#).count(), 2);
        assert!(html.contains(r#"<span class="chip">C02A<a"#));
    }

    #[test]
    fn test_load_error_messages() {
        assert_eq!(load_error_message(&RemoteError::Status { status: 500 }), REQUEST_FAILED);
        assert_eq!(load_error_message(&RemoteError::UnexpectedShape("x")), UNEXPECTED_SHAPE);
    }
}
