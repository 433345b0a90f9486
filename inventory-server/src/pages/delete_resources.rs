use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use inventory_core::dates::normalize_date_to_ymd;
use inventory_core::models::{AllocationRecord, RemoteStatus};
use inventory_core::validation::{validate_serial, FieldErrors};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{form_or_400, shell};
use crate::error::AppError;
use crate::remote::{RemoteError, SerialLookupOutcome};
use crate::views::{escape_html, Banner, Input};
use crate::AppState;

pub const REQUEST_FAILED: &str = "Request failed.";
pub const NOT_FOUND: &str = "No record found for the given serial number.";
pub const LOADED: &str = "Record loaded.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const DELETED: &str = "Deleted successfully.";
pub const DELETE_FAILED: &str = "Delete failed.";
pub const DELETE_ERROR: &str = "Delete failed. Please try again.";

const TITLE: &str = "Delete Resources";
const PATH: &str = "/delete-resources";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub serialnumber: String,
}

/// The read-only record, posted back with the confirmation so a failed
/// delete can show it again.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordForm {
    pub serialnumber: String,
    pub name: String,
    pub allocation_date: String,
    pub cost_center: String,
    pub location: String,
    pub email: String,
    pub detail: String,
}

impl RecordForm {
    fn from_record(serialnumber: &str, record: AllocationRecord) -> Self {
        Self {
            serialnumber: serialnumber.to_string(),
            name: record.name,
            allocation_date: normalize_date_to_ymd(&record.allocation_date),
            cost_center: record.cost_center,
            location: record.location,
            email: record.email,
            detail: record.detail,
        }
    }
}

fn render(
    headers: &HeaderMap,
    serialnumber: &str,
    message: Option<Banner>,
    serial_error: Option<&str>,
    record: Option<&RecordForm>,
) -> Html<String> {
    let banner = message.map(|b| b.render()).unwrap_or_default();
    let serial_error = serial_error
        .map(|e| format!(r#"<p class="field-error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    let search = format!(
        r#"<section class="panel"><form method="post" action="{}/search" class="form inline">
    <label class="field"><span>Mac Serial Number</span><input type="text" name="serialnumber" value="{}"/>{}</label>
    <button type="submit" class="btn btn-primary">Search</button>
</form></section>"#,
        PATH,
        escape_html(serialnumber),
        serial_error
    );

    let details = match record {
        Some(record) => {
            let none = FieldErrors::new();
            let fields = [
                Input::text("name", "Name", &record.name).readonly().render(&none, "name"),
                Input::text("allocation_date", "Allocation Date", &record.allocation_date)
                    .readonly()
                    .render(&none, "allocation_date"),
                Input::text("cost_center", "Cost Center", &record.cost_center)
                    .readonly()
                    .render(&none, "cost_center"),
                Input::text("location", "Location", &record.location).readonly().render(&none, "location"),
                Input::text("email", "Email", &record.email).readonly().render(&none, "email"),
                Input::text("detail", "Detail", &record.detail).readonly().render(&none, "detail"),
            ]
            .concat();
            format!(
                r#"<section class="panel"><form method="post" action="{}/confirm" class="form grid-2">
    <input type="hidden" name="serialnumber" value="{}"/>
    {}
    <div class="actions"><button type="submit" class="btn btn-danger">Delete</button></div>
</form></section>"#,
                PATH,
                escape_html(&record.serialnumber),
                fields
            )
        }
        None => String::new(),
    };

    shell(headers, TITLE, PATH, &format!("{}{}{}", banner, search, details))
}

pub async fn show(headers: HeaderMap) -> Html<String> {
    render(&headers, "", None, None, None)
}

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let SearchForm { serialnumber } = form_or_400(form)?;

    if let Err(message) = validate_serial(&serialnumber) {
        return Ok(render(&headers, &serialnumber, Some(Banner::error(message)), Some(message), None));
    }

    info!("🔍 Looking up serial {} for deletion", serialnumber);
    let page = match state.api.find_by_serial(&serialnumber).await {
        Ok(SerialLookupOutcome::Found(record)) => {
            let record = RecordForm::from_record(&serialnumber, record);
            render(&headers, &serialnumber, Some(Banner::success(LOADED)), None, Some(&record))
        }
        Ok(SerialLookupOutcome::NotFound) => render(&headers, &serialnumber, Some(Banner::info(NOT_FOUND)), None, None),
        Ok(SerialLookupOutcome::Failed) | Err(RemoteError::Status { .. }) => {
            warn!("⚠️  Lookup for {} was refused", serialnumber);
            render(&headers, &serialnumber, Some(Banner::error(REQUEST_FAILED)), None, None)
        }
        Err(e) => {
            error!("❌ Lookup for {} failed: {}", serialnumber, e);
            render(&headers, &serialnumber, Some(Banner::error(SEARCH_FAILED)), None, None)
        }
    };
    Ok(page)
}

pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<RecordForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let record = form_or_400(form)?;
    let serialnumber = record.serialnumber.clone();

    if let Err(message) = validate_serial(&serialnumber) {
        return Ok(render(&headers, &serialnumber, Some(Banner::error(message)), Some(message), None));
    }

    info!("🗑️  Deleting allocation {}", serialnumber);
    let page = match state.api.delete_allocation(&serialnumber).await {
        Ok(RemoteStatus::Success) => {
            info!("✅ Allocation {} deleted", serialnumber);
            render(&headers, &serialnumber, Some(Banner::success(DELETED)), None, None)
        }
        Ok(status) => {
            warn!("⚠️  Delete of {} refused ({:?})", serialnumber, status);
            render(&headers, &serialnumber, Some(Banner::error(DELETE_FAILED)), None, Some(&record))
        }
        Err(RemoteError::Status { status }) => {
            warn!("⚠️  Delete of {} returned HTTP {}", serialnumber, status);
            render(&headers, &serialnumber, Some(Banner::error(DELETE_FAILED)), None, Some(&record))
        }
        Err(e) => {
            error!("❌ Delete of {} failed: {}", serialnumber, e);
            render(&headers, &serialnumber, Some(Banner::error(DELETE_ERROR)), None, Some(&record))
        }
    };
    Ok(page)
}
