use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use inventory_core::dates::normalize_date_to_ymd;
use inventory_core::models::{AllocationRecord, AllocationUpdate, Location, RemoteStatus};
use inventory_core::validation::{validate_serial, validate_update_email, FieldErrors};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{form_or_400, shell};
use crate::error::AppError;
use crate::remote::{RemoteError, SerialLookupOutcome};
use crate::views::{escape_html, select, textarea, Banner, Input};
use crate::AppState;

pub const REQUEST_FAILED: &str = "Request failed.";
pub const NOT_FOUND: &str = "No record found for the given serial number.";
pub const LOADED: &str = "Record loaded. You can edit the fields below.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const FIX_EMAIL: &str = "Please correct the email before updating.";
pub const UPDATED: &str = "Update successful.";
pub const UPDATE_FAILED: &str = "Update failed. Please try again.";
pub const UPDATE_ERROR: &str = "Failed to update. Please try again.";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from inventory service.";

const TITLE: &str = "Update Resource Allocation";
const PATH: &str = "/update-resource-allocation";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub serialnumber: String,
}

/// Editable copy of a loaded record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditForm {
    pub serialnumber: String,
    pub name: String,
    pub allocation_date: String,
    pub cost_center: String,
    pub location: String,
    pub email: String,
    pub detail: String,
}

impl EditForm {
    fn from_record(serialnumber: &str, record: AllocationRecord) -> Self {
        let location = if Location::is_allowed(&record.location) {
            record.location
        } else {
            String::new()
        };
        Self {
            serialnumber: serialnumber.to_string(),
            name: record.name,
            allocation_date: normalize_date_to_ymd(&record.allocation_date),
            cost_center: record.cost_center,
            location,
            email: record.email,
            detail: record.detail,
        }
    }

    fn to_update(&self) -> AllocationUpdate {
        AllocationUpdate {
            serialnumber: self.serialnumber.clone(),
            name: self.name.clone(),
            allocation_date: normalize_date_to_ymd(&self.allocation_date),
            cost_center: self.cost_center.clone(),
            location: self.location.clone(),
            email: self.email.trim().to_string(),
            detail: self.detail.clone(),
        }
    }
}

fn render(
    headers: &HeaderMap,
    serialnumber: &str,
    message: Option<Banner>,
    serial_error: Option<&str>,
    record: Option<&EditForm>,
    errors: &FieldErrors,
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

    let edit = match record {
        Some(record) => {
            let locations: Vec<&str> = Location::ALL.iter().map(Location::as_str).collect();
            let fields = [
                Input::text("name", "Name", &record.name).render(errors, "name"),
                Input::text("allocation_date", "Allocation Date", &record.allocation_date)
                    .kind("date")
                    .render(errors, "allocation_date"),
                Input::text("cost_center", "Cost Center", &record.cost_center).render(errors, "cost_center"),
                select("location", "Location", &record.location, &locations, errors, "location"),
                Input::text("email", "Email", &record.email).kind("email").render(errors, "email"),
                textarea("detail", "Detail", &record.detail, errors, "detail"),
            ]
            .concat();
            format!(
                r#"<section class="panel"><form method="post" action="{}" class="form grid-2" novalidate>
    <input type="hidden" name="serialnumber" value="{}"/>
    {}
    <div class="actions"><button type="submit" class="btn btn-primary">Update</button></div>
</form></section>"#,
                PATH,
                escape_html(&record.serialnumber),
                fields
            )
        }
        None => String::new(),
    };

    shell(headers, TITLE, PATH, &format!("{}{}{}", banner, search, edit))
}

pub async fn show(headers: HeaderMap) -> Html<String> {
    render(&headers, "", None, None, None, &FieldErrors::new())
}

pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let SearchForm { serialnumber } = form_or_400(form)?;
    let no_errors = FieldErrors::new();

    if let Err(message) = validate_serial(&serialnumber) {
        return Ok(render(&headers, &serialnumber, Some(Banner::error(message)), Some(message), None, &no_errors));
    }

    info!("🔍 Looking up serial {} for update", serialnumber);
    let page = match state.api.find_by_serial(&serialnumber).await {
        Ok(SerialLookupOutcome::Found(record)) => {
            let edit = EditForm::from_record(&serialnumber, record);
            render(&headers, &serialnumber, Some(Banner::success(LOADED)), None, Some(&edit), &no_errors)
        }
        Ok(SerialLookupOutcome::NotFound) => {
            render(&headers, &serialnumber, Some(Banner::info(NOT_FOUND)), None, None, &no_errors)
        }
        Ok(SerialLookupOutcome::Failed) | Err(RemoteError::Status { .. }) => {
            warn!("⚠️  Lookup for {} was refused", serialnumber);
            render(&headers, &serialnumber, Some(Banner::error(REQUEST_FAILED)), None, None, &no_errors)
        }
        Err(e) => {
            error!("❌ Lookup for {} failed: {}", serialnumber, e);
            render(&headers, &serialnumber, Some(Banner::error(SEARCH_FAILED)), None, None, &no_errors)
        }
    };
    Ok(page)
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<EditForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let edit = form_or_400(form)?;
    let serialnumber = edit.serialnumber.clone();

    if let Err(message) = validate_update_email(&edit.email) {
        let mut errors = FieldErrors::new();
        errors.insert("email", message);
        return Ok(render(&headers, &serialnumber, Some(Banner::error(FIX_EMAIL)), None, Some(&edit), &errors));
    }

    let payload = edit.to_update();
    info!("✏️  Updating allocation {}", serialnumber);

    let banner = match state.api.update_allocation(&payload).await {
        Ok(RemoteStatus::Success) => {
            info!("✅ Allocation {} updated", serialnumber);
            Banner::success(UPDATED)
        }
        Ok(RemoteStatus::Malformed) => {
            warn!("⚠️  Unexpected update response for {}", serialnumber);
            Banner::error(UNEXPECTED_RESPONSE)
        }
        Ok(RemoteStatus::Failed) | Err(RemoteError::Status { .. }) => Banner::error(UPDATE_FAILED),
        Err(e) => {
            error!("❌ Update for {} failed: {}", serialnumber, e);
            Banner::error(UPDATE_ERROR)
        }
    };

    let shown = EditForm {
        allocation_date: payload.allocation_date,
        email: payload.email,
        ..edit
    };
    Ok(render(&headers, &serialnumber, Some(banner), None, Some(&shown), &FieldErrors::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_record_is_cleaned() {
        let record = AllocationRecord {
            name: "Asha".to_string(),
            allocation_date: "2024-03-18T00:00:00Z".to_string(),
            location: "Berlin".to_string(),
            ..Default::default()
        };
        let edit = EditForm::from_record("C02X", record);
        assert_eq!(edit.allocation_date, "2024-03-18");
        assert_eq!(edit.location, "");
        assert_eq!(edit.serialnumber, "C02X");
    }

    #[test]
    fn test_update_payload_trims_email() {
        let edit = EditForm {
            serialnumber: "C02X".to_string(),
            email: "  asha@t-systems.com ".to_string(),
            allocation_date: "2024-03-18".to_string(),
            ..Default::default()
        };
        let payload = edit.to_update();
        assert_eq!(payload.email, "asha@t-systems.com");
        assert_eq!(payload.serialnumber, "C02X");
    }
}
