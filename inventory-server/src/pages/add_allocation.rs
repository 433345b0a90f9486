use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use inventory_core::models::{Location, NewAllocation};
use inventory_core::validation::{validate_new_allocation, FieldErrors};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{form_or_400, shell};
use crate::error::AppError;
use crate::views::{record_table, render_banners, select, textarea, Banner, Input};
use crate::AppState;

pub const SAVED: &str = "Resource allocation saved.";
pub const SAVED_ALERT: &str = "Data was saved";
pub const SAVE_FAILED: &str = "Failed to save allocation.";
pub const UNSUCCESSFUL_ALERT: &str = "Unsuccessful operation";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from inventory service.";

const TITLE: &str = "Add Resource Allocation";
const PATH: &str = "/add-resource-allocation";

/// Form fields as posted by the page; `details` maps to the payload's `detail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllocationForm {
    pub name: String,
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    #[serde(rename = "allocationDate")]
    pub allocation_date: String,
    pub po: String,
    pub location: String,
    pub email: String,
    pub details: String,
}

impl From<&AllocationForm> for NewAllocation {
    fn from(form: &AllocationForm) -> Self {
        NewAllocation {
            name: form.name.clone(),
            serial_number: form.serial_number.clone(),
            allocation_date: form.allocation_date.clone(),
            po: form.po.clone(),
            location: form.location.clone(),
            email: form.email.clone(),
            detail: form.details.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct PageModel {
    form: AllocationForm,
    errors: FieldErrors,
    banners: Vec<Banner>,
    saved: Option<NewAllocation>,
}

fn render(headers: &HeaderMap, model: &PageModel) -> Html<String> {
    let form = &model.form;
    let errors = &model.errors;
    let locations: Vec<&str> = Location::ALL.iter().map(Location::as_str).collect();

    let fields = [
        Input::text("name", "Name", &form.name).render(errors, "name"),
        Input::text("serialNumber", "Serial Number", &form.serial_number).render(errors, "serialNumber"),
        Input::text("allocationDate", "Allocation Date", &form.allocation_date)
            .kind("date")
            .render(errors, "allocationDate"),
        Input::text("po", "PO", &form.po).render(errors, "po"),
        select("location", "Location", &form.location, &locations, errors, "location"),
        Input::text("email", "Email ID", &form.email).kind("email").render(errors, "email"),
        textarea("details", "Allocation Details", &form.details, errors, "details"),
    ]
    .concat();

    let saved = match &model.saved {
        Some(saved) => format!(
            r#"<section class="panel"><h2>Saved Allocation</h2>{}</section>"#,
            record_table(&[
                ("Name", saved.name.as_str()),
                ("Serial Number", saved.serial_number.as_str()),
                ("Allocation Date", saved.allocation_date.as_str()),
                ("PO", saved.po.as_str()),
                ("Location", saved.location.as_str()),
                ("Email", saved.email.as_str()),
                ("Details", saved.detail.as_str()),
            ])
        ),
        None => String::new(),
    };

    let content = format!(
        r#"{}<section class="panel"><form method="post" action="{}" class="form grid-2" novalidate>{}<div class="actions"><button type="submit" class="btn btn-primary">Save</button></div></form></section>{}"#,
        render_banners(&model.banners),
        PATH,
        fields,
        saved
    );
    shell(headers, TITLE, PATH, &content)
}

pub async fn show(headers: HeaderMap) -> Html<String> {
    render(&headers, &PageModel::default())
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<AllocationForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let form = form_or_400(form)?;
    let payload = NewAllocation::from(&form);

    let errors = validate_new_allocation(&payload);
    if !errors.is_empty() {
        return Ok(render(&headers, &PageModel { form, errors, ..Default::default() }));
    }

    info!("📝 Saving allocation for serial {}", payload.serial_number);
    let model = match state.api.add_allocation(&payload).await {
        Ok(outcome) if outcome.is_saved() => {
            info!("✅ Allocation saved for {}", payload.serial_number);
            PageModel {
                banners: vec![Banner::success(SAVED), Banner::info(SAVED_ALERT)],
                saved: Some(payload),
                ..Default::default()
            }
        }
        Ok(outcome) => {
            warn!(
                "⚠️  Allocation refused (HTTP {}, {:?}): {:?}",
                outcome.http_status, outcome.status, outcome.message
            );
            let fallback = if outcome.is_malformed() { UNEXPECTED_RESPONSE } else { SAVE_FAILED };
            PageModel {
                form,
                errors: outcome.errors.unwrap_or_default(),
                banners: vec![
                    Banner::error(outcome.message.unwrap_or_else(|| fallback.to_string())),
                    Banner::error(UNSUCCESSFUL_ALERT),
                ],
                ..Default::default()
            }
        }
        Err(e) => {
            error!("❌ Saving allocation failed: {}", e);
            PageModel {
                form,
                banners: vec![Banner::error(SAVE_FAILED)],
                ..Default::default()
            }
        }
    };

    Ok(render(&headers, &model))
}
