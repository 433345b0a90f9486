use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::Html,
    Form,
};
use inventory_core::models::{AllocationRecord, PersonQuery};
use inventory_core::validation::{validate_person_query, FieldErrors};
use tracing::{error, info};

use super::{form_or_400, shell};
use crate::error::AppError;
use crate::remote::PersonLookupOutcome;
use crate::views::{escape_html, record_table, Banner, Input};
use crate::AppState;

pub const LOOKUP_FAILED: &str = "No data found or operation failed.";
pub const NO_DATA: &str = "No data returned.";
pub const FETCH_FAILED: &str = "Unable to fetch resource allocations. Please try again.";
pub const NO_ALLOCATIONS: &str = "No allocations found for the provided person.";

const TITLE: &str = "Person View";
const PATH: &str = "/person-view";

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn allocation_card(item: &AllocationRecord) -> String {
    let summary = format!(
        r#"<div class="card-head"><span class="tag">{}</span><span class="muted">{}</span></div>
<dl class="card-fields">
    <dt>Allocation Date</dt><dd>{}</dd>
    <dt>Cost Center</dt><dd>{}</dd>
    <dt>Location</dt><dd>{}</dd>
    <dt>Email</dt><dd>{}</dd>
</dl>"#,
        escape_html(&item.service_tag_number),
        escape_html(&item.name),
        escape_html(or_dash(&item.allocation_date)),
        escape_html(or_dash(&item.cost_center)),
        escape_html(or_dash(&item.location)),
        escape_html(or_dash(&item.email)),
    );

    let detail = record_table(&[
        ("SerialNumber", item.service_tag_number.as_str()),
        ("Name", item.name.as_str()),
        ("Email", item.email.as_str()),
        ("Location", item.location.as_str()),
        ("Cost Center", item.cost_center.as_str()),
        ("Allocation Date", item.allocation_date.as_str()),
        ("Detail", or_dash(&item.detail)),
    ]);

    format!(
        r#"<article class="allocation-card">{}<details class="card-details"><summary>View details</summary>{}</details></article>"#,
        summary, detail
    )
}

fn results_panel(results: &[AllocationRecord]) -> String {
    let count = format!(
        "{} result{}",
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );
    let body = if results.is_empty() {
        format!(r#"<p class="empty">{}</p>"#, NO_ALLOCATIONS)
    } else {
        let cards: String = results.iter().map(allocation_card).collect();
        format!(r#"<div class="card-grid">{}</div>"#, cards)
    };
    format!(
        r#"<section class="panel"><div class="panel-head"><h2>Allocations</h2><span class="muted">{}</span></div>{}</section>"#,
        count, body
    )
}

fn render(
    headers: &HeaderMap,
    query: &PersonQuery,
    errors: &FieldErrors,
    message: Option<Banner>,
    results: Option<&[AllocationRecord]>,
) -> Html<String> {
    let content = format!(
        r#"{}<section class="panel"><form method="post" action="{}" class="form grid-2" novalidate>{}{}<div class="actions"><button type="submit" class="btn btn-primary">Search</button></div></form></section>{}"#,
        message.map(|b| b.render()).unwrap_or_default(),
        PATH,
        Input::text("name", "Name", &query.name).render(errors, "name"),
        Input::text("email", "Email-ID", &query.email).kind("email").render(errors, "email"),
        results.map(results_panel).unwrap_or_default()
    );
    shell(headers, TITLE, PATH, &content)
}

pub async fn show(headers: HeaderMap) -> Html<String> {
    render(&headers, &PersonQuery::default(), &FieldErrors::new(), None, None)
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<PersonQuery>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let query = form_or_400(form)?;

    let errors = validate_person_query(&query);
    if !errors.is_empty() {
        return Ok(render(&headers, &query, &errors, None, None));
    }

    info!("👤 Fetching allocations for {}", query.email);
    let none = FieldErrors::new();
    let no_results: Vec<AllocationRecord> = Vec::new();
    let page = match state.api.allocations_for_person(&query).await {
        Ok(PersonLookupOutcome::Found(records)) => {
            info!("✅ {} allocations for {}", records.len(), query.email);
            render(&headers, &query, &none, None, Some(records.as_slice()))
        }
        Ok(PersonLookupOutcome::Failed) => render(&headers, &query, &none, Some(Banner::info(LOOKUP_FAILED)), Some(no_results.as_slice())),
        Ok(PersonLookupOutcome::Empty) => render(&headers, &query, &none, Some(Banner::info(NO_DATA)), Some(no_results.as_slice())),
        Err(e) => {
            error!("❌ Allocation lookup failed: {}", e);
            render(&headers, &query, &none, Some(Banner::error(FETCH_FAILED)), Some(no_results.as_slice()))
        }
    };
    Ok(page)
}
