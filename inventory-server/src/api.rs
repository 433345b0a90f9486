use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use inventory_core::models::NewAllocation;
use inventory_core::validation::validate_allocation_fields;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

const ALLOCATION_ID_LEN: usize = 11;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub message: String,
}

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/allocations", post(create_allocation))
        .route("/dashboard", get(dashboard_sample))
}

async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        message: "Inventory dashboard is running".to_string(),
    })
}

/// Lower-case base-36 id derived from a v4 uuid.
pub fn allocation_id() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(ALLOCATION_ID_LEN);
    while out.len() < ALLOCATION_ID_LEN {
        let digit = (n % 36) as u32;
        n /= 36;
        out.push(std::char::from_digit(digit, 36).unwrap_or('0'));
    }
    out
}

fn string_field(body: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AppError::Api(format!("{} must be a string", key))),
    }
}

fn parse_allocation(bytes: &[u8]) -> Result<NewAllocation, AppError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| AppError::Api(e.to_string()))?;
    let body = match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(AppError::Api("Request body must be a JSON object".to_string())),
    };

    Ok(NewAllocation {
        name: string_field(&body, "name")?,
        serial_number: string_field(&body, "serialNumber")?,
        allocation_date: string_field(&body, "allocationDate")?,
        po: string_field(&body, "po")?,
        location: string_field(&body, "location")?,
        email: string_field(&body, "email")?,
        detail: String::new(),
    })
}

async fn create_allocation(body: Bytes) -> Result<Response, AppError> {
    let allocation = parse_allocation(&body)?;

    let errors = validate_allocation_fields(&allocation);
    if !errors.is_empty() {
        warn!("⚠️  Rejected allocation with {} field errors", errors.len());
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "errors": errors })),
        )
            .into_response());
    }

    let id = allocation_id();
    info!("✅ Accepted allocation {} for {}", id, allocation.serial_number);

    let data = json!({
        "name": allocation.name,
        "serialNumber": allocation.serial_number,
        "allocationDate": allocation.allocation_date,
        "po": allocation.po,
        "location": allocation.location,
        "email": allocation.email,
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": id, "data": data })),
    )
        .into_response())
}

async fn dashboard_sample() -> Json<Value> {
    Json(json!({
        "salesActivity": [
            { "id": 1, "title": "TO BE PACKED", "value": 228, "unit": "Qty", "color": "text-blue-600", "bgColor": "bg-blue-50" },
            { "id": 2, "title": "TO BE SHIPPED", "value": 6, "unit": "Pkgs", "color": "text-orange-600", "bgColor": "bg-orange-50" },
            { "id": 3, "title": "TO BE DELIVERED", "value": 10, "unit": "Pkgs", "color": "text-purple-600", "bgColor": "bg-purple-50" },
            { "id": 4, "title": "TO BE INVOICED", "value": 474, "unit": "Qty", "color": "text-green-600", "bgColor": "bg-green-50" }
        ],
        "inventory": { "quantityInHand": 10458, "quantityToBeReceived": 168 },
        "products": { "lowStockItems": 3, "allItemGroup": 39, "allItems": 190, "unconfirmedItems": 121, "activePercentage": 71 },
        "topSellingItems": [
            { "id": 1, "name": "Hanswooly Cotton Cas...", "quantity": 171, "unit": "pcs", "color": "Orange" },
            { "id": 2, "name": "Cutiepie Rompers-spo...", "quantity": 45, "unit": "sets", "color": "Blue & Pink" },
            { "id": 3, "name": "Cutiepie Rompers-jet b...", "quantity": 38, "unit": "sets", "color": "Dark Blue & White" }
        ],
        "purchaseOrders": { "quantityOrdered": 2.00, "totalCost": 46.92 },
        "salesOrders": [
            { "channel": "Direct sales", "draft": 0, "confirmed": 50, "packed": 0, "shipped": 0, "invoiced": 102 }
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_id_shape() {
        let id = allocation_id();
        assert_eq!(id.len(), ALLOCATION_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(allocation_id(), allocation_id());
    }

    #[test]
    fn test_parse_allocation_bodies() {
        let parsed = parse_allocation(br#"{"name":"Asha","po":null}"#).unwrap();
        assert_eq!(parsed.name, "Asha");
        assert_eq!(parsed.po, "");

        assert!(parse_allocation(b"null").unwrap().name.is_empty());
        assert!(matches!(parse_allocation(b"[1]"), Err(AppError::Api(_))));
        assert!(matches!(parse_allocation(b"not json"), Err(AppError::Api(_))));
        assert!(matches!(parse_allocation(br#"{"name": 5}"#), Err(AppError::Api(_))));
    }
}
