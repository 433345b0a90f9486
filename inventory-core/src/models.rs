use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Session cookies written by the login page and cleared by logout
pub const AUTH_COOKIE: &str = "auth";
pub const USER_COOKIE: &str = "user";
pub const COOKIE_PATH: &str = "/";
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 8;

pub const DEFAULT_PAGE: &str = "/dashboard";
pub const LOGIN_PAGE: &str = "/";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown stock field: `{0}`")]
    UnknownField(String),
    #[error("Location must be Pune or Bangalore")]
    UnknownLocation(String),
}

/// Allocation payload sent by the add page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAllocation {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "serialNumber", default)]
    pub serial_number: String,
    #[serde(rename = "allocationDate", default)]
    pub allocation_date: String,
    #[serde(default)]
    pub po: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub detail: String,
}

/// A stored allocation as returned by the lookup endpoints.
///
/// The remote service is not consistent about `detail` vs `details`, so both
/// spellings land in `detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_tag_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub allocation_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost_center: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, alias = "details", deserialize_with = "lenient_string")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationUpdate {
    pub serialnumber: String,
    pub name: String,
    pub allocation_date: String,
    pub cost_center: String,
    pub location: String,
    pub email: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialLookup {
    pub serialnumber: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonQuery {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One row of the detailed stock listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockDevice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_tag_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sub_status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ordered_by: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub make_model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub po: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ownership: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deployed_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub received: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub warranty_end: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub warranty_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub warranty_status: String,
    // number or null on the wire
    #[serde(default)]
    pub year: Value,
}

impl StockDevice {
    /// Stringified value of one column, `None` when the column is null.
    pub fn field_value(&self, field: StockField) -> Option<String> {
        let text = match field {
            StockField::ServiceTagNumber => &self.service_tag_number,
            StockField::Status => &self.status,
            StockField::SubStatus => &self.sub_status,
            StockField::OrderedBy => &self.ordered_by,
            StockField::MakeModel => &self.make_model,
            StockField::Po => &self.po,
            StockField::Ownership => &self.ownership,
            StockField::DeployedDate => &self.deployed_date,
            StockField::Location => &self.location,
            StockField::Received => &self.received,
            StockField::WarrantyEnd => &self.warranty_end,
            StockField::WarrantyDate => &self.warranty_date,
            StockField::WarrantyStatus => &self.warranty_status,
            StockField::Year => return json_to_text(&self.year),
        };
        Some(text.clone())
    }

    pub fn warranty_active(&self) -> bool {
        self.warranty_status.to_lowercase().contains("active")
    }
}

/// Filterable columns of the stock table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockField {
    ServiceTagNumber,
    Status,
    SubStatus,
    OrderedBy,
    MakeModel,
    Po,
    Ownership,
    DeployedDate,
    Location,
    Received,
    WarrantyEnd,
    WarrantyDate,
    WarrantyStatus,
    Year,
}

impl StockField {
    pub const ALL: [StockField; 14] = [
        StockField::ServiceTagNumber,
        StockField::Status,
        StockField::SubStatus,
        StockField::OrderedBy,
        StockField::MakeModel,
        StockField::Po,
        StockField::Ownership,
        StockField::DeployedDate,
        StockField::Location,
        StockField::Received,
        StockField::WarrantyEnd,
        StockField::WarrantyDate,
        StockField::WarrantyStatus,
        StockField::Year,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StockField::ServiceTagNumber => "service_tag_number",
            StockField::Status => "status",
            StockField::SubStatus => "sub_status",
            StockField::OrderedBy => "ordered_by",
            StockField::MakeModel => "make_model",
            StockField::Po => "po",
            StockField::Ownership => "ownership",
            StockField::DeployedDate => "deployed_date",
            StockField::Location => "location",
            StockField::Received => "received",
            StockField::WarrantyEnd => "warranty_end",
            StockField::WarrantyDate => "warranty_date",
            StockField::WarrantyStatus => "warranty_status",
            StockField::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockField::ServiceTagNumber => "Service Tag",
            StockField::Status => "Status",
            StockField::SubStatus => "Sub-Status",
            StockField::OrderedBy => "Ordered By",
            StockField::MakeModel => "Make/Model",
            StockField::Po => "PO",
            StockField::Ownership => "Ownership",
            StockField::DeployedDate => "Deployed Date",
            StockField::Location => "Location",
            StockField::Received => "Received",
            StockField::WarrantyEnd => "Warranty End",
            StockField::WarrantyDate => "Warranty Date",
            StockField::WarrantyStatus => "Warranty Status",
            StockField::Year => "Year",
        }
    }
}

impl FromStr for StockField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockField::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Pune,
    Bangalore,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Pune, Location::Bangalore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Pune => "Pune",
            Location::Bangalore => "Bangalore",
        }
    }

    pub fn is_allowed(value: &str) -> bool {
        value.parse::<Location>().is_ok()
    }
}

impl FromStr for Location {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .iter()
            .copied()
            .find(|location| location.as_str() == s)
            .ok_or_else(|| ModelError::UnknownLocation(s.to_string()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a mutation response's `status` field reads.
///
/// Anything other than the two literal strings the inventory service emits is
/// `Malformed`, so a broken response is never mistaken for a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Success,
    Failed,
    Malformed,
}

impl RemoteStatus {
    pub fn from_response(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("Success") => RemoteStatus::Success,
            Some("Failed") => RemoteStatus::Failed,
            _ => RemoteStatus::Malformed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RemoteStatus::Success)
    }
}

/// Text form of a JSON scalar, the way it would print in a table cell.
pub fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(json_to_text(&value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allocation_record_accepts_details_spelling() {
        let record: AllocationRecord = serde_json::from_value(json!({
            "name": "Asha",
            "details": "spare charger",
            "cost_center": 4411
        }))
        .unwrap();

        assert_eq!(record.detail, "spare charger");
        assert_eq!(record.cost_center, "4411");
        assert_eq!(record.email, "");
    }

    #[test]
    fn test_stock_device_nulls_become_empty() {
        let device: StockDevice = serde_json::from_value(json!({
            "service_tag_number": "C02XK1",
            "status": null,
            "year": 2022
        }))
        .unwrap();

        assert_eq!(device.status, "");
        assert_eq!(device.field_value(StockField::Year), Some("2022".to_string()));
        assert_eq!(device.field_value(StockField::Status), Some(String::new()));
    }

    #[test]
    fn test_missing_year_is_null() {
        let device: StockDevice = serde_json::from_value(json!({})).unwrap();
        assert_eq!(device.field_value(StockField::Year), None);
    }

    #[test]
    fn test_stock_field_round_trips_through_key() {
        for field in StockField::ALL {
            assert_eq!(field.key().parse::<StockField>().unwrap(), field);
        }
        assert!("colour".parse::<StockField>().is_err());
    }

    #[test]
    fn test_location_is_exact_match() {
        assert!(Location::is_allowed("Pune"));
        assert!(Location::is_allowed("Bangalore"));
        assert!(!Location::is_allowed("pune"));
        assert!(!Location::is_allowed("Berlin"));
    }

    #[test]
    fn test_remote_status_classification() {
        assert_eq!(RemoteStatus::from_response(&json!({"status": "Success"})), RemoteStatus::Success);
        assert_eq!(RemoteStatus::from_response(&json!({"status": "Failed"})), RemoteStatus::Failed);
        assert_eq!(RemoteStatus::from_response(&json!({"status": "success"})), RemoteStatus::Malformed);
        assert_eq!(RemoteStatus::from_response(&json!({})), RemoteStatus::Malformed);
        assert_eq!(RemoteStatus::from_response(&json!([1, 2])), RemoteStatus::Malformed);
        assert!(RemoteStatus::Success.is_success());
        assert!(!RemoteStatus::Malformed.is_success());
    }

    #[test]
    fn test_new_allocation_wire_names() {
        let payload = NewAllocation {
            serial_number: "SN1".to_string(),
            allocation_date: "2024-01-02".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["serialNumber"], "SN1");
        assert_eq!(value["allocationDate"], "2024-01-02");
        assert!(value.get("detail").is_some());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "ops".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
