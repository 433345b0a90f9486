use inventory_core::charts::{DeviceCount, SeriesWidget};
use inventory_core::models::{
    AllocationRecord, AllocationUpdate, Credentials, NewAllocation, PersonQuery, RemoteStatus,
    SerialLookup, StockDevice,
};
use inventory_core::validation::FieldErrors;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Inventory service returned HTTP {status}")]
    Status { status: u16 },
    #[error("Invalid JSON from inventory service: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(&'static str),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Result of `/addResourceAllocation`. The body is decoded whatever the
/// HTTP status, so a 4xx carrying `errors` still reaches the form.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub http_status: u16,
    pub status: RemoteStatus,
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
}

impl MutationOutcome {
    fn from_response(http_status: u16, body: &Value) -> Self {
        Self {
            http_status,
            status: RemoteStatus::from_response(body),
            errors: body.get("errors").and_then(FieldErrors::from_json),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }

    /// Saved only on a 2xx carrying `status: "Success"`.
    pub fn is_saved(&self) -> bool {
        (200..300).contains(&self.http_status) && self.status.is_success()
    }

    /// 2xx with a status that is neither `Success` nor `Failed`.
    pub fn is_malformed(&self) -> bool {
        (200..300).contains(&self.http_status) && self.status == RemoteStatus::Malformed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SerialLookupOutcome {
    Failed,
    NotFound,
    Found(AllocationRecord),
}

impl SerialLookupOutcome {
    fn from_response(body: Value) -> Result<Self> {
        if RemoteStatus::from_response(&body) == RemoteStatus::Failed {
            return Ok(SerialLookupOutcome::Failed);
        }

        let record = match body {
            Value::Array(items) => items.into_iter().next(),
            object @ Value::Object(_) => Some(object),
            _ => None,
        };

        let Some(record) = record.filter(|r| r.as_object().map(|m| !m.is_empty()).unwrap_or(false)) else {
            return Ok(SerialLookupOutcome::NotFound);
        };
        Ok(SerialLookupOutcome::Found(serde_json::from_value(record)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersonLookupOutcome {
    Found(Vec<AllocationRecord>),
    Failed,
    Empty,
}

impl PersonLookupOutcome {
    fn from_response(body: Value) -> Result<Self> {
        match body {
            Value::Array(_) => Ok(PersonLookupOutcome::Found(serde_json::from_value(body)?)),
            other if RemoteStatus::from_response(&other) == RemoteStatus::Failed => {
                Ok(PersonLookupOutcome::Failed)
            }
            _ => Ok(PersonLookupOutcome::Empty),
        }
    }
}

/// Client for the remote inventory service. Every endpoint is a JSON `POST`.
#[derive(Debug, Clone)]
pub struct InventoryApiClient {
    client: Client,
    base_url: String,
}

impl InventoryApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<B: Serialize + ?Sized>(&self, endpoint: &str, body: Option<&B>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("🌐 POST {}", url);

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: Option<&B>) -> Result<Value> {
        let response = self.send(endpoint, body).await?;

        if !response.status().is_success() {
            error!("❌ {} returned {}", endpoint, response.status());
            return Err(RemoteError::Status {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Like `post_json` but a non-2xx answer is returned with its decoded body.
    async fn post_json_any_status<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<(u16, Value)> {
        let response = self.send(endpoint, Some(body)).await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            warn!("⚠️  {} returned {}", endpoint, status);
        }

        let text = response.text().await?;
        Ok((status, serde_json::from_str(&text)?))
    }

    pub async fn authorize(&self, credentials: &Credentials) -> Result<RemoteStatus> {
        let body = self.post_json("/getUserAuthorization", Some(credentials)).await?;
        Ok(RemoteStatus::from_response(&body))
    }

    pub async fn add_allocation(&self, allocation: &NewAllocation) -> Result<MutationOutcome> {
        let (status, body) = self.post_json_any_status("/addResourceAllocation", allocation).await?;
        Ok(MutationOutcome::from_response(status, &body))
    }

    pub async fn find_by_serial(&self, serial: &str) -> Result<SerialLookupOutcome> {
        let lookup = SerialLookup {
            serialnumber: serial.to_string(),
        };
        let body = self.post_json("/getSerialnumberAllocation", Some(&lookup)).await?;
        SerialLookupOutcome::from_response(body)
    }

    pub async fn update_allocation(&self, update: &AllocationUpdate) -> Result<RemoteStatus> {
        let body = self.post_json("/updateResourceAllocation", Some(update)).await?;
        Ok(RemoteStatus::from_response(&body))
    }

    pub async fn delete_allocation(&self, serial: &str) -> Result<RemoteStatus> {
        let lookup = SerialLookup {
            serialnumber: serial.to_string(),
        };
        let body = self.post_json("/deleteResources", Some(&lookup)).await?;
        Ok(RemoteStatus::from_response(&body))
    }

    pub async fn allocations_for_person(&self, query: &PersonQuery) -> Result<PersonLookupOutcome> {
        let body = self.post_json("/getResourceAllocation", Some(query)).await?;
        PersonLookupOutcome::from_response(body)
    }

    pub async fn stock_devices(&self) -> Result<Vec<StockDevice>> {
        let body = self.post_json::<Value>("/getStockDevicesDetailed", None).await?;
        if !body.is_array() {
            return Err(RemoteError::UnexpectedShape("expected an array of devices"));
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn device_count(&self, kind: DeviceCount) -> Result<Value> {
        self.post_json::<Value>(kind.endpoint(), None).await
    }

    pub async fn series(&self, widget: SeriesWidget) -> Result<Value> {
        self.post_json::<Value>(widget.endpoint(), None).await
    }
}
