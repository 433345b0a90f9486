use axum::{
    extract::{MatchedPath, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub matched_path: Option<String>,
    pub query_string: Option<String>,
    pub status_code: u16,
    pub duration_ms: u64,
    pub request_headers: Value,
    pub response_headers: Value,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub service: String,
    pub version: String,
}

// Captures one structured log line per request
pub async fn api_logging_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let request_headers = headers_to_json(request.headers());
    let client_ip = extract_client_ip(request.headers());
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(request).await;
    let duration = start_time.elapsed();
    let status_code = response.status().as_u16();

    let log_entry = ApiLogEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        method: method.to_string(),
        path: uri.path().to_string(),
        matched_path,
        query_string: uri.query().map(|q| q.to_string()),
        status_code,
        duration_ms: duration.as_millis() as u64,
        request_headers,
        response_headers: headers_to_json(response.headers()),
        client_ip,
        user_agent,
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if response.status().is_server_error() {
        warn!(
            "📡 {} {} -> {} ({} ms)",
            method,
            uri.path(),
            status_code,
            duration.as_millis()
        );
    } else {
        info!(
            "📡 {} {} -> {} ({} ms)",
            method,
            uri.path(),
            status_code,
            duration.as_millis()
        );
    }

    match serde_json::to_string(&log_entry) {
        Ok(json) => info!(target: "inventory_server::access", "{}", json),
        Err(e) => warn!("⚠️  Could not serialize log entry {}: {}", log_entry.id, e),
    }

    response
}

fn is_sensitive(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("authorization") || lower.contains("cookie") || lower.contains("token")
}

pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = serde_json::Map::new();

    for (name, value) in headers.iter() {
        if is_sensitive(name.as_str()) {
            continue;
        }
        if let Ok(value_str) = value.to_str() {
            map.insert(name.as_str().to_string(), Value::String(value_str.to_string()));
        }
    }

    Value::Object(map)
}

pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let ip_headers = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip", "x-client-ip"];

    for header_name in &ip_headers {
        if let Some(ip_str) = headers.get(*header_name).and_then(|v| v.to_str().ok()) {
            // first hop of a comma-separated chain
            let first_ip = ip_str.split(',').next().unwrap_or("").trim();
            if !first_ip.is_empty() {
                return Some(first_ip.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_sensitive_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("auth=1"));
        headers.insert("set-cookie", HeaderValue::from_static("user=x"));
        headers.insert("x-api-token", HeaderValue::from_static("secret"));
        headers.insert("accept", HeaderValue::from_static("text/html"));

        let json = headers_to_json(&headers);
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["accept"], "text/html");
    }

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.1.1.1"));
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.9, 10.0.0.2"));
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.9"));
        assert_eq!(extract_client_ip(&HeaderMap::new()), None);
    }
}
