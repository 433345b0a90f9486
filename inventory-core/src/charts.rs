use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::json_to_text;

pub const DEPLOYED_COLOR: &str = "#3b82f6";
pub const STOCK_COLOR: &str = "#10b981";

/// One bar of a dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    pub value: f64,
}

fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|v| !v.is_null())
}

fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Reshapes an aggregate endpoint's payload into chart points.
///
/// Accepts an array of `{name|key|x, value|y}` objects or a plain object
/// mapping names to counts. Any other shape yields no points.
pub fn reshape_series(json: &Value) -> Vec<DataPoint> {
    match json {
        Value::Array(items) => {
            if !items.first().map(Value::is_object).unwrap_or(false) {
                return Vec::new();
            }
            items
                .iter()
                .map(|item| DataPoint {
                    name: first_present(item, &["name", "key", "x"])
                        .and_then(json_to_text)
                        .unwrap_or_default(),
                    value: first_present(item, &["value", "y"])
                        .map(coerce_number)
                        .unwrap_or(0.0),
                })
                .filter(|point| !point.name.is_empty())
                .collect()
        }
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| DataPoint {
                name: name.clone(),
                value: coerce_number(value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Compact axis/label formatting: `1.2k`, `3.4M`, `5.0B`.
pub fn format_number(n: f64) -> String {
    let abs = n.abs();
    let sign = if n < 0.0 { "-" } else { "" };
    if abs >= 1_000_000_000.0 {
        format!("{}{:.1}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}{:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}{:.1}k", sign, abs / 1_000.0)
    } else if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Which aggregate a summary card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCount {
    All,
    Deployed,
    Stock,
    EndOfWarranty,
}

impl DeviceCount {
    pub const ALL: [DeviceCount; 4] = [
        DeviceCount::All,
        DeviceCount::Deployed,
        DeviceCount::Stock,
        DeviceCount::EndOfWarranty,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DeviceCount::All => "ALL DEVICES",
            DeviceCount::Deployed => "DEPLOYED DEVICES",
            DeviceCount::Stock => "STOCK DEVICES",
            DeviceCount::EndOfWarranty => "EOW DEVICES",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            DeviceCount::All | DeviceCount::EndOfWarranty => "Qty",
            DeviceCount::Deployed | DeviceCount::Stock => "Pkgs",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            DeviceCount::All => "/getAllDevices",
            DeviceCount::Deployed => "/getDeployedDevices",
            DeviceCount::Stock => "/getStockDevices",
            DeviceCount::EndOfWarranty => "/getEowDevices",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightCard {
    pub kind: DeviceCount,
    /// `None` until the count has been fetched.
    pub value: Option<String>,
}

impl InsightCard {
    pub fn placeholder(kind: DeviceCount) -> Self {
        Self { kind, value: None }
    }

    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or("--")
    }
}

/// `count` of a count endpoint's payload, `"0"` when absent, null or empty.
pub fn count_label(json: &Value) -> String {
    json.get("count")
        .and_then(json_to_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "0".to_string())
}

/// The four bar-chart widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesWidget {
    DeployedModelView,
    DeployedModelSubStatus,
    StockModelView,
    StockModelSubStatus,
}

impl SeriesWidget {
    pub const ALL: [SeriesWidget; 4] = [
        SeriesWidget::DeployedModelView,
        SeriesWidget::DeployedModelSubStatus,
        SeriesWidget::StockModelView,
        SeriesWidget::StockModelSubStatus,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SeriesWidget::DeployedModelView => "Deployed by Model",
            SeriesWidget::DeployedModelSubStatus => "Deployed by Sub-Status",
            SeriesWidget::StockModelView => "Stock by Model",
            SeriesWidget::StockModelSubStatus => "Stock by Sub-Status",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            SeriesWidget::DeployedModelView => "/getDeployedModelView",
            SeriesWidget::DeployedModelSubStatus => "/getDeployedModelSubStatus",
            SeriesWidget::StockModelView => "/getStockModelView",
            SeriesWidget::StockModelSubStatus => "/getStockModelSubStatus",
        }
    }

    pub fn legend(&self) -> &'static str {
        match self {
            SeriesWidget::DeployedModelView | SeriesWidget::DeployedModelSubStatus => "Deployed",
            SeriesWidget::StockModelView | SeriesWidget::StockModelSubStatus => "Stock",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SeriesWidget::DeployedModelView | SeriesWidget::DeployedModelSubStatus => DEPLOYED_COLOR,
            SeriesWidget::StockModelView | SeriesWidget::StockModelSubStatus => STOCK_COLOR,
        }
    }
}
