use axum::{extract::State, http::HeaderMap, response::Html};
use inventory_core::charts::{count_label, reshape_series, DeviceCount, InsightCard, SeriesWidget};
use serde_json::Value;
use tracing::{error, info};

use super::shell;
use crate::remote::{InventoryApiClient, RemoteError};
use crate::views::charts::{bar_chart, insight_card};
use crate::views::{escape_html, Banner};
use crate::AppState;

pub const COUNTS_FAILED: &str = "Failed to fetch data";

/// Fetches all four counts before rendering any of them; one failure keeps
/// every card on its placeholder.
async fn load_insights(api: &InventoryApiClient) -> Result<Vec<InsightCard>, RemoteError> {
    let (all, deployed, stock, eow) = tokio::join!(
        api.device_count(DeviceCount::All),
        api.device_count(DeviceCount::Deployed),
        api.device_count(DeviceCount::Stock),
        api.device_count(DeviceCount::EndOfWarranty),
    );

    let values = [all?, deployed?, stock?, eow?];
    Ok(DeviceCount::ALL
        .iter()
        .zip(values.iter())
        .map(|(kind, json)| InsightCard {
            kind: *kind,
            value: Some(count_label(json)),
        })
        .collect())
}

fn render_widget(widget: SeriesWidget, result: Result<Value, RemoteError>) -> String {
    let body = match result {
        Err(e) => {
            error!("❌ {} failed: {}", widget.title(), e);
            format!(
                r#"<p class="chart-error">Failed to load {}</p>"#,
                escape_html(widget.title())
            )
        }
        Ok(json) => {
            let points = reshape_series(&json);
            if points.is_empty() {
                r#"<p class="chart-empty">No data</p>"#.to_string()
            } else {
                bar_chart(&points, widget.color(), widget.legend())
            }
        }
    };

    format!(
        r#"<section class="panel chart-panel"><h2>{}</h2>{}</section>"#,
        escape_html(widget.title()),
        body
    )
}

pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    info!("📊 Rendering dashboard");

    let (insights, deployed_model, deployed_sub, stock_model, stock_sub) = tokio::join!(
        load_insights(&state.api),
        state.api.series(SeriesWidget::DeployedModelView),
        state.api.series(SeriesWidget::DeployedModelSubStatus),
        state.api.series(SeriesWidget::StockModelView),
        state.api.series(SeriesWidget::StockModelSubStatus),
    );

    let (cards, banner) = match insights {
        Ok(cards) => (cards, String::new()),
        Err(e) => {
            error!("❌ Device counts failed: {}", e);
            let placeholders: Vec<InsightCard> = DeviceCount::ALL.iter().map(|k| InsightCard::placeholder(*k)).collect();
            (placeholders, Banner::error(COUNTS_FAILED).render())
        }
    };

    let cards_html: String = cards.iter().map(insight_card).collect();
    let charts_html: String = SeriesWidget::ALL
        .iter()
        .zip([deployed_model, deployed_sub, stock_model, stock_sub])
        .map(|(widget, result)| render_widget(*widget, result))
        .collect();

    let content = format!(
        r#"{}<div class="insight-grid">{}</div><div class="chart-grid">{}</div>"#,
        banner, cards_html, charts_html
    );
    shell(&headers, "Dashboard", "/dashboard", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_states() {
        let failed = render_widget(SeriesWidget::StockModelView, Err(RemoteError::Status { status: 502 }));
        assert!(failed.contains("Failed to load Stock by Model"));

        let empty = render_widget(SeriesWidget::StockModelView, Ok(json!([])));
        assert!(empty.contains("No data"));

        let chart = render_widget(SeriesWidget::DeployedModelView, Ok(json!({"MacBook Pro": 12})));
        assert!(chart.contains("<svg"));
        assert!(chart.contains("#3b82f6"));
    }
}
