use inventory_core::charts::{format_number, DataPoint, InsightCard};

use super::escape_html;

const WIDTH: f64 = 560.0;
const HEIGHT: f64 = 260.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 56.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 12.0;

fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let head: String = label.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Inline SVG bar chart with a value label on each bar and a
/// `format_number` y-axis.
pub fn bar_chart(points: &[DataPoint], color: &str, legend: &str) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let scale_max = if max > 0.0 { max } else { 1.0 };

    let mut svg = format!(
        r#"<svg class="bar-chart" viewBox="0 0 {} {}" role="img" aria-label="{}">"#,
        WIDTH,
        HEIGHT,
        escape_html(legend)
    );

    for step in 0..=4 {
        let value = scale_max * f64::from(step) / 4.0;
        let y = MARGIN_TOP + plot_h - plot_h * f64::from(step) / 4.0;
        svg.push_str(&format!(
            r##"<line x1="{x1}" x2="{x2}" y1="{y:.1}" y2="{y:.1}" stroke="#e5e7eb"/><text class="axis" x="{tx}" y="{ty:.1}" text-anchor="end">{label}</text>"##,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT,
            y = y,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = format_number(value)
        ));
    }

    if !points.is_empty() {
        let slot = plot_w / points.len() as f64;
        let bar_w = (slot * 0.7).max(2.0);
        for (i, point) in points.iter().enumerate() {
            let h = (point.value.max(0.0) / scale_max) * plot_h;
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let y = MARGIN_TOP + plot_h - h;
            let cx = x + bar_w / 2.0;
            svg.push_str(&format!(
                r#"<g><title>{name}: {value}</title><rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" rx="3" fill="{color}"/><text class="bar-value" x="{cx:.1}" y="{vy:.1}" text-anchor="middle">{value}</text><text class="axis" x="{cx:.1}" y="{ly:.1}" text-anchor="middle">{short}</text></g>"#,
                name = escape_html(&point.name),
                value = format_number(point.value),
                x = x,
                y = y,
                w = bar_w,
                h = h,
                color = color,
                cx = cx,
                vy = y - 4.0,
                ly = HEIGHT - MARGIN_BOTTOM + 16.0,
                short = escape_html(&truncate_label(&point.name, 12))
            ));
        }
    }

    svg.push_str("</svg>");
    svg.push_str(&format!(
        r#"<div class="legend"><span class="swatch" style="background:{}"></span>{}</div>"#,
        color,
        escape_html(legend)
    ));
    svg
}

pub fn insight_card(card: &InsightCard) -> String {
    format!(
        r#"<div class="insight-card"><div class="insight-title">{}</div><div class="insight-value">{}</div><div class="insight-unit">{}</div></div>"#,
        card.kind.title(),
        escape_html(card.display_value()),
        card.kind.unit()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::charts::DeviceCount;

    #[test]
    fn test_bar_chart_has_one_bar_per_point() {
        let points = vec![
            DataPoint { name: "MacBook Pro".to_string(), value: 1_500.0 },
            DataPoint { name: "ThinkPad".to_string(), value: 300.0 },
        ];
        let svg = bar_chart(&points, "#3b82f6", "Deployed");
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("1.5k"));
        assert!(svg.contains(r##"fill="#3b82f6""##));
    }

    #[test]
    fn test_long_labels_are_shortened() {
        assert_eq!(truncate_label("Latitude 7440 Ultralight", 12), "Latitude 74…");
        assert_eq!(truncate_label("Air", 12), "Air");
    }

    #[test]
    fn test_insight_card_placeholder() {
        let html = insight_card(&InsightCard::placeholder(DeviceCount::Stock));
        assert!(html.contains("STOCK DEVICES"));
        assert!(html.contains(">--<"));
        assert!(html.contains("Pkgs"));
    }
}
