//! Chart-spec extraction from assistant output.
//!
//! Reporting agents embed a `<chart_spec>…</chart_spec>` block carrying a
//! declarative chart description. The block is stripped from the visible
//! text and mapped to a plotly-compatible document the browser can render.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

static CHART_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<chart_spec>(.*?)</chart_spec>").expect("static regex is valid"));

/// Declarative chart description emitted by the agent.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSpec {
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub x_axis: Vec<Value>,
    #[serde(default)]
    pub y_axis: Vec<Value>,
}

fn default_chart_type() -> String {
    "bar".to_string()
}

fn default_title() -> String {
    "Chart".to_string()
}

/// Scan assistant text for an embedded chart spec.
///
/// Returns the text with the spec block removed and, when the block parses
/// into a known chart kind, a plotly document. Parse failures are logged
/// and swallowed; the chart is simply omitted.
pub fn extract_chart(text: &str) -> (String, Option<Value>) {
    let Some(captures) = CHART_SPEC_RE.captures(text) else {
        return (text.to_string(), None);
    };

    let chart = match serde_json::from_str::<ChartSpec>(&captures[1]) {
        Ok(spec) => build_chart(&spec),
        Err(e) => {
            warn!(error = %e, "chart spec parse failed, dropping chart");
            None
        }
    };

    let cleaned = CHART_SPEC_RE.replace_all(text, "").into_owned();
    (cleaned, chart)
}

/// Map a chart spec to a plotly document. Unknown kinds produce no chart.
pub fn build_chart(spec: &ChartSpec) -> Option<Value> {
    let (mut x, mut y) = (spec.x_axis.clone(), spec.y_axis.clone());
    if x.is_empty() || y.is_empty() {
        x = vec![json!("Jan"), json!("Feb"), json!("Mar")];
        y = vec![json!(10), json!(20), json!(15)];
    }

    let layout = json!({"title": spec.title, "autosize": true});

    match spec.chart_type.as_str() {
        "bar" => Some(json!({
            "data": [{"type": "bar", "x": x, "y": y}],
            "layout": layout,
        })),
        "line" => Some(json!({
            "data": [{"type": "scatter", "mode": "lines+markers", "x": x, "y": y}],
            "layout": layout,
        })),
        "pie" => Some(json!({
            "data": [{"type": "pie", "labels": x, "values": y}],
            "layout": layout,
        })),
        other => {
            warn!(chart_type = %other, "unknown chart type, dropping chart");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_block_is_unchanged() {
        let (text, chart) = extract_chart("Revenue grew 12% quarter over quarter.");
        assert_eq!(text, "Revenue grew 12% quarter over quarter.");
        assert!(chart.is_none());
    }

    #[test]
    fn bar_block_is_stripped_and_mapped() {
        let input = concat!(
            "Here is the breakdown:\n",
            r#"<chart_spec>{"chart_type":"bar","title":"T","x_axis":["a","b"],"y_axis":[1,2]}</chart_spec>"#,
            "\nLet me know if you need more."
        );
        let (text, chart) = extract_chart(input);
        assert!(!text.contains("chart_spec"));
        assert!(text.contains("Here is the breakdown:"));
        assert!(text.contains("Let me know if you need more."));

        let chart = chart.expect("bar spec should produce a chart");
        assert_eq!(chart["data"][0]["type"], "bar");
        assert_eq!(chart["data"][0]["x"], json!(["a", "b"]));
        assert_eq!(chart["data"][0]["y"], json!([1, 2]));
        assert_eq!(chart["layout"]["title"], "T");
    }

    #[test]
    fn malformed_block_keeps_text_drops_chart() {
        let input = "Before <chart_spec>{not valid json</chart_spec> after";
        let (text, chart) = extract_chart(input);
        assert!(chart.is_none());
        assert_eq!(text, "Before  after");
    }

    #[test]
    fn block_spanning_lines_is_matched() {
        let input = "x<chart_spec>\n{\"chart_type\":\"pie\",\"x_axis\":[\"a\"],\"y_axis\":[1]}\n</chart_spec>y";
        let (text, chart) = extract_chart(input);
        assert_eq!(text, "xy");
        let chart = chart.unwrap();
        assert_eq!(chart["data"][0]["type"], "pie");
        assert_eq!(chart["data"][0]["labels"], json!(["a"]));
        assert_eq!(chart["data"][0]["values"], json!([1]));
    }

    #[test]
    fn line_chart_uses_scatter_with_markers() {
        let spec = ChartSpec {
            chart_type: "line".to_string(),
            title: "Trend".to_string(),
            x_axis: vec![json!("w1"), json!("w2")],
            y_axis: vec![json!(3), json!(7)],
        };
        let chart = build_chart(&spec).unwrap();
        assert_eq!(chart["data"][0]["type"], "scatter");
        assert_eq!(chart["data"][0]["mode"], "lines+markers");
    }

    #[test]
    fn unknown_chart_type_is_dropped() {
        let input = r#"<chart_spec>{"chart_type":"radar"}</chart_spec>"#;
        let (text, chart) = extract_chart(input);
        assert_eq!(text, "");
        assert!(chart.is_none());
    }

    #[test]
    fn empty_series_falls_back_to_defaults() {
        let input = r#"<chart_spec>{"chart_type":"bar","title":"Empty"}</chart_spec>"#;
        let (_, chart) = extract_chart(input);
        let chart = chart.unwrap();
        assert_eq!(chart["data"][0]["x"], json!(["Jan", "Feb", "Mar"]));
        assert_eq!(chart["data"][0]["y"], json!([10, 20, 15]));
    }

    #[test]
    fn missing_fields_use_spec_defaults() {
        let input = r#"<chart_spec>{}</chart_spec>"#;
        let (_, chart) = extract_chart(input);
        let chart = chart.unwrap();
        assert_eq!(chart["data"][0]["type"], "bar");
        assert_eq!(chart["layout"]["title"], "Chart");
    }
}
