//! Monitoring dashboard definitions
//!
//! Only the parts of the widget tree that carry query filters are typed.
//! Everything else is kept in flattened maps so a layout loaded from disk is
//! submitted exactly as written.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::budget::last_segment;
use super::metric::USER_METRIC_PREFIX;

const METRIC_TYPE_MARKER: &str = "metric.type=";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Server-assigned resource name, empty before creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mosaic_layout: Option<MosaicLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dashboard_filters: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<i32>,
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_pos: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_pos: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default)]
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy_chart: Option<XyChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorecard: Option<Scorecard>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyChart {
    #[serde(default)]
    pub data_sets: Vec<DataSet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_query: Option<TimeSeriesQuery>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_query: Option<TimeSeriesQuery>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_filter: Option<TimeSeriesFilter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesFilter {
    #[serde(default)]
    pub filter: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeSeriesQuery {
    fn filter(&self) -> Option<&str> {
        self.time_series_filter.as_ref().map(|f| f.filter.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    XyChart,
    Scorecard,
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetKind::XyChart => write!(f, "xy_chart"),
            WidgetKind::Scorecard => write!(f, "scorecard"),
        }
    }
}

impl Widget {
    /// Kinds present on this widget; a malformed widget may carry both
    pub fn kinds(&self) -> Vec<WidgetKind> {
        let mut kinds = Vec::new();
        if self.xy_chart.is_some() {
            kinds.push(WidgetKind::XyChart);
        }
        if self.scorecard.is_some() {
            kinds.push(WidgetKind::Scorecard);
        }
        kinds
    }

    /// Query filter strings of every chart data set and the scorecard
    pub fn filters(&self) -> Vec<&str> {
        let mut filters: Vec<&str> = self
            .xy_chart
            .iter()
            .flat_map(|chart| chart.data_sets.iter())
            .filter_map(|ds| ds.time_series_query.as_ref()?.filter())
            .collect();

        if let Some(filter) = self
            .scorecard
            .as_ref()
            .and_then(|s| s.time_series_query.as_ref())
            .and_then(TimeSeriesQuery::filter)
        {
            filters.push(filter);
        }

        filters
    }
}

/// Tile and widget counts of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LayoutSummary {
    pub tiles: usize,
    pub charts: usize,
    pub scorecards: usize,
}

impl Dashboard {
    pub fn tiles(&self) -> &[Tile] {
        self.mosaic_layout
            .as_ref()
            .map(|l| l.tiles.as_slice())
            .unwrap_or_default()
    }

    /// Trailing id of the server-assigned resource name
    pub fn id(&self) -> &str {
        last_segment(&self.name)
    }

    pub fn summary(&self) -> LayoutSummary {
        let tiles = self.tiles();
        LayoutSummary {
            tiles: tiles.len(),
            charts: tiles.iter().filter(|t| t.widget.xy_chart.is_some()).count(),
            scorecards: tiles.iter().filter(|t| t.widget.scorecard.is_some()).count(),
        }
    }

    /// Every filter string in the layout, in tile order
    pub fn filters(&self) -> Vec<&str> {
        self.tiles().iter().flat_map(|t| t.widget.filters()).collect()
    }

    /// Names of log-based metrics referenced by any widget filter
    pub fn referenced_metrics(&self) -> BTreeSet<String> {
        self.filters()
            .into_iter()
            .filter_map(extract_user_metric)
            .collect()
    }
}

/// Extract a log-based metric name from a query filter.
///
/// Follows the `metric.type="logging.googleapis.com/user/<name>"` convention:
/// the text after the first `metric.type=` up to the next space, with
/// surrounding quotes trimmed. Filters written any other way (extra spaces
/// around `=`, `starts_with(...)`, single quotes) are not recognized.
pub fn extract_user_metric(filter: &str) -> Option<String> {
    let (_, rest) = filter.split_once(METRIC_TYPE_MARKER)?;
    let token = rest.split(' ').next().unwrap_or_default().trim_matches('"');
    token
        .strip_prefix(USER_METRIC_PREFIX)
        .map(|name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_layout() -> Dashboard {
        serde_json::from_value(json!({
            "displayName": "Acme Monitoring",
            "mosaicLayout": {
                "columns": 12,
                "tiles": [
                    {
                        "width": 6, "height": 4,
                        "widget": {
                            "title": "Latency",
                            "xyChart": {
                                "dataSets": [
                                    {"timeSeriesQuery": {"timeSeriesFilter": {
                                        "filter": "metric.type=\"logging.googleapis.com/user/generation_latency_ms\" resource.type=\"cloud_function\"",
                                        "aggregation": {"alignmentPeriod": "60s"}
                                    }}, "plotType": "LINE"},
                                    {"timeSeriesQuery": {"timeSeriesFilter": {
                                        "filter": "metric.type=\"logging.googleapis.com/user/vertex_ai_latency_ms\""
                                    }}}
                                ],
                                "yAxis": {"label": "ms"}
                            }
                        }
                    },
                    {
                        "xPos": 6, "width": 6, "height": 4,
                        "widget": {
                            "title": "Errors",
                            "scorecard": {
                                "timeSeriesQuery": {"timeSeriesFilter": {
                                    "filter": "metric.type=\"logging.googleapis.com/user/error_rate\""
                                }},
                                "sparkChartView": {"sparkChartType": "SPARK_LINE"}
                            }
                        }
                    },
                    {
                        "yPos": 4, "width": 12, "height": 2,
                        "widget": {"text": {"content": "notes"}}
                    }
                ]
            },
            "dashboardFilters": [{"labelKey": "function_name"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_user_metric_convention() {
        assert_eq!(
            extract_user_metric("metric.type=\"logging.googleapis.com/user/error_rate\""),
            Some("error_rate".to_string())
        );
        assert_eq!(
            extract_user_metric(
                "resource.type=\"cloud_function\" metric.type=\"logging.googleapis.com/user/a\" x"
            ),
            Some("a".to_string())
        );
        assert_eq!(
            extract_user_metric("metric.type=\"compute.googleapis.com/instance/cpu\""),
            None
        );
        assert_eq!(extract_user_metric("resource.type=\"gce_instance\""), None);
    }

    #[test]
    fn test_extract_does_not_handle_spaced_equals() {
        // Known limitation of the filter convention.
        assert_eq!(
            extract_user_metric("metric.type = \"logging.googleapis.com/user/error_rate\""),
            None
        );
    }

    #[test]
    fn test_referenced_metrics_across_widget_kinds() {
        let names = sample_layout().referenced_metrics();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["error_rate", "generation_latency_ms", "vertex_ai_latency_ms"]
        );
    }

    #[test]
    fn test_summary_counts_widget_types() {
        let summary = sample_layout().summary();
        assert_eq!(
            summary,
            LayoutSummary {
                tiles: 3,
                charts: 1,
                scorecards: 1
            }
        );
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let layout = sample_layout();
        let json = serde_json::to_value(&layout).unwrap();
        let tiles = &json["mosaicLayout"]["tiles"];
        assert_eq!(tiles[0]["widget"]["xyChart"]["yAxis"]["label"], "ms");
        assert_eq!(
            tiles[0]["widget"]["xyChart"]["dataSets"][0]["timeSeriesQuery"]["timeSeriesFilter"]
                ["aggregation"]["alignmentPeriod"],
            "60s"
        );
        assert_eq!(tiles[2]["widget"]["text"]["content"], "notes");
        assert_eq!(tiles[1]["xPos"], 6);
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_widget_kinds() {
        let layout = sample_layout();
        let tiles = layout.tiles();
        assert_eq!(tiles[0].widget.kinds(), vec![WidgetKind::XyChart]);
        assert_eq!(tiles[1].widget.kinds(), vec![WidgetKind::Scorecard]);
        assert!(tiles[2].widget.kinds().is_empty());
    }
}
