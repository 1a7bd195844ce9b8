//! Log-based metric and monitoring data types

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Metric type prefix under which log-based metrics are exposed to monitoring
pub const USER_METRIC_PREFIX: &str = "logging.googleapis.com/user/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    Gauge,
    Delta,
    Cumulative,
    #[serde(other)]
    MetricKindUnspecified,
}

impl MetricKind {
    /// Map a catalog string, falling back to `Gauge` for anything unrecognized
    pub fn from_catalog(value: &str) -> Self {
        match value {
            "DELTA" => MetricKind::Delta,
            "CUMULATIVE" => MetricKind::Cumulative,
            _ => MetricKind::Gauge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int64,
    Double,
    Distribution,
    #[serde(other)]
    ValueTypeUnspecified,
}

impl ValueType {
    /// Map a catalog string, falling back to `Int64` for anything unrecognized
    pub fn from_catalog(value: &str) -> Self {
        match value {
            "DOUBLE" => ValueType::Double,
            "DISTRIBUTION" => ValueType::Distribution,
            _ => ValueType::Int64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetricDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_kind: Option<MetricKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

/// A log-based metric as accepted by the logging API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_extractor: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub label_extractors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_descriptor: Option<LogMetricDescriptor>,
}

/// A single log entry; only the fields the validator inspects are decoded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub log_name: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub json_payload: Option<serde_json::Value>,
    #[serde(default)]
    pub text_payload: Option<String>,
}

impl LogEntry {
    /// The `structuredData` object of a JSON payload, if present and non-empty
    pub fn structured_data(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.json_payload
            .as_ref()?
            .get("structuredData")?
            .as_object()
            .filter(|m| !m.is_empty())
    }
}

/// Monitoring metric descriptor; only the type is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub metric_type: String,
}

impl MetricDescriptor {
    /// Log metric name if this descriptor is a user-defined log-based metric
    pub fn user_metric_name(&self) -> Option<&str> {
        self.metric_type.strip_prefix(USER_METRIC_PREFIX)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub points: Vec<serde_json::Value>,
}

/// Half-open query window for time series reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// The window ending at `end` and spanning `span`
    pub fn ending_at(end: DateTime<Utc>, span: Duration) -> Self {
        Self {
            start: end - span,
            end,
        }
    }

    pub fn last_hour() -> Self {
        Self::ending_at(Utc::now(), Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_kind_fallbacks() {
        assert_eq!(MetricKind::from_catalog("DELTA"), MetricKind::Delta);
        assert_eq!(MetricKind::from_catalog("CUMULATIVE"), MetricKind::Cumulative);
        assert_eq!(MetricKind::from_catalog("bogus"), MetricKind::Gauge);
        assert_eq!(ValueType::from_catalog("DISTRIBUTION"), ValueType::Distribution);
        assert_eq!(ValueType::from_catalog("STRING"), ValueType::Int64);
    }

    #[test]
    fn test_log_metric_wire_shape() {
        let metric = LogMetric {
            name: "error_rate".to_string(),
            description: "Errors".to_string(),
            filter: "severity>=ERROR".to_string(),
            value_extractor: None,
            label_extractors: BTreeMap::new(),
            metric_descriptor: Some(LogMetricDescriptor {
                metric_kind: Some(MetricKind::Delta),
                value_type: Some(ValueType::Int64),
            }),
        };
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["metricDescriptor"]["metricKind"], "DELTA");
        assert_eq!(json["metricDescriptor"]["valueType"], "INT64");
        assert!(json.get("labelExtractors").is_none());
        assert!(json.get("valueExtractor").is_none());
    }

    #[test]
    fn test_structured_data_lookup() {
        let entry: LogEntry = serde_json::from_value(serde_json::json!({
            "logName": "projects/p/logs/cloudfunctions",
            "jsonPayload": {"structuredData": {"eventType": "upload"}}
        }))
        .unwrap();
        assert!(entry.structured_data().unwrap().contains_key("eventType"));

        let empty: LogEntry = serde_json::from_value(serde_json::json!({
            "jsonPayload": {"structuredData": {}}
        }))
        .unwrap();
        assert!(empty.structured_data().is_none());
    }

    #[test]
    fn test_user_metric_name() {
        let d = MetricDescriptor {
            name: String::new(),
            metric_type: "logging.googleapis.com/user/error_rate".to_string(),
        };
        assert_eq!(d.user_metric_name(), Some("error_rate"));
        let builtin = MetricDescriptor {
            name: String::new(),
            metric_type: "compute.googleapis.com/instance/cpu".to_string(),
        };
        assert_eq!(builtin.user_metric_name(), None);
    }

    #[test]
    fn test_interval_spans_one_hour() {
        let interval = TimeInterval::last_hour();
        assert_eq!(interval.end - interval.start, Duration::hours(1));
    }
}
