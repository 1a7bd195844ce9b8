//! Local configuration files: the metrics catalog and the dashboard layout
//!
//! Both are read from the working directory by default. A missing file is
//! reported as `ConfigNotFound` so callers can decide whether that is fatal.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::models::{Dashboard, LogMetric, LogMetricDescriptor, MetricKind, ValueType};

pub const DEFAULT_DASHBOARD_CONFIG: &str = "dashboard-config.json";
pub const DEFAULT_METRICS_CONFIG: &str = "log-metrics.yaml";

/// Descriptor hints as written in the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSpec {
    #[serde(default)]
    pub metric_kind: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
}

/// One metric entry of the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub value_extractor: Option<String>,
    #[serde(default)]
    pub label_extractors: BTreeMap<String, String>,
    #[serde(default)]
    pub metric_descriptor: Option<DescriptorSpec>,
}

impl MetricDefinition {
    pub fn to_log_metric(&self) -> LogMetric {
        let metric_descriptor = self.metric_descriptor.as_ref().map(|d| LogMetricDescriptor {
            metric_kind: d.metric_kind.as_deref().map(MetricKind::from_catalog),
            value_type: d.value_type.as_deref().map(ValueType::from_catalog),
        });

        LogMetric {
            name: self.name.clone(),
            description: self.description.clone(),
            filter: self.filter.clone(),
            value_extractor: self.value_extractor.clone(),
            label_extractors: self.label_extractors.clone(),
            metric_descriptor,
        }
    }
}

/// The metrics catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsCatalog {
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,
    /// Optional grouping of metric names for display
    #[serde(default)]
    pub dashboard_metrics: Option<BTreeMap<String, Vec<String>>>,
}

impl MetricsCatalog {
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => MonitorError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => MonitorError::Io(err),
    })
}

/// Load the YAML metrics catalog
pub fn load_metrics_catalog(path: &Path) -> Result<MetricsCatalog> {
    let content = read_config(path)?;
    serde_yaml::from_str(&content).map_err(|err| MonitorError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Load the JSON dashboard layout
pub fn load_dashboard_layout(path: &Path) -> Result<Dashboard> {
    let content = read_config(path)?;
    serde_json::from_str(&content).map_err(|err| MonitorError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
metrics:
  - name: generation_latency_ms
    description: Outfit generation latency
    filter: 'resource.type="cloud_function" AND jsonPayload.structuredData.eventType="generation_complete"'
    valueExtractor: EXTRACT(jsonPayload.structuredData.latencyMs)
    labelExtractors:
      function_name: EXTRACT(resource.labels.function_name)
    metricDescriptor:
      metricKind: DELTA
      valueType: DISTRIBUTION
      unit: ms
  - name: error_rate
    description: Errors
    filter: severity>=ERROR
dashboardMetrics:
  performance:
    - generation_latency_ms
  health:
    - error_rate
"#;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_metrics_catalog() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, DEFAULT_METRICS_CONFIG, CATALOG);

        let catalog = load_metrics_catalog(&path).unwrap();
        assert_eq!(catalog.names(), vec!["generation_latency_ms", "error_rate"]);
        assert_eq!(catalog.dashboard_metrics.as_ref().unwrap().len(), 2);

        let metric = catalog.metrics[0].to_log_metric();
        let descriptor = metric.metric_descriptor.unwrap();
        assert_eq!(descriptor.metric_kind, Some(MetricKind::Delta));
        assert_eq!(descriptor.value_type, Some(ValueType::Distribution));
        assert_eq!(
            metric.label_extractors.get("function_name").map(String::as_str),
            Some("EXTRACT(resource.labels.function_name)")
        );

        let plain = catalog.metrics[1].to_log_metric();
        assert!(plain.metric_descriptor.is_none());
        assert!(plain.value_extractor.is_none());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_metrics_catalog(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigNotFound { .. }));

        let err = load_dashboard_layout(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_malformed_files_are_parse_errors() {
        let dir = TempDir::new().unwrap();
        let yaml = write_file(&dir, "bad.yaml", "metrics: [name: {");
        assert!(matches!(
            load_metrics_catalog(&yaml).unwrap_err(),
            MonitorError::ConfigParse { .. }
        ));

        let json = write_file(&dir, "bad.json", "{\"displayName\": ");
        assert!(matches!(
            load_dashboard_layout(&json).unwrap_err(),
            MonitorError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_load_dashboard_layout() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            DEFAULT_DASHBOARD_CONFIG,
            r#"{"displayName": "Acme", "mosaicLayout": {"tiles": [{"widget": {"scorecard": {}}}]}}"#,
        );
        let layout = load_dashboard_layout(&path).unwrap();
        assert_eq!(layout.display_name, "Acme");
        assert_eq!(layout.summary().scorecards, 1);
    }
}
