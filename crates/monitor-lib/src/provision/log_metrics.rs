//! Log-based metric provisioning
//!
//! Each catalog entry is created; a create conflict is redirected to an
//! update of the existing metric. Only a failed update, or any other create
//! failure, counts as a failure. Processing always continues to the next
//! metric.

use serde::Serialize;

use crate::catalog::MetricsCatalog;
use crate::error::CloudError;
use crate::gcp::LogMetricsApi;
use crate::models::LogMetric;
use crate::observability::ProvisionLogger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum MetricStatus {
    Created,
    Updated,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricOutcome {
    pub name: String,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub outcomes: Vec<MetricOutcome>,
}

impl MetricsReport {
    fn count(&self, pred: impl Fn(&MetricStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|s| *s == MetricStatus::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(|s| *s == MetricStatus::Updated)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, MetricStatus::Failed(_)))
    }

    /// Created plus updated
    pub fn successful(&self) -> usize {
        self.created() + self.updated()
    }
}

async fn apply_metric(
    client: &dyn LogMetricsApi,
    project_id: &str,
    metric: &LogMetric,
    logger: &ProvisionLogger,
) -> Result<MetricStatus, CloudError> {
    match client.create_log_metric(project_id, metric).await {
        Ok(_) => {
            logger.log_metric_created(&metric.name);
            Ok(MetricStatus::Created)
        }
        Err(err) if err.is_already_exists() => {
            logger.log_metric_exists(&metric.name);
            client.update_log_metric(project_id, metric).await?;
            logger.log_metric_updated(&metric.name);
            Ok(MetricStatus::Updated)
        }
        Err(err) => Err(err),
    }
}

/// Create or update every metric of the catalog
pub async fn provision_log_metrics(
    client: &dyn LogMetricsApi,
    project_id: &str,
    catalog: &MetricsCatalog,
    logger: &ProvisionLogger,
) -> MetricsReport {
    let mut report = MetricsReport::default();

    for definition in &catalog.metrics {
        let metric = definition.to_log_metric();
        let status = match apply_metric(client, project_id, &metric, logger).await {
            Ok(status) => status,
            Err(err) => {
                logger.log_metric_failed(&metric.name, &err);
                MetricStatus::Failed(err.to_string())
            }
        };

        report.outcomes.push(MetricOutcome {
            name: metric.name,
            status,
        });
    }

    report
}
