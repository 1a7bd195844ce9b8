//! Cloud Logging client: log-based metrics and log entry reads

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::transport::RestTransport;
use super::{LogEntriesApi, LogMetricsApi};
use crate::error::{CloudError, MonitorError};
use crate::models::{LogEntry, LogMetric};

/// Client for `logging.googleapis.com`
pub struct LoggingClient {
    transport: RestTransport,
    base_url: Url,
}

impl LoggingClient {
    pub fn new(transport: RestTransport, endpoint: &str) -> Result<Self, MonitorError> {
        Ok(Self {
            transport,
            base_url: RestTransport::base_url(endpoint)?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEntriesRequest<'a> {
    resource_names: Vec<String>,
    filter: &'a str,
    page_size: u32,
    order_by: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListEntriesResponse {
    #[serde(default)]
    entries: Vec<LogEntry>,
}

#[async_trait]
impl LogMetricsApi for LoggingClient {
    async fn create_log_metric(
        &self,
        project_id: &str,
        metric: &LogMetric,
    ) -> Result<LogMetric, CloudError> {
        let path = format!("v2/projects/{}/metrics", project_id);
        self.transport.post(&self.base_url, &path, metric).await
    }

    async fn update_log_metric(
        &self,
        project_id: &str,
        metric: &LogMetric,
    ) -> Result<LogMetric, CloudError> {
        let path = format!("v2/projects/{}/metrics/{}", project_id, metric.name);
        self.transport.put(&self.base_url, &path, metric).await
    }
}

#[async_trait]
impl LogEntriesApi for LoggingClient {
    async fn list_log_entries(
        &self,
        project_id: &str,
        filter: &str,
        page_size: u32,
    ) -> Result<Vec<LogEntry>, CloudError> {
        let request = ListEntriesRequest {
            resource_names: vec![format!("projects/{}", project_id)],
            filter,
            page_size,
            order_by: "timestamp desc",
        };
        let response: ListEntriesResponse = self
            .transport
            .post(&self.base_url, "v2/entries:list", &request)
            .await?;
        Ok(response.entries)
    }
}
