//! Cloud Monitoring clients: metric descriptors, time series and dashboards

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use url::Url;

use super::transport::{Page, RestTransport};
use super::{DashboardApi, MonitoringApi};
use crate::error::{CloudError, MonitorError};
use crate::models::{Dashboard, MetricDescriptor, TimeInterval, TimeSeries};

/// Client for the `monitoring.googleapis.com/v3` metric endpoints
pub struct MonitoringClient {
    transport: RestTransport,
    base_url: Url,
}

impl MonitoringClient {
    pub fn new(transport: RestTransport, endpoint: &str) -> Result<Self, MonitorError> {
        Ok(Self {
            transport,
            base_url: RestTransport::base_url(endpoint)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorPage {
    #[serde(default)]
    metric_descriptors: Vec<MetricDescriptor>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl Page for DescriptorPage {
    type Item = MetricDescriptor;

    fn into_parts(self) -> (Vec<MetricDescriptor>, Option<String>) {
        (self.metric_descriptors, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeSeriesResponse {
    #[serde(default)]
    time_series: Vec<TimeSeries>,
}

#[async_trait]
impl MonitoringApi for MonitoringClient {
    async fn list_metric_descriptors(
        &self,
        project_id: &str,
        filter: &str,
    ) -> Result<Vec<MetricDescriptor>, CloudError> {
        let path = format!("v3/projects/{}/metricDescriptors", project_id);
        let query = [("filter", filter.to_string())];
        self.transport
            .get_all::<DescriptorPage>(&self.base_url, &path, &query)
            .await
    }

    async fn list_time_series(
        &self,
        project_id: &str,
        filter: &str,
        interval: TimeInterval,
    ) -> Result<Vec<TimeSeries>, CloudError> {
        let path = format!("v3/projects/{}/timeSeries", project_id);
        let query = [
            ("filter", filter.to_string()),
            (
                "interval.startTime",
                interval.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "interval.endTime",
                interval.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        let response: TimeSeriesResponse = self.transport.get(&self.base_url, &path, &query).await?;
        Ok(response.time_series)
    }
}

/// Client for the `monitoring.googleapis.com/v1` dashboards endpoints
pub struct DashboardClient {
    transport: RestTransport,
    base_url: Url,
}

impl DashboardClient {
    pub fn new(transport: RestTransport, endpoint: &str) -> Result<Self, MonitorError> {
        Ok(Self {
            transport,
            base_url: RestTransport::base_url(endpoint)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardPage {
    #[serde(default)]
    dashboards: Vec<Dashboard>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl Page for DashboardPage {
    type Item = Dashboard;

    fn into_parts(self) -> (Vec<Dashboard>, Option<String>) {
        (self.dashboards, self.next_page_token)
    }
}

#[async_trait]
impl DashboardApi for DashboardClient {
    async fn create_dashboard(
        &self,
        project_id: &str,
        dashboard: &Dashboard,
    ) -> Result<Dashboard, CloudError> {
        let path = format!("v1/projects/{}/dashboards", project_id);
        self.transport.post(&self.base_url, &path, dashboard).await
    }

    async fn list_dashboards(&self, project_id: &str) -> Result<Vec<Dashboard>, CloudError> {
        let path = format!("v1/projects/{}/dashboards", project_id);
        self.transport
            .get_all::<DashboardPage>(&self.base_url, &path, &[])
            .await
    }
}
