//! Google Cloud management API clients
//!
//! Each service sits behind its own trait so the provisioners and the
//! validator take explicit client handles and can run against fakes.

mod billing;
mod logging;
mod monitoring;
mod transport;


pub use billing::{BillingClient, BudgetClient};
pub use logging::LoggingClient;
pub use monitoring::{DashboardClient, MonitoringClient};
pub use transport::{Page, RestTransport};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CloudError, MonitorError};
use crate::models::{
    BillingInfo, Budget, Dashboard, LogEntry, LogMetric, MetricDescriptor, TimeInterval,
    TimeSeries,
};
use crate::settings::Settings;

/// Project billing lookup
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn get_billing_info(&self, project_id: &str) -> Result<BillingInfo, CloudError>;
}

/// Billing budgets under a billing account
#[async_trait]
pub trait BudgetApi: Send + Sync {
    /// Create a budget under `billingAccounts/{billing_account}`
    async fn create_budget(&self, billing_account: &str, budget: &Budget)
        -> Result<Budget, CloudError>;

    async fn list_budgets(&self, billing_account: &str) -> Result<Vec<Budget>, CloudError>;
}

/// Log-based metric definitions
#[async_trait]
pub trait LogMetricsApi: Send + Sync {
    async fn create_log_metric(&self, project_id: &str, metric: &LogMetric)
        -> Result<LogMetric, CloudError>;

    /// Replace the metric whose name matches `metric.name`
    async fn update_log_metric(&self, project_id: &str, metric: &LogMetric)
        -> Result<LogMetric, CloudError>;
}

/// Log entry reads
#[async_trait]
pub trait LogEntriesApi: Send + Sync {
    async fn list_log_entries(
        &self,
        project_id: &str,
        filter: &str,
        page_size: u32,
    ) -> Result<Vec<LogEntry>, CloudError>;
}

/// Monitoring metric descriptors and time series
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    async fn list_metric_descriptors(
        &self,
        project_id: &str,
        filter: &str,
    ) -> Result<Vec<MetricDescriptor>, CloudError>;

    async fn list_time_series(
        &self,
        project_id: &str,
        filter: &str,
        interval: TimeInterval,
    ) -> Result<Vec<TimeSeries>, CloudError>;
}

/// Monitoring dashboards
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn create_dashboard(&self, project_id: &str, dashboard: &Dashboard)
        -> Result<Dashboard, CloudError>;

    async fn list_dashboards(&self, project_id: &str) -> Result<Vec<Dashboard>, CloudError>;
}

/// One client per service, built once per invocation
pub struct GcpClients {
    pub billing: BillingClient,
    pub budgets: BudgetClient,
    pub logging: LoggingClient,
    pub monitoring: MonitoringClient,
    pub dashboards: DashboardClient,
}

impl GcpClients {
    /// Build every client from settings; fails without an access token
    pub fn from_settings(settings: &Settings) -> Result<Self, MonitorError> {
        let token = settings.access_token.as_deref().ok_or_else(|| {
            MonitorError::ClientInit(
                "no access token configured (set GOOGLE_OAUTH_ACCESS_TOKEN or GMON_ACCESS_TOKEN)"
                    .to_string(),
            )
        })?;
        let timeout = settings.request_timeout_secs.map(Duration::from_secs);
        let transport = RestTransport::new(token, timeout)?;
        let endpoints = &settings.endpoints;

        Ok(Self {
            billing: BillingClient::new(transport.clone(), &endpoints.billing)?,
            budgets: BudgetClient::new(transport.clone(), &endpoints.budgets)?,
            logging: LoggingClient::new(transport.clone(), &endpoints.logging)?,
            monitoring: MonitoringClient::new(transport.clone(), &endpoints.monitoring)?,
            dashboards: DashboardClient::new(transport, &endpoints.monitoring)?,
        })
    }
}
