//! Scripted in-memory stand-in for every cloud client trait

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CloudError;
use crate::gcp::{
    BillingApi, BudgetApi, DashboardApi, LogEntriesApi, LogMetricsApi, MonitoringApi,
};
use crate::models::{
    BillingInfo, Budget, Dashboard, LogEntry, LogMetric, MetricDescriptor, TimeInterval,
    TimeSeries,
};

/// A recorded client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBillingInfo(String),
    CreateBudget(String),
    ListBudgets(String),
    CreateMetric(String),
    UpdateMetric(String),
    ListEntries(String),
    ListDescriptors,
    ListTimeSeries(String),
    CreateDashboard(String),
    ListDashboards,
}

pub struct FakeCloud {
    pub billing_info: Result<BillingInfo, CloudError>,
    /// Budget creation failures keyed by display name
    pub budget_failures: HashMap<String, CloudError>,
    pub budgets: Result<Vec<Budget>, CloudError>,
    /// Metric creation failures keyed by metric name
    pub create_metric_errors: HashMap<String, CloudError>,
    pub update_metric_errors: HashMap<String, CloudError>,
    pub log_entries: Result<Vec<LogEntry>, CloudError>,
    pub descriptors: Result<Vec<MetricDescriptor>, CloudError>,
    pub time_series: Result<Vec<TimeSeries>, CloudError>,
    pub dashboards: Result<Vec<Dashboard>, CloudError>,
    pub create_dashboard_error: Option<CloudError>,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self {
            billing_info: Ok(BillingInfo {
                name: "projects/acme-prod/billingInfo".to_string(),
                project_id: "acme-prod".to_string(),
                billing_account_name: "billingAccounts/ACC-1".to_string(),
                billing_enabled: true,
            }),
            budget_failures: HashMap::new(),
            budgets: Ok(Vec::new()),
            create_metric_errors: HashMap::new(),
            update_metric_errors: HashMap::new(),
            log_entries: Ok(Vec::new()),
            descriptors: Ok(Vec::new()),
            time_series: Ok(Vec::new()),
            dashboards: Ok(Vec::new()),
            create_dashboard_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCloud {
    pub fn billing_disabled() -> Self {
        Self {
            billing_info: Ok(BillingInfo {
                billing_enabled: false,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl BillingApi for FakeCloud {
    async fn get_billing_info(&self, project_id: &str) -> Result<BillingInfo, CloudError> {
        self.record(Call::GetBillingInfo(project_id.to_string()));
        self.billing_info.clone()
    }
}

#[async_trait]
impl BudgetApi for FakeCloud {
    async fn create_budget(
        &self,
        billing_account: &str,
        budget: &Budget,
    ) -> Result<Budget, CloudError> {
        self.record(Call::CreateBudget(budget.display_name.clone()));
        if let Some(err) = self.budget_failures.get(&budget.display_name) {
            return Err(err.clone());
        }
        let mut created = budget.clone();
        created.name = format!(
            "billingAccounts/{}/budgets/{}",
            billing_account,
            self.count(|c| matches!(c, Call::CreateBudget(_)))
        );
        Ok(created)
    }

    async fn list_budgets(&self, billing_account: &str) -> Result<Vec<Budget>, CloudError> {
        self.record(Call::ListBudgets(billing_account.to_string()));
        self.budgets.clone()
    }
}

#[async_trait]
impl LogMetricsApi for FakeCloud {
    async fn create_log_metric(
        &self,
        _project_id: &str,
        metric: &LogMetric,
    ) -> Result<LogMetric, CloudError> {
        self.record(Call::CreateMetric(metric.name.clone()));
        match self.create_metric_errors.get(&metric.name) {
            Some(err) => Err(err.clone()),
            None => Ok(metric.clone()),
        }
    }

    async fn update_log_metric(
        &self,
        _project_id: &str,
        metric: &LogMetric,
    ) -> Result<LogMetric, CloudError> {
        self.record(Call::UpdateMetric(metric.name.clone()));
        match self.update_metric_errors.get(&metric.name) {
            Some(err) => Err(err.clone()),
            None => Ok(metric.clone()),
        }
    }
}

#[async_trait]
impl LogEntriesApi for FakeCloud {
    async fn list_log_entries(
        &self,
        _project_id: &str,
        filter: &str,
        _page_size: u32,
    ) -> Result<Vec<LogEntry>, CloudError> {
        self.record(Call::ListEntries(filter.to_string()));
        self.log_entries.clone()
    }
}

#[async_trait]
impl MonitoringApi for FakeCloud {
    async fn list_metric_descriptors(
        &self,
        _project_id: &str,
        _filter: &str,
    ) -> Result<Vec<MetricDescriptor>, CloudError> {
        self.record(Call::ListDescriptors);
        self.descriptors.clone()
    }

    async fn list_time_series(
        &self,
        _project_id: &str,
        filter: &str,
        _interval: TimeInterval,
    ) -> Result<Vec<TimeSeries>, CloudError> {
        self.record(Call::ListTimeSeries(filter.to_string()));
        self.time_series.clone()
    }
}

#[async_trait]
impl DashboardApi for FakeCloud {
    async fn create_dashboard(
        &self,
        project_id: &str,
        dashboard: &Dashboard,
    ) -> Result<Dashboard, CloudError> {
        self.record(Call::CreateDashboard(dashboard.display_name.clone()));
        if let Some(err) = &self.create_dashboard_error {
            return Err(err.clone());
        }
        let mut created = dashboard.clone();
        created.name = format!("projects/{}/dashboards/dash-1", project_id);
        Ok(created)
    }

    async fn list_dashboards(&self, _project_id: &str) -> Result<Vec<Dashboard>, CloudError> {
        self.record(Call::ListDashboards);
        self.dashboards.clone()
    }
}
