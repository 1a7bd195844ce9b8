//! The four read-only check groups and the derived completeness check

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::catalog::load_metrics_catalog;
use crate::error::MonitorError;
use crate::gcp::{
    BillingApi, BudgetApi, DashboardApi, GcpClients, LogEntriesApi, MonitoringApi,
};
use crate::models::{TimeInterval, USER_METRIC_PREFIX};
use crate::observability::ProvisionLogger;

use super::{Category, ValidationResults, MIN_WORKING_COMPONENTS};

/// Log query selecting structured Cloud Functions entries
pub const STRUCTURED_LOG_FILTER: &str =
    "resource.type=\"cloud_function\" AND jsonPayload.structuredData.eventType:*";

/// Fields every structured payload must carry
pub const REQUIRED_LOG_FIELDS: [&str; 3] = ["eventType", "timestamp", "functionName"];

/// Expected metrics when the catalog file is unavailable
pub const FALLBACK_EXPECTED_METRICS: [&str; 7] = [
    "session_creation_rate",
    "generation_requests_total",
    "generation_success_rate",
    "generation_latency_ms",
    "vertex_ai_latency_ms",
    "feedback_ratings",
    "error_rate",
];

const USER_METRIC_DESCRIPTOR_FILTER: &str =
    "metric.type = starts_with(\"logging.googleapis.com/user/\")";
const LOG_SAMPLE_SIZE: u32 = 10;
const MISSING_METRICS_SHOWN: usize = 5;

/// Client handles used by the validator
#[derive(Clone, Copy)]
pub struct ValidationClients<'a> {
    pub billing: &'a dyn BillingApi,
    pub budgets: &'a dyn BudgetApi,
    pub log_entries: &'a dyn LogEntriesApi,
    pub monitoring: &'a dyn MonitoringApi,
    pub dashboards: &'a dyn DashboardApi,
}

impl<'a> From<&'a GcpClients> for ValidationClients<'a> {
    fn from(clients: &'a GcpClients) -> Self {
        Self {
            billing: &clients.billing,
            budgets: &clients.budgets,
            log_entries: &clients.logging,
            monitoring: &clients.monitoring,
            dashboards: &clients.dashboards,
        }
    }
}

/// Metric names expected by the catalog, or the fallback list with a warning
/// when the catalog cannot be read
pub fn expected_metric_names(path: &Path) -> (Vec<String>, Option<String>) {
    let fallback = || {
        FALLBACK_EXPECTED_METRICS
            .iter()
            .map(|s| s.to_string())
            .collect()
    };

    match load_metrics_catalog(path) {
        Ok(catalog) => (
            catalog.names().into_iter().map(String::from).collect(),
            None,
        ),
        Err(MonitorError::ConfigNotFound { .. }) => (
            fallback(),
            Some(format!(
                "{} not found, using default metric list",
                path.display()
            )),
        ),
        Err(err) => (
            fallback(),
            Some(format!("{}, using default metric list", err)),
        ),
    }
}

/// Runs the validation checks against one project
pub struct Validator<'a> {
    clients: ValidationClients<'a>,
    project_id: String,
    app_name: String,
    metrics_config_path: PathBuf,
    logger: ProvisionLogger,
    pub(super) results: ValidationResults,
}

impl<'a> Validator<'a> {
    pub fn new(
        clients: ValidationClients<'a>,
        project_id: impl Into<String>,
        app_name: impl Into<String>,
        metrics_config_path: impl Into<PathBuf>,
    ) -> Self {
        let project_id = project_id.into();
        Self {
            clients,
            logger: ProvisionLogger::new(project_id.clone()),
            project_id,
            app_name: app_name.into(),
            metrics_config_path: metrics_config_path.into(),
            results: ValidationResults::new(),
        }
    }

    pub fn results(&self) -> &ValidationResults {
        &self.results
    }

    pub fn into_results(self) -> ValidationResults {
        self.results
    }

    fn record(&mut self, category: Category, name: &str, passed: bool, details: String) {
        self.logger
            .log_test_result(category.key(), name, passed, &details);
        self.results.record(category, name, passed, details);
    }

    /// Run one category's checks
    pub async fn run_category(&mut self, category: Category) {
        match category {
            Category::StructuredLogging => self.check_structured_logging().await,
            Category::LogMetrics => self.check_log_metrics().await,
            Category::Dashboard => self.check_dashboard().await,
            Category::Budgets => self.check_budgets().await,
            Category::Pipeline => self.check_pipeline_completeness(),
        }
    }

    /// Run every category in order and return the results
    pub async fn run(mut self) -> ValidationResults {
        for category in Category::COMPONENTS {
            self.run_category(category).await;
        }
        self.check_pipeline_completeness();
        self.results
    }

    pub async fn check_structured_logging(&mut self) {
        let category = Category::StructuredLogging;
        let entries = match self
            .clients
            .log_entries
            .list_log_entries(&self.project_id, STRUCTURED_LOG_FILTER, LOG_SAMPLE_SIZE)
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                self.record(
                    category,
                    "Structured logging access",
                    false,
                    format!("Error accessing logs: {}", err),
                );
                return;
            }
        };

        let Some(sample) = entries.first() else {
            self.record(
                category,
                "Structured logs present",
                false,
                "No structured logs found. Deploy Cloud Functions first.".to_string(),
            );
            return;
        };

        let structure = sample.structured_data().map(|data| {
            REQUIRED_LOG_FIELDS
                .iter()
                .filter(|field| !data.contains_key(**field))
                .copied()
                .collect::<Vec<_>>()
        });

        self.record(
            category,
            "Structured logs present",
            true,
            format!("Found {} structured log entries", entries.len()),
        );

        match structure {
            Some(missing) if missing.is_empty() => self.record(
                category,
                "Log structure validation",
                true,
                format!("All required fields present: {:?}", REQUIRED_LOG_FIELDS),
            ),
            Some(missing) => self.record(
                category,
                "Log structure validation",
                false,
                format!("Missing fields: {:?}", missing),
            ),
            None => self.record(
                category,
                "Log structure validation",
                false,
                "No structured data found in log payload".to_string(),
            ),
        }
    }

    pub async fn check_log_metrics(&mut self) {
        let category = Category::LogMetrics;
        let (expected, warning) = expected_metric_names(&self.metrics_config_path);
        if let Some(warning) = warning {
            self.results.note(category, warning);
        }

        let descriptors = match self
            .clients
            .monitoring
            .list_metric_descriptors(&self.project_id, USER_METRIC_DESCRIPTOR_FILTER)
            .await
        {
            Ok(descriptors) => descriptors,
            Err(err) => {
                self.record(
                    category,
                    "Log metrics access",
                    false,
                    format!("Error accessing metrics: {}", err),
                );
                return;
            }
        };

        let present: BTreeSet<&str> = descriptors
            .iter()
            .filter_map(|d| d.user_metric_name())
            .collect();
        let (found, missing): (Vec<&String>, Vec<&String>) = expected
            .iter()
            .partition(|name| present.contains(name.as_str()));

        self.record(
            category,
            "Log metrics existence",
            !found.is_empty(),
            format!("Found: {}, Missing: {}", found.len(), missing.len()),
        );

        if !missing.is_empty() {
            let shown: Vec<&str> = missing
                .iter()
                .take(MISSING_METRICS_SHOWN)
                .map(|s| s.as_str())
                .collect();
            self.results
                .note(category, format!("Missing metrics: {}", shown.join(", ")));
            if missing.len() > MISSING_METRICS_SHOWN {
                self.results.note(
                    category,
                    format!("... and {} more", missing.len() - MISSING_METRICS_SHOWN),
                );
            }
        }

        let Some(first) = found.first().map(|s| s.to_string()) else {
            return;
        };

        let filter = format!("metric.type=\"{}{}\"", USER_METRIC_PREFIX, first);
        match self
            .clients
            .monitoring
            .list_time_series(&self.project_id, &filter, TimeInterval::last_hour())
            .await
        {
            Ok(series) => {
                let has_points = series.iter().any(|s| !s.points.is_empty());
                self.record(
                    category,
                    "Metric data availability",
                    has_points,
                    format!("Found {} time series for {}", series.len(), first),
                );
            }
            Err(err) => self.record(
                category,
                "Metric data query",
                false,
                format!("Error querying metric data: {}", err),
            ),
        }
    }

    pub async fn check_dashboard(&mut self) {
        let category = Category::Dashboard;
        let dashboards = match self.clients.dashboards.list_dashboards(&self.project_id).await {
            Ok(dashboards) => dashboards,
            Err(err) => {
                self.record(
                    category,
                    "Dashboard access",
                    false,
                    format!("Error accessing dashboard: {}", err),
                );
                return;
            }
        };

        let matching: Vec<_> = dashboards
            .into_iter()
            .filter(|d| d.display_name.contains(&self.app_name))
            .collect();

        self.record(
            category,
            "Dashboard existence",
            !matching.is_empty(),
            format!("Found {} {} dashboard(s)", matching.len(), self.app_name),
        );

        let Some(dashboard) = matching.first() else {
            return;
        };

        if dashboard.mosaic_layout.is_none() {
            self.record(
                category,
                "Dashboard layout validation",
                false,
                "Dashboard has no mosaic layout".to_string(),
            );
            return;
        }

        let kinds: Vec<_> = dashboard
            .tiles()
            .iter()
            .flat_map(|t| t.widget.kinds())
            .collect();
        let distinct: BTreeSet<String> = kinds.iter().map(|k| k.to_string()).collect();
        self.record(
            category,
            "Dashboard widget configuration",
            !kinds.is_empty(),
            format!(
                "Found {} widgets: {{{}}}",
                kinds.len(),
                distinct.into_iter().collect::<Vec<_>>().join(", ")
            ),
        );

        let references = dashboard
            .filters()
            .into_iter()
            .filter(|f| f.contains(USER_METRIC_PREFIX))
            .count();
        self.record(
            category,
            "Dashboard metric references",
            references > 0,
            format!("Found {} metric references", references),
        );
    }

    pub async fn check_budgets(&mut self) {
        let category = Category::Budgets;
        let info = match self.clients.billing.get_billing_info(&self.project_id).await {
            Ok(info) => info,
            Err(err) => {
                self.record(
                    category,
                    "Billing API access",
                    false,
                    format!("Error accessing billing API: {}", err),
                );
                return;
            }
        };

        if !info.billing_enabled || info.billing_account_name.is_empty() {
            self.record(
                category,
                "Billing enabled",
                false,
                "Billing is not enabled for this project".to_string(),
            );
            return;
        }
        self.record(
            category,
            "Billing enabled",
            true,
            "Project has billing enabled".to_string(),
        );

        let budgets = match self.clients.budgets.list_budgets(info.account_id()).await {
            Ok(budgets) => budgets,
            Err(err) => {
                self.record(
                    category,
                    "Budget alerts access",
                    false,
                    format!("Error accessing budgets: {}", err),
                );
                return;
            }
        };

        let matching: Vec<_> = budgets
            .into_iter()
            .filter(|b| b.display_name.contains(&self.app_name))
            .collect();

        self.record(
            category,
            "Budget alerts existence",
            !matching.is_empty(),
            format!("Found {} {} budget(s)", matching.len(), self.app_name),
        );

        for budget in &matching {
            let thresholds = budget.threshold_rules.len();
            self.record(
                category,
                &format!("Budget threshold configuration - {}", budget.display_name),
                thresholds >= 4,
                format!("Has {} threshold rules", thresholds),
            );
        }
    }

    /// Passes when enough component categories have at least one passing test
    pub fn check_pipeline_completeness(&mut self) {
        let working = self.results.working_components();
        let names: Vec<&str> = working.iter().map(|c| c.component()).collect();
        self.record(
            Category::Pipeline,
            "Monitoring pipeline completeness",
            working.len() >= MIN_WORKING_COMPONENTS,
            format!("Working components: {}", names.join(", ")),
        );
    }
}
