//! Observability infrastructure for the provisioning tools
//!
//! Provides:
//! - tracing subscriber setup (human text or JSON on stderr)
//! - Structured events for every submission, fallback and failure

use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::CloudError;
use crate::models::BudgetKind;

/// Diagnostic log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` and the
/// default is `warn` so the human summary on stdout stays readable.
pub fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        debug!("tracing subscriber already installed");
    }
}

/// Structured logger for provisioning and validation events
#[derive(Clone)]
pub struct ProvisionLogger {
    project_id: String,
}

impl ProvisionLogger {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn log_budget_created(&self, kind: BudgetKind, display_name: &str, resource_name: &str) {
        info!(
            event = "budget_created",
            project = %self.project_id,
            budget_kind = %kind,
            display_name = %display_name,
            resource_name = %resource_name,
            "Created budget"
        );
    }

    pub fn log_budget_failed(&self, kind: BudgetKind, display_name: &str, err: &CloudError) {
        error!(
            event = "budget_failed",
            project = %self.project_id,
            budget_kind = %kind,
            display_name = %display_name,
            error_kind = %err.kind,
            error = %err.message,
            "Failed to create budget"
        );
    }

    pub fn log_metric_created(&self, metric: &str) {
        info!(
            event = "metric_created",
            project = %self.project_id,
            metric = %metric,
            "Created log metric"
        );
    }

    pub fn log_metric_exists(&self, metric: &str) {
        warn!(
            event = "metric_exists",
            project = %self.project_id,
            metric = %metric,
            "Log metric already exists, updating"
        );
    }

    pub fn log_metric_updated(&self, metric: &str) {
        info!(
            event = "metric_updated",
            project = %self.project_id,
            metric = %metric,
            "Updated log metric"
        );
    }

    pub fn log_metric_failed(&self, metric: &str, err: &CloudError) {
        error!(
            event = "metric_failed",
            project = %self.project_id,
            metric = %metric,
            error_kind = %err.kind,
            error = %err.message,
            "Failed to create or update log metric"
        );
    }

    pub fn log_unresolved_metric(&self, metric: &str) {
        warn!(
            event = "dashboard_unresolved_metric",
            project = %self.project_id,
            metric = %metric,
            "Dashboard references undefined metric"
        );
    }

    pub fn log_dashboard_created(&self, display_name: &str, resource_name: &str, tiles: usize) {
        info!(
            event = "dashboard_created",
            project = %self.project_id,
            display_name = %display_name,
            resource_name = %resource_name,
            tiles = tiles,
            "Created dashboard"
        );
    }

    pub fn log_test_result(&self, category: &str, test: &str, passed: bool, details: &str) {
        if passed {
            debug!(
                event = "validation_test",
                project = %self.project_id,
                category = %category,
                test = %test,
                passed = passed,
                details = %details,
                "Validation test passed"
            );
        } else {
            warn!(
                event = "validation_test",
                project = %self.project_id,
                category = %category,
                test = %test,
                passed = passed,
                details = %details,
                "Validation test failed"
            );
        }
    }
}
