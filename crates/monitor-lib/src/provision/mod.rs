//! Provisioners for budgets, dashboards and log-based metrics
//!
//! Each provisioner is a single pass over its inputs with explicit client
//! handles. Partial failures are returned in the report, not raised.

pub mod budgets;
pub mod dashboard;
pub mod log_metrics;

pub use budgets::{
    create_budgets, provision_budgets, resolve_billing_account, BudgetOutcome, BudgetPlan,
    BudgetReport,
};
pub use dashboard::{
    check_metric_references, provision_dashboard, unresolved_metric_references, DashboardReport,
};
pub use log_metrics::{provision_log_metrics, MetricOutcome, MetricStatus, MetricsReport};
