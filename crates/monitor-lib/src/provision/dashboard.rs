//! Dashboard provisioning
//!
//! Metric references in the layout are checked against the catalog before
//! submission, but unresolved references never block creation: the provider
//! accepts them and the affected charts render empty until the metric exists.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::MetricsCatalog;
use crate::error::CloudError;
use crate::gcp::DashboardApi;
use crate::models::{Dashboard, LayoutSummary};
use crate::observability::ProvisionLogger;

/// Referenced metric names that the catalog does not define, sorted and unique
pub fn unresolved_metric_references(dashboard: &Dashboard, catalog: &MetricsCatalog) -> Vec<String> {
    let defined: BTreeSet<&str> = catalog.names().into_iter().collect();
    dashboard
        .referenced_metrics()
        .into_iter()
        .filter(|name| !defined.contains(name.as_str()))
        .collect()
}

/// Run the reference check ahead of submission.
///
/// Returns `None` when there is no catalog, or an empty one, to check against.
pub fn check_metric_references(
    layout: &Dashboard,
    catalog: Option<&MetricsCatalog>,
    logger: &ProvisionLogger,
) -> Option<Vec<String>> {
    let unresolved = catalog
        .filter(|c| !c.is_empty())
        .map(|c| unresolved_metric_references(layout, c));

    for name in unresolved.iter().flatten() {
        logger.log_unresolved_metric(name);
    }
    unresolved
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub display_name: String,
    pub resource_name: String,
    pub dashboard_id: String,
    pub summary: LayoutSummary,
}

/// Create the dashboard from the layout
pub async fn provision_dashboard(
    client: &dyn DashboardApi,
    project_id: &str,
    layout: &Dashboard,
    logger: &ProvisionLogger,
) -> Result<DashboardReport, CloudError> {
    let submission = Dashboard {
        name: String::new(),
        ..layout.clone()
    };
    let created = client.create_dashboard(project_id, &submission).await?;
    let summary = layout.summary();
    logger.log_dashboard_created(&layout.display_name, &created.name, summary.tiles);

    Ok(DashboardReport {
        display_name: layout.display_name.clone(),
        dashboard_id: created.id().to_string(),
        resource_name: created.name,
        summary,
    })
}
