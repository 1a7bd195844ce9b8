//! Log-based metric commands

use anyhow::Result;
use colored::Colorize;
use monitor_lib::catalog::load_metrics_catalog;
use monitor_lib::provision::{provision_log_metrics, MetricStatus};
use monitor_lib::{GcpClients, ProvisionLogger, Settings};
use tabled::Tabled;

use super::console_url;
use crate::output::{
    color_status, print_bullet, print_failure, print_heading, print_info, print_section,
    print_success, print_table, print_warning, title_case,
};

/// Row for the metric outcome table
#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Create or update every metric in the catalog
pub async fn create_metrics(settings: &Settings, project_id: &str) -> Result<()> {
    let catalog_path = &settings.metrics_config_path;

    print_heading(&format!("Log-Based Metrics for {}", settings.app_name));
    println!("Project:                {}", project_id.cyan());
    println!("Config:                 {}", catalog_path.display());
    println!();

    let catalog = load_metrics_catalog(catalog_path)?;
    let clients = GcpClients::from_settings(settings)?;
    let logger = ProvisionLogger::new(project_id);

    print_info(&format!(
        "Creating {} log-based metrics...",
        catalog.metrics.len()
    ));
    println!();

    let report = provision_log_metrics(&clients.logging, project_id, &catalog, &logger).await;

    for outcome in &report.outcomes {
        match &outcome.status {
            MetricStatus::Created => print_success(&format!("Created metric: {}", outcome.name)),
            MetricStatus::Updated => print_success(&format!(
                "Metric already exists, updated: {}",
                outcome.name
            )),
            MetricStatus::Failed(err) => {
                print_failure(&format!("Failed metric {}: {}", outcome.name, err))
            }
        }
    }
    println!();

    print_section("Summary");
    let rows: Vec<MetricRow> = report
        .outcomes
        .iter()
        .map(|o| MetricRow {
            name: o.name.clone(),
            status: match &o.status {
                MetricStatus::Created => color_status("created"),
                MetricStatus::Updated => color_status("updated"),
                MetricStatus::Failed(_) => color_status("failed"),
            },
        })
        .collect();
    print_table(&rows);
    println!(
        "Created:                {}",
        report.created().to_string().green()
    );
    println!(
        "Updated:                {}",
        report.updated().to_string().green()
    );
    if report.failed() > 0 {
        println!("Failed:                 {}", report.failed().to_string().red());
    }
    println!();

    print_section("View metrics in Cloud Console");
    println!("   {}", console_url("logs/metrics", project_id).underline());
    println!();

    print_section("Created metrics for monitoring");
    for metric in &catalog.metrics {
        print_bullet(&format!("{}: {}", metric.name, metric.description));
    }

    if let Some(groups) = &catalog.dashboard_metrics {
        println!();
        print_section("Dashboard metric categories");
        for (category, names) in groups {
            println!("   {}:", title_case(category));
            for name in names {
                println!("     - {}", name);
            }
        }
    }

    if report.failed() > 0 {
        println!();
        print_warning("Some metrics failed; rerun after fixing the errors above");
    }

    Ok(())
}
