//! Dashboard commands

use anyhow::Result;
use colored::Colorize;
use monitor_lib::catalog::{load_dashboard_layout, load_metrics_catalog};
use monitor_lib::provision::{check_metric_references, provision_dashboard};
use monitor_lib::{GcpClients, MonitorError, ProvisionLogger, Settings};
use tabled::Tabled;

use super::console_url;
use crate::output::{
    print_bullet, print_heading, print_info, print_section, print_success, print_table,
    print_warning,
};

/// Row for the layout summary table
#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "Widget Type")]
    kind: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Create the dashboard described by the layout file
pub async fn create_dashboard(settings: &Settings, project_id: &str) -> Result<()> {
    let layout_path = &settings.dashboard_config_path;
    let catalog_path = &settings.metrics_config_path;

    print_heading(&format!("Monitoring Dashboard for {}", settings.app_name));
    println!("Project:                {}", project_id.cyan());
    println!("Dashboard Config:       {}", layout_path.display());
    println!("Metrics Config:         {}", catalog_path.display());
    println!();

    let layout = load_dashboard_layout(layout_path)?;
    print_success("Loaded dashboard configuration");

    let catalog = match load_metrics_catalog(catalog_path) {
        Ok(catalog) => {
            print_success("Loaded metrics configuration");
            Some(catalog)
        }
        Err(MonitorError::ConfigNotFound { path }) => {
            print_warning(&format!(
                "Metrics configuration file not found: {}",
                path.display()
            ));
            println!("    Skipping metric validation...");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let logger = ProvisionLogger::new(project_id);
    match check_metric_references(&layout, catalog.as_ref(), &logger) {
        Some(unresolved) if unresolved.is_empty() => {
            print_success("All metric references validated");
        }
        Some(unresolved) => {
            print_warning("Validation issues found:");
            for name in &unresolved {
                print_bullet(&format!("Metric '{}' referenced but not defined", name));
            }
            println!("   The dashboard may show empty charts until these metrics are available.");
        }
        None => {}
    }
    println!();

    let clients = GcpClients::from_settings(settings)?;

    print_info("Creating dashboard...");
    let report = provision_dashboard(&clients.dashboards, project_id, &layout, &logger).await?;

    print_success("Dashboard created successfully!");
    println!();

    print_section("Dashboard Details");
    println!("Name:                   {}", report.display_name);
    println!("ID:                     {}", report.dashboard_id.cyan());
    println!("Resource Name:          {}", report.resource_name);
    println!(
        "URL:                    {}",
        console_url(
            &format!("monitoring/dashboards/custom/{}", report.dashboard_id),
            project_id
        )
        .underline()
    );
    println!();

    print_section("Dashboard Layout");
    println!("Total widgets:          {}", report.summary.tiles);
    print_table(&[
        LayoutRow {
            kind: "Time series charts",
            count: report.summary.charts,
        },
        LayoutRow {
            kind: "Scorecards",
            count: report.summary.scorecards,
        },
    ]);
    println!();

    if catalog.map_or(true, |c| c.is_empty()) {
        print_warning("Note: Metrics need to be created first!");
        println!("   Run: gmon metrics {}", project_id);
    }

    Ok(())
}
