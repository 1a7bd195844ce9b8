//! Monitoring pipeline validation command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use monitor_lib::validation::{
    Category, CategoryResults, ValidationClients, ValidationReport, Validator,
};
use monitor_lib::{GcpClients, Settings};
use tabled::Tabled;

use crate::output::{
    color_status, pass_fail, print_failure, print_heading, print_info, print_section,
    print_success, print_table, print_warning,
};

/// Row for the category summary table
#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Success Rate")]
    success_rate: String,
    #[tabled(rename = "Passed")]
    passed: String,
}

/// Run every check, print the summary and optionally save the report.
///
/// Returns whether the overall status is PASS.
pub async fn validate(
    settings: &Settings,
    project_id: &str,
    report_file: Option<&Path>,
) -> Result<bool> {
    print_heading(&format!("{} Monitoring Validation", settings.app_name));
    println!("Project:                {}", project_id.cyan());
    println!();

    let clients = GcpClients::from_settings(settings)?;
    let validator = Validator::new(
        ValidationClients::from(&clients),
        project_id,
        settings.app_name.clone(),
        settings.metrics_config_path.clone(),
    );
    let results = validator.run().await;

    for category in Category::COMPONENTS
        .into_iter()
        .chain(std::iter::once(Category::Pipeline))
    {
        print_category(category, results.category(category));
    }

    let report = results.report(project_id, Utc::now());
    print_summary(&report);

    if let Some(path) = report_file {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!();
        print_info(&format!("Validation report saved to: {}", path.display()));
    }

    Ok(report.passed())
}

fn print_category(category: Category, results: &CategoryResults) {
    print_section(&format!("Testing {}", category.title()));
    for note in &results.notes {
        print_warning(note);
    }
    for test in &results.tests {
        if test.passed {
            print_success(&test.name);
        } else {
            print_failure(&test.name);
        }
        if !test.details.is_empty() {
            println!("   {} {}", "Details:".dimmed(), test.details);
        }
    }
    println!();
}

fn print_summary(report: &ValidationReport) {
    print_heading("Validation Summary");
    println!("Overall Status:         {}", pass_fail(report.passed()));
    println!("Success Rate:           {}", report.success_rate);
    println!(
        "Tests Passed:           {}/{}",
        report.passed_tests, report.total_tests
    );
    println!();

    let rows: Vec<CategoryRow> = Category::COMPONENTS
        .into_iter()
        .filter_map(|c| report.categories.get(c).map(|r| (c, r)))
        .chain(std::iter::once((Category::Pipeline, &report.pipeline)))
        .map(|(category, r)| CategoryRow {
            category: category.title(),
            status: color_status(&r.status.to_string()),
            success_rate: r.success_rate.clone(),
            passed: format!("{}/{}", r.passed, r.passed + r.failed),
        })
        .collect();
    print_table(&rows);
    println!();

    if report.passed() {
        print_success("Monitoring pipeline validation successful!");
    } else {
        print_warning("Monitoring pipeline needs attention.");
        println!("   Review failed tests and ensure all components are properly deployed.");
    }
}
