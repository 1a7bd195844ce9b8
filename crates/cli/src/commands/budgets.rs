//! Budget alert commands

use anyhow::Result;
use colored::Colorize;
use monitor_lib::models::{DEFAULT_SERVICES, THRESHOLD_PERCENTS};
use monitor_lib::provision::{provision_budgets, BudgetPlan, BudgetReport};
use monitor_lib::{GcpClients, ProvisionLogger, Settings};
use tabled::Tabled;

use super::console_url;
use crate::output::{
    color_status, format_currency, format_percent, print_bullet, print_failure, print_heading,
    print_info, print_section, print_success, print_table,
};

/// Flags of the `budgets` subcommand
pub struct BudgetArgs {
    pub daily_budget: i64,
    pub monthly_budget: i64,
    pub email: Option<String>,
    pub services: Vec<String>,
    pub notification_channels: Vec<String>,
}

/// Row for the budget summary table
#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Budget")]
    display_name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID / Error")]
    detail: String,
}

/// Create the three budget alerts for a project
pub async fn create_budgets(settings: &Settings, project_id: &str, args: BudgetArgs) -> Result<()> {
    let currency = settings.currency.as_str();

    print_heading(&format!("Budget Alerts for {}", settings.app_name));
    println!("Project:                {}", project_id.cyan());
    println!(
        "Daily Budget:           {}",
        format_currency(args.daily_budget, currency)
    );
    println!(
        "Monthly Budget:         {}",
        format_currency(args.monthly_budget, currency)
    );
    if let Some(email) = &args.email {
        println!("Email Notifications:    {}", email);
    }
    println!();

    let clients = GcpClients::from_settings(settings)?;
    let logger = ProvisionLogger::new(project_id);
    let plan = BudgetPlan {
        app_name: settings.app_name.clone(),
        currency: currency.to_string(),
        daily_units: args.daily_budget,
        monthly_units: args.monthly_budget,
        services: (!args.services.is_empty()).then(|| args.services.clone()),
        notification_channels: args.notification_channels.clone(),
    };

    print_info("Getting billing account information...");
    let report = provision_budgets(
        &clients.billing,
        &clients.budgets,
        project_id,
        &plan,
        &logger,
    )
    .await?;
    print_success(&format!("Found billing account: {}", report.billing_account));
    println!();

    print_outcomes(&report, currency);

    if report.created() > 0 {
        print_configuration(&plan, project_id);
    }

    if let Some(email) = &args.email {
        print_section("Email Notification Setup");
        print_email_instructions(email);
    }

    Ok(())
}

fn print_outcomes(report: &BudgetReport, currency: &str) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(id) => print_success(&format!(
                "Created {} budget: {}",
                outcome.kind.label().to_lowercase(),
                id
            )),
            Err(err) => print_failure(&format!(
                "Failed to create {} budget: {}",
                outcome.kind.label().to_lowercase(),
                err
            )),
        }
    }
    println!();

    print_section("Budget Creation Summary");
    let rows: Vec<BudgetRow> = report
        .outcomes
        .iter()
        .map(|o| BudgetRow {
            display_name: o.display_name.clone(),
            amount: format_currency(o.units, currency),
            status: match &o.result {
                Ok(_) => color_status("created"),
                Err(_) => color_status("failed"),
            },
            detail: match &o.result {
                Ok(id) => id.clone(),
                Err(err) => err.to_string(),
            },
        })
        .collect();
    print_table(&rows);
    println!(
        "Successfully created:   {} of {} budgets",
        report.created().to_string().green().bold(),
        report.outcomes.len()
    );
    println!();
}

fn print_configuration(plan: &BudgetPlan, project_id: &str) {
    print_section("Budget Alert Configuration");
    let thresholds: Vec<String> = THRESHOLD_PERCENTS.iter().map(|t| format_percent(*t)).collect();
    print_bullet(&format!("Threshold alerts at: {}", thresholds.join(", ")));
    print_bullet("Based on current spend (not forecasted)");
    if plan.notification_channels.is_empty() {
        print_bullet("Notifications sent to project billing administrators");
    } else {
        print_bullet(&format!(
            "Notifications sent to billing administrators and {} channel(s)",
            plan.notification_channels.len()
        ));
    }
    println!();

    print_section("Services Monitored");
    match &plan.services {
        Some(services) => services.iter().for_each(|s| print_bullet(s)),
        None => DEFAULT_SERVICES.iter().for_each(|s| print_bullet(s)),
    }
    println!();

    print_section("View and Manage Budgets");
    println!("   {}", console_url("billing/budgets", project_id).underline());
    println!();
}

fn print_email_instructions(email: &str) {
    println!("To create an email notification channel manually:");
    println!();
    println!("1. Go to Cloud Console Monitoring");
    println!("2. Navigate to Alerting > Notification Channels");
    println!("3. Click \"ADD NEW\" and select \"Email\"");
    println!("4. Enter email: {}", email);
    println!("5. Pass the channel resource name with --notification-channel");
}
