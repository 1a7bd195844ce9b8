//! Google Cloud monitoring CLI
//!
//! Provisions budget alerts, a monitoring dashboard and log-based metrics
//! for one application, and validates that the monitoring pipeline works
//! end to end.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{budgets, dashboard, metrics, validate};
use monitor_lib::{init_tracing, Settings};

/// Google Cloud monitoring CLI
#[derive(Parser)]
#[command(name = "gmon")]
#[command(author, version, about = "Provision and validate Google Cloud monitoring", long_about = None)]
pub struct Cli {
    /// OAuth access token (can also be set via GOOGLE_OAUTH_ACCESS_TOKEN env var)
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Application name used in display names and for matching resources
    #[arg(long, global = true)]
    pub app_name: Option<String>,

    /// Diagnostic log format (written to stderr)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: output::LogFormatArg,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create daily, monthly and Vertex AI budget alerts
    Budgets {
        /// GCP project ID
        project_id: String,

        /// Daily budget in whole currency units
        #[arg(long, default_value_t = 50)]
        daily_budget: i64,

        /// Monthly budget in whole currency units
        #[arg(long, default_value_t = 1500)]
        monthly_budget: i64,

        /// Email address for notifications (prints channel setup instructions)
        #[arg(long)]
        email: Option<String>,

        /// Restrict the daily and monthly budgets to this service (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,

        /// Monitoring notification channel to attach (repeatable)
        #[arg(long = "notification-channel")]
        notification_channels: Vec<String>,
    },

    /// Create the monitoring dashboard from its layout file
    Dashboard {
        /// GCP project ID
        project_id: String,

        /// Dashboard layout file (defaults to dashboard-config.json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Metrics catalog used to check metric references
        #[arg(long)]
        metrics_config: Option<PathBuf>,
    },

    /// Create or update the log-based metrics of the catalog
    Metrics {
        /// GCP project ID
        project_id: String,

        /// Metrics catalog file (defaults to log-metrics.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate the monitoring pipeline; exits 0 only on overall PASS
    Validate {
        /// GCP project ID
        project_id: String,

        /// Write the JSON validation report to this file
        #[arg(long)]
        report_file: Option<PathBuf>,

        /// Metrics catalog listing the expected metrics
        #[arg(long)]
        metrics_config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format.into());

    tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(err) => {
                output::print_error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            output::print_warning("Interrupted by user");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load()?;
    if let Some(token) = cli.access_token {
        settings.access_token = Some(token);
    }
    if let Some(app_name) = cli.app_name {
        settings.app_name = app_name;
    }

    match cli.command {
        Commands::Budgets {
            project_id,
            daily_budget,
            monthly_budget,
            email,
            services,
            notification_channels,
        } => {
            let args = budgets::BudgetArgs {
                daily_budget,
                monthly_budget,
                email,
                services,
                notification_channels,
            };
            budgets::create_budgets(&settings, &project_id, args).await?;
        }
        Commands::Dashboard {
            project_id,
            config,
            metrics_config,
        } => {
            if let Some(path) = config {
                settings.dashboard_config_path = path;
            }
            if let Some(path) = metrics_config {
                settings.metrics_config_path = path;
            }
            dashboard::create_dashboard(&settings, &project_id).await?;
        }
        Commands::Metrics { project_id, config } => {
            if let Some(path) = config {
                settings.metrics_config_path = path;
            }
            metrics::create_metrics(&settings, &project_id).await?;
        }
        Commands::Validate {
            project_id,
            report_file,
            metrics_config,
        } => {
            if let Some(path) = metrics_config {
                settings.metrics_config_path = path;
            }
            let passed = validate::validate(&settings, &project_id, report_file.as_deref()).await?;
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
