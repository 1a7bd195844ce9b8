//! Subcommand implementations

pub mod budgets;
pub mod dashboard;
pub mod metrics;
pub mod validate;

/// Google Cloud console link for a project-scoped page
pub fn console_url(path: &str, project_id: &str) -> String {
    format!(
        "https://console.cloud.google.com/{}?project={}",
        path, project_id
    )
}
