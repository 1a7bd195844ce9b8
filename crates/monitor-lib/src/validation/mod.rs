//! Monitoring pipeline validation
//!
//! Results are accumulated per category as `{name, passed, details}` records
//! with running pass/fail counters. A category (and the run as a whole)
//! passes when at least 75% of its tests passed; a category with no tests
//! scores 0% and fails.

mod checks;


pub use checks::{
    expected_metric_names, ValidationClients, Validator, FALLBACK_EXPECTED_METRICS,
    REQUIRED_LOG_FIELDS, STRUCTURED_LOG_FILTER,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Minimum passing share, in percent
pub const PASS_THRESHOLD_PERCENT: f64 = 75.0;

/// Number of component categories that must have a passing test for the
/// pipeline completeness check to pass
pub const MIN_WORKING_COMPONENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    StructuredLogging,
    LogMetrics,
    Dashboard,
    Budgets,
    /// Derived completeness check; not queried against any API
    Pipeline,
}

impl Category {
    /// The four independently queried categories, in run order
    pub const COMPONENTS: [Category; 4] = [
        Category::StructuredLogging,
        Category::LogMetrics,
        Category::Dashboard,
        Category::Budgets,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::StructuredLogging => "structured_logging",
            Category::LogMetrics => "log_metrics",
            Category::Dashboard => "dashboard",
            Category::Budgets => "budgets",
            Category::Pipeline => "pipeline",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::StructuredLogging => "Structured Logging",
            Category::LogMetrics => "Log Metrics",
            Category::Dashboard => "Dashboard",
            Category::Budgets => "Budgets",
            Category::Pipeline => "Pipeline",
        }
    }

    /// Pipeline component this category stands for
    pub fn component(&self) -> &'static str {
        match self {
            Category::StructuredLogging => "Cloud Functions",
            Category::LogMetrics => "Log-based Metrics",
            Category::Dashboard => "Monitoring Dashboard",
            Category::Budgets => "Budget Alerts",
            Category::Pipeline => "Monitoring Pipeline",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Fail => write!(f, "FAIL"),
        }
    }
}

/// Share of passed tests in percent; 0 when nothing ran
pub fn success_rate(passed: usize, failed: usize) -> f64 {
    let total = passed + failed;
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

pub fn status_for(passed: usize, failed: usize) -> Status {
    if success_rate(passed, failed) >= PASS_THRESHOLD_PERCENT {
        Status::Pass
    } else {
        Status::Fail
    }
}

fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryResults {
    pub passed: usize,
    pub failed: usize,
    pub tests: Vec<TestRecord>,
    /// Informational lines printed alongside the tests
    #[serde(skip)]
    pub notes: Vec<String>,
}

impl CategoryResults {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.passed, self.failed)
    }

    pub fn status(&self) -> Status {
        status_for(self.passed, self.failed)
    }
}

/// Accumulated results of one validation run
#[derive(Debug, Clone)]
pub struct ValidationResults {
    categories: BTreeMap<Category, CategoryResults>,
    pub overall_passed: usize,
    pub overall_failed: usize,
}

impl Default for ValidationResults {
    fn default() -> Self {
        let categories = Category::COMPONENTS
            .iter()
            .chain(std::iter::once(&Category::Pipeline))
            .map(|c| (*c, CategoryResults::default()))
            .collect();
        Self {
            categories,
            overall_passed: 0,
            overall_failed: 0,
        }
    }
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, category: Category) -> &mut CategoryResults {
        self.categories.entry(category).or_default()
    }

    /// Record a test and bump the category and overall counters
    pub fn record(
        &mut self,
        category: Category,
        name: impl Into<String>,
        passed: bool,
        details: impl Into<String>,
    ) {
        if passed {
            self.overall_passed += 1;
        } else {
            self.overall_failed += 1;
        }

        let results = self.entry(category);
        if passed {
            results.passed += 1;
        } else {
            results.failed += 1;
        }
        results.tests.push(TestRecord {
            name: name.into(),
            passed,
            details: details.into(),
        });
    }

    pub fn note(&mut self, category: Category, message: impl Into<String>) {
        self.entry(category).notes.push(message.into());
    }

    pub fn category(&self, category: Category) -> &CategoryResults {
        static EMPTY: CategoryResults = CategoryResults {
            passed: 0,
            failed: 0,
            tests: Vec::new(),
            notes: Vec::new(),
        };
        self.categories.get(&category).unwrap_or(&EMPTY)
    }

    pub fn total(&self) -> usize {
        self.overall_passed + self.overall_failed
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.overall_passed, self.overall_failed)
    }

    pub fn status(&self) -> Status {
        status_for(self.overall_passed, self.overall_failed)
    }

    /// Component categories with at least one passing test
    pub fn working_components(&self) -> Vec<Category> {
        Category::COMPONENTS
            .iter()
            .copied()
            .filter(|c| self.category(*c).passed > 0)
            .collect()
    }

    pub fn report(&self, project_id: &str, timestamp: DateTime<Utc>) -> ValidationReport {
        let category_report = |category: Category| {
            let results = self.category(category);
            CategoryReport {
                status: results.status(),
                success_rate: format_rate(results.success_rate()),
                passed: results.passed,
                failed: results.failed,
                tests: results.tests.clone(),
            }
        };

        ValidationReport {
            project_id: project_id.to_string(),
            validation_timestamp: timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            overall_status: self.status(),
            success_rate: format_rate(self.success_rate()),
            total_tests: self.total(),
            passed_tests: self.overall_passed,
            failed_tests: self.overall_failed,
            categories: CategoryReports {
                structured_logging: category_report(Category::StructuredLogging),
                log_metrics: category_report(Category::LogMetrics),
                dashboard: category_report(Category::Dashboard),
                budgets: category_report(Category::Budgets),
            },
            pipeline: category_report(Category::Pipeline),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub status: Status,
    pub success_rate: String,
    pub passed: usize,
    pub failed: usize,
    pub tests: Vec<TestRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReports {
    pub structured_logging: CategoryReport,
    pub log_metrics: CategoryReport,
    pub dashboard: CategoryReport,
    pub budgets: CategoryReport,
}

impl CategoryReports {
    pub fn get(&self, category: Category) -> Option<&CategoryReport> {
        match category {
            Category::StructuredLogging => Some(&self.structured_logging),
            Category::LogMetrics => Some(&self.log_metrics),
            Category::Dashboard => Some(&self.dashboard),
            Category::Budgets => Some(&self.budgets),
            Category::Pipeline => None,
        }
    }
}

/// Serializable summary of a validation run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub project_id: String,
    pub validation_timestamp: String,
    pub overall_status: Status,
    pub success_rate: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub categories: CategoryReports,
    pub pipeline: CategoryReport,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.overall_status == Status::Pass
    }
}
