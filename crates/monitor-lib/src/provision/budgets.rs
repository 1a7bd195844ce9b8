//! Budget provisioning
//!
//! Creates the daily, monthly and Vertex-AI-only budgets. Each submission is
//! independent: a failure is logged and counted, the remaining budgets are
//! still submitted, and nothing is rolled back.

use serde::Serialize;

use crate::error::{CloudError, MonitorError, Result};
use crate::gcp::{BillingApi, BudgetApi};
use crate::models::{Budget, BudgetKind, VERTEX_AI_SERVICE};
use crate::observability::ProvisionLogger;

/// Budget amounts and scope requested by the caller
#[derive(Debug, Clone)]
pub struct BudgetPlan {
    pub app_name: String,
    pub currency: String,
    pub daily_units: i64,
    pub monthly_units: i64,
    /// Narrower service allow-list for the daily and monthly budgets
    pub services: Option<Vec<String>>,
    pub notification_channels: Vec<String>,
}

impl BudgetPlan {
    /// The Vertex AI budget gets half of the monthly amount
    pub fn vertex_units(&self) -> i64 {
        self.monthly_units / 2
    }

    /// The three budget definitions, in submission order
    pub fn budgets(&self, project_id: &str) -> Vec<(BudgetKind, Budget)> {
        let vertex_only = vec![VERTEX_AI_SERVICE.to_string()];
        let specs = [
            (BudgetKind::Daily, self.daily_units, self.services.as_deref()),
            (BudgetKind::Monthly, self.monthly_units, self.services.as_deref()),
            (BudgetKind::VertexAi, self.vertex_units(), Some(vertex_only.as_slice())),
        ];

        specs
            .into_iter()
            .map(|(kind, units, services)| {
                let budget = Budget::with_thresholds(
                    kind.display_name(&self.app_name, units),
                    project_id,
                    &self.currency,
                    units,
                    services,
                    &self.notification_channels,
                );
                (kind, budget)
            })
            .collect()
    }
}

/// Result of one budget submission
#[derive(Debug, Clone, Serialize)]
pub struct BudgetOutcome {
    pub kind: BudgetKind,
    pub display_name: String,
    pub units: i64,
    /// Created budget id, or the error that stopped it
    #[serde(serialize_with = "serialize_outcome")]
    pub result: std::result::Result<String, CloudError>,
}

fn serialize_outcome<S: serde::Serializer>(
    result: &std::result::Result<String, CloudError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match result {
        Ok(id) => serializer.serialize_str(id),
        Err(err) => serializer.serialize_str(&err.to_string()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    pub billing_account: String,
    pub outcomes: Vec<BudgetOutcome>,
}

impl BudgetReport {
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.created()
    }
}

/// Resolve the billing account id of a project.
///
/// Fails with `BillingNotEnabled` when the project has no active account.
pub async fn resolve_billing_account(billing: &dyn BillingApi, project_id: &str) -> Result<String> {
    let info = billing.get_billing_info(project_id).await?;
    if !info.billing_enabled || info.billing_account_name.is_empty() {
        return Err(MonitorError::BillingNotEnabled {
            project: project_id.to_string(),
        });
    }
    Ok(info.account_id().to_string())
}

/// Submit every budget of the plan under an already-resolved billing account
pub async fn create_budgets(
    budgets: &dyn BudgetApi,
    billing_account: &str,
    project_id: &str,
    plan: &BudgetPlan,
    logger: &ProvisionLogger,
) -> BudgetReport {
    let mut outcomes = Vec::new();

    for (kind, budget) in plan.budgets(project_id) {
        let units = budget.units().unwrap_or_default();
        let result = match budgets.create_budget(billing_account, &budget).await {
            Ok(created) => {
                logger.log_budget_created(kind, &budget.display_name, &created.name);
                Ok(created.id().to_string())
            }
            Err(err) => {
                logger.log_budget_failed(kind, &budget.display_name, &err);
                Err(err)
            }
        };

        outcomes.push(BudgetOutcome {
            kind,
            display_name: budget.display_name,
            units,
            result,
        });
    }

    BudgetReport {
        billing_account: billing_account.to_string(),
        outcomes,
    }
}

/// Resolve billing, then submit the three budgets
pub async fn provision_budgets(
    billing: &dyn BillingApi,
    budgets: &dyn BudgetApi,
    project_id: &str,
    plan: &BudgetPlan,
    logger: &ProvisionLogger,
) -> Result<BudgetReport> {
    let account = resolve_billing_account(billing, project_id).await?;
    Ok(create_budgets(budgets, &account, project_id, plan, logger).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_SERVICES, THRESHOLD_PERCENTS};
    use crate::testing::{Call, FakeCloud};

    fn plan() -> BudgetPlan {
        BudgetPlan {
            app_name: "Acme".to_string(),
            currency: "USD".to_string(),
            daily_units: 50,
            monthly_units: 1501,
            services: None,
            notification_channels: vec!["projects/acme-prod/notificationChannels/7".to_string()],
        }
    }

    #[test]
    fn test_plan_builds_three_budgets() {
        let budgets = plan().budgets("acme-prod");
        let kinds: Vec<BudgetKind> = budgets.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![BudgetKind::Daily, BudgetKind::Monthly, BudgetKind::VertexAi]);

        let (_, vertex) = &budgets[2];
        assert_eq!(vertex.units(), Some(750));
        assert_eq!(vertex.display_name, "Acme - Vertex AI Budget ($750)");
        assert_eq!(
            vertex.budget_filter.as_ref().unwrap().services,
            vec![VERTEX_AI_SERVICE.to_string()]
        );

        let (_, daily) = &budgets[0];
        assert_eq!(
            daily.budget_filter.as_ref().unwrap().services.len(),
            DEFAULT_SERVICES.len()
        );

        for (_, budget) in &budgets {
            let percents: Vec<f64> =
                budget.threshold_rules.iter().map(|r| r.threshold_percent).collect();
            assert_eq!(percents, THRESHOLD_PERCENTS.to_vec());
            assert_eq!(
                budget
                    .notifications_rule
                    .as_ref()
                    .unwrap()
                    .monitoring_notification_channels
                    .len(),
                1
            );
        }
    }

    #[test]
    fn test_narrow_services_apply_to_daily_and_monthly_only() {
        let mut plan = plan();
        plan.services = Some(vec!["services/storage.googleapis.com".to_string()]);
        let budgets = plan.budgets("acme-prod");

        assert_eq!(budgets[0].1.budget_filter.as_ref().unwrap().services.len(), 1);
        assert_eq!(budgets[1].1.budget_filter.as_ref().unwrap().services.len(), 1);
        assert_eq!(
            budgets[2].1.budget_filter.as_ref().unwrap().services,
            vec![VERTEX_AI_SERVICE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let mut fake = FakeCloud::default();
        fake.budget_failures.insert(
            "Acme - Monthly Budget ($1501)".to_string(),
            CloudError::already_exists("duplicate display name"),
        );
        let logger = ProvisionLogger::new("acme-prod");

        let report = provision_budgets(&fake, &fake, "acme-prod", &plan(), &logger)
            .await
            .unwrap();

        assert_eq!(report.billing_account, "ACC-1");
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.created(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[1].result.is_err());
        assert!(report.outcomes[2].result.is_ok());
        assert_eq!(fake.count(|c| matches!(c, Call::CreateBudget(_))), 3);
    }

    #[tokio::test]
    async fn test_billing_disabled_is_fatal() {
        let fake = FakeCloud::billing_disabled();
        let logger = ProvisionLogger::new("acme-prod");

        let err = provision_budgets(&fake, &fake, "acme-prod", &plan(), &logger)
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::BillingNotEnabled { .. }));
        assert_eq!(fake.count(|c| matches!(c, Call::CreateBudget(_))), 0);
    }
}
