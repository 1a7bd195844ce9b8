//! Billing budget definitions
//!
//! Every budget created by this crate carries the same five threshold rules;
//! only the amount, service scope and display name vary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Threshold fractions applied to every budget, in order
pub const THRESHOLD_PERCENTS: [f64; 5] = [0.5, 0.75, 0.9, 1.0, 1.1];

/// Vertex AI service identifier
pub const VERTEX_AI_SERVICE: &str = "services/aiplatform.googleapis.com";

/// Services tracked when no narrower list is supplied
pub const DEFAULT_SERVICES: [&str; 5] = [
    VERTEX_AI_SERVICE,
    "services/cloudfunctions.googleapis.com",
    "services/storage.googleapis.com",
    "services/logging.googleapis.com",
    "services/monitoring.googleapis.com",
];

/// Project billing information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: String,
    /// Full resource name, e.g. `billingAccounts/0123-4567-89AB`
    #[serde(default)]
    pub billing_account_name: String,
    #[serde(default)]
    pub billing_enabled: bool,
}

impl BillingInfo {
    /// Trailing account identifier of `billing_account_name`
    pub fn account_id(&self) -> &str {
        last_segment(&self.billing_account_name)
    }
}

/// Amount in whole currency units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    #[serde(serialize_with = "int64_as_string", deserialize_with = "int64_from_any")]
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAmount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified_amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetFilter {
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendBasis {
    CurrentSpend,
    ForecastedSpend,
    #[serde(other)]
    BasisUnspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    pub threshold_percent: f64,
    #[serde(default = "default_spend_basis")]
    pub spend_basis: SpendBasis,
}

fn default_spend_basis() -> SpendBasis {
    SpendBasis::CurrentSpend
}

/// Who is notified when a threshold is crossed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsRule {
    #[serde(default)]
    pub monitoring_notification_channels: Vec<String>,
    #[serde(default)]
    pub disable_default_iam_recipients: bool,
}

/// A billing budget as accepted and returned by the budgets API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Server-assigned resource name, empty before creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_filter: Option<BudgetFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<BudgetAmount>,
    #[serde(default)]
    pub threshold_rules: Vec<ThresholdRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_rule: Option<NotificationsRule>,
}

impl Budget {
    /// Build a budget with the fixed threshold schedule.
    ///
    /// `services` defaults to [`DEFAULT_SERVICES`] when `None`.
    pub fn with_thresholds(
        display_name: impl Into<String>,
        project_id: &str,
        currency: &str,
        units: i64,
        services: Option<&[String]>,
        notification_channels: &[String],
    ) -> Self {
        let services = match services {
            Some(list) => list.to_vec(),
            None => DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            name: String::new(),
            display_name: display_name.into(),
            budget_filter: Some(BudgetFilter {
                projects: vec![format!("projects/{}", project_id)],
                services,
            }),
            amount: Some(BudgetAmount {
                specified_amount: Some(Money {
                    currency_code: currency.to_string(),
                    units,
                }),
            }),
            threshold_rules: THRESHOLD_PERCENTS
                .iter()
                .map(|&threshold_percent| ThresholdRule {
                    threshold_percent,
                    spend_basis: SpendBasis::CurrentSpend,
                })
                .collect(),
            notifications_rule: Some(NotificationsRule {
                monitoring_notification_channels: notification_channels.to_vec(),
                disable_default_iam_recipients: false,
            }),
        }
    }

    /// Trailing id of the server-assigned resource name
    pub fn id(&self) -> &str {
        last_segment(&self.name)
    }

    pub fn units(&self) -> Option<i64> {
        self.amount
            .as_ref()
            .and_then(|a| a.specified_amount.as_ref())
            .map(|m| m.units)
    }
}

/// Which of the three provisioned budgets this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Daily,
    Monthly,
    VertexAi,
}

impl BudgetKind {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetKind::Daily => "Daily",
            BudgetKind::Monthly => "Monthly",
            BudgetKind::VertexAi => "Vertex AI",
        }
    }

    /// Display name used when creating this budget, e.g. `"Acme - Daily Budget ($50)"`
    pub fn display_name(&self, app_name: &str, units: i64) -> String {
        format!("{} - {} Budget (${})", app_name, self.label(), units)
    }
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn last_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn int64_as_string<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// int64 fields arrive as JSON strings but numbers are accepted too
fn int64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_fixed_regardless_of_amount_and_scope() {
        let narrow = vec![VERTEX_AI_SERVICE.to_string()];
        let budgets = [
            Budget::with_thresholds("a", "p", "USD", 1, None, &[]),
            Budget::with_thresholds("b", "p", "USD", 1_000_000, Some(&narrow), &[]),
            Budget::with_thresholds("c", "p", "EUR", 0, Some(&[]), &["ch".to_string()]),
        ];

        for budget in &budgets {
            let percents: Vec<f64> = budget
                .threshold_rules
                .iter()
                .map(|r| r.threshold_percent)
                .collect();
            assert_eq!(percents, vec![0.5, 0.75, 0.9, 1.0, 1.1]);
            assert!(budget
                .threshold_rules
                .iter()
                .all(|r| r.spend_basis == SpendBasis::CurrentSpend));
        }
    }

    #[test]
    fn test_default_services_applied() {
        let budget = Budget::with_thresholds("a", "my-proj", "USD", 50, None, &[]);
        let filter = budget.budget_filter.unwrap();
        assert_eq!(filter.projects, vec!["projects/my-proj"]);
        assert_eq!(filter.services.len(), 5);
        assert_eq!(filter.services[0], VERTEX_AI_SERVICE);
    }

    #[test]
    fn test_units_serialized_as_string() {
        let budget = Budget::with_thresholds("a", "p", "USD", 1500, None, &[]);
        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["amount"]["specifiedAmount"]["units"], "1500");
        assert_eq!(json["thresholdRules"][0]["spendBasis"], "CURRENT_SPEND");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_budget_response_decodes() {
        let body = r#"{
            "name": "billingAccounts/ABC/budgets/b-123",
            "displayName": "Acme - Daily Budget ($50)",
            "amount": {"specifiedAmount": {"currencyCode": "USD", "units": "50"}},
            "thresholdRules": [{"thresholdPercent": 0.5}, {"thresholdPercent": 1.0, "spendBasis": "FORECASTED_SPEND"}],
            "etag": "xyz"
        }"#;
        let budget: Budget = serde_json::from_str(body).unwrap();
        assert_eq!(budget.id(), "b-123");
        assert_eq!(budget.units(), Some(50));
        assert_eq!(budget.threshold_rules.len(), 2);
        assert_eq!(budget.threshold_rules[1].spend_basis, SpendBasis::ForecastedSpend);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            BudgetKind::VertexAi.display_name("Acme", 750),
            "Acme - Vertex AI Budget ($750)"
        );
        assert_eq!(BudgetKind::Daily.display_name("Acme", 50), "Acme - Daily Budget ($50)");
    }

    #[test]
    fn test_account_id() {
        let info = BillingInfo {
            billing_account_name: "billingAccounts/0123-4567".to_string(),
            billing_enabled: true,
            ..Default::default()
        };
        assert_eq!(info.account_id(), "0123-4567");
    }
}
