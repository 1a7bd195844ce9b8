//! Cloud Billing and Billing Budgets clients

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::transport::{Page, RestTransport};
use super::{BillingApi, BudgetApi};
use crate::error::{CloudError, MonitorError};
use crate::models::{BillingInfo, Budget};

/// Client for `cloudbilling.googleapis.com`
pub struct BillingClient {
    transport: RestTransport,
    base_url: Url,
}

impl BillingClient {
    pub fn new(transport: RestTransport, endpoint: &str) -> Result<Self, MonitorError> {
        Ok(Self {
            transport,
            base_url: RestTransport::base_url(endpoint)?,
        })
    }
}

#[async_trait]
impl BillingApi for BillingClient {
    async fn get_billing_info(&self, project_id: &str) -> Result<BillingInfo, CloudError> {
        let path = format!("v1/projects/{}/billingInfo", project_id);
        self.transport.get(&self.base_url, &path, &[]).await
    }
}

/// Client for `billingbudgets.googleapis.com`
pub struct BudgetClient {
    transport: RestTransport,
    base_url: Url,
}

impl BudgetClient {
    pub fn new(transport: RestTransport, endpoint: &str) -> Result<Self, MonitorError> {
        Ok(Self {
            transport,
            base_url: RestTransport::base_url(endpoint)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetPage {
    #[serde(default)]
    budgets: Vec<Budget>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl Page for BudgetPage {
    type Item = Budget;

    fn into_parts(self) -> (Vec<Budget>, Option<String>) {
        (self.budgets, self.next_page_token)
    }
}

#[async_trait]
impl BudgetApi for BudgetClient {
    async fn create_budget(
        &self,
        billing_account: &str,
        budget: &Budget,
    ) -> Result<Budget, CloudError> {
        let path = format!("v1/billingAccounts/{}/budgets", billing_account);
        self.transport.post(&self.base_url, &path, budget).await
    }

    async fn list_budgets(&self, billing_account: &str) -> Result<Vec<Budget>, CloudError> {
        let path = format!("v1/billingAccounts/{}/budgets", billing_account);
        self.transport
            .get_all::<BudgetPage>(&self.base_url, &path, &[])
            .await
    }
}
