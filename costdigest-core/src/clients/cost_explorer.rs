use async_trait::async_trait;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{DateInterval, Granularity, GroupDefinition, GroupDefinitionType};
use aws_sdk_costexplorer::Client;
use tracing::debug;

use crate::error::{CostDigestError, CostDigestResult};

use super::traits::{BillingQuery, BillingSource, CostGroup};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Billing source backed by AWS Cost Explorer `GetCostAndUsage`.
pub struct CostExplorerSource {
    client: Client,
}

impl CostExplorerSource {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_page(
        &self,
        query: &BillingQuery,
        page_token: Option<String>,
    ) -> CostDigestResult<GetCostAndUsageOutput> {
        let interval = DateInterval::builder()
            .start(query.start.format(DATE_FORMAT).to_string())
            .end(query.end_exclusive.format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| CostDigestError::BillingQueryFailed(e.to_string()))?;

        let grouping = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key(query.group_by.clone())
            .build();

        self.client
            .get_cost_and_usage()
            .time_period(interval)
            .granularity(Granularity::Monthly)
            .metrics(query.metric.clone())
            .group_by(grouping)
            .set_next_page_token(page_token)
            .send()
            .await
            .map_err(|e| CostDigestError::BillingQueryFailed(DisplayErrorContext(&e).to_string()))
    }
}

/// Groups of the first time bucket, with the requested metric pulled out.
fn groups_from_output(output: &GetCostAndUsageOutput, metric: &str) -> Vec<CostGroup> {
    let Some(bucket) = output.results_by_time().first() else {
        return Vec::new();
    };

    bucket
        .groups()
        .iter()
        .map(|group| {
            let value = group.metrics().and_then(|m| m.get(metric));
            CostGroup {
                keys: group.keys().to_vec(),
                amount: value.and_then(|v| v.amount()).map(str::to_string),
                unit: value.and_then(|v| v.unit()).map(str::to_string),
            }
        })
        .collect()
}

#[async_trait]
impl BillingSource for CostExplorerSource {
    fn source_name(&self) -> &str {
        "cost-explorer"
    }

    async fn fetch_cost_groups(&self, query: &BillingQuery) -> CostDigestResult<Vec<CostGroup>> {
        let mut groups = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let output = self.fetch_page(query, page_token.take()).await?;
            groups.extend(groups_from_output(&output, &query.metric));

            match output.next_page_token() {
                Some(token) if !token.is_empty() => {
                    debug!(groups = groups.len(), "Fetching next Cost Explorer page");
                    page_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(groups)
    }
}
