use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::clients::{BillingQuery, BillingSource, CostGroup};
use crate::config::BillingConfig;
use crate::error::{CostDigestError, CostDigestResult};
use crate::models::{CostReport, ReportPeriod, ServiceCost};

pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Builds month-to-date cost reports from a billing source.
pub struct CostAggregator {
    source: Arc<dyn BillingSource>,
    config: BillingConfig,
}

impl CostAggregator {
    pub fn new(source: Arc<dyn BillingSource>, config: BillingConfig) -> Self {
        Self { source, config }
    }

    pub fn query_for(&self, period: &ReportPeriod) -> BillingQuery {
        BillingQuery {
            start: period.start,
            end_exclusive: period.query_end(),
            metric: self.config.metric.clone(),
            group_by: self.config.group_by.clone(),
        }
    }

    pub async fn month_to_date(&self, today: NaiveDate) -> CostDigestResult<CostReport> {
        self.for_period(ReportPeriod::month_to_date(today)).await
    }

    pub async fn for_period(&self, period: ReportPeriod) -> CostDigestResult<CostReport> {
        if !period.is_valid() {
            return Err(CostDigestError::InvalidPeriod(format!(
                "{} is after {}",
                period.start, period.end
            )));
        }

        let query = self.query_for(&period);
        debug!(
            source = self.source.source_name(),
            start = %query.start,
            end = %query.end_exclusive,
            metric = %query.metric,
            group_by = %query.group_by,
            "Querying billing data"
        );

        let groups = self.source.fetch_cost_groups(&query).await?;
        let services = groups
            .into_iter()
            .map(|group| to_service_cost(group, &self.config.fallback_currency))
            .collect::<CostDigestResult<Vec<_>>>()?;

        let report = CostReport::from_services(period, services, &self.config.fallback_currency);

        info!(
            services = report.services.len(),
            total = %report.total_amount,
            currency = %report.currency,
            "Aggregated month-to-date costs"
        );

        Ok(report)
    }
}

fn to_service_cost(group: CostGroup, fallback_currency: &str) -> CostDigestResult<ServiceCost> {
    let service = group
        .keys
        .into_iter()
        .next()
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());

    let raw = group.amount.ok_or_else(|| {
        CostDigestError::BillingResponseInvalid(format!("no amount for service '{}'", service))
    })?;

    let amount = parse_amount(&raw).ok_or_else(|| CostDigestError::InvalidAmount {
        service: service.clone(),
        value: raw.clone(),
    })?;

    let unit = group
        .unit
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| fallback_currency.to_string());

    Ok(ServiceCost::new(service, amount, unit))
}

/// Parses a billing amount. Cost Explorer returns plain decimals but very
/// small values can come back in scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
