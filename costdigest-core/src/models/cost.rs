use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// First day of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }

    /// End date to send to a billing API whose end bound is exclusive and
    /// must lie after the start.
    pub fn query_end(&self) -> NaiveDate {
        if self.end > self.start {
            self.end
        } else {
            self.start.succ_opt().unwrap_or(self.start)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service: String,
    pub amount: Decimal,
    pub unit: String,
}

impl ServiceCost {
    pub fn new(service: impl Into<String>, amount: Decimal, unit: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            amount,
            unit: unit.into(),
        }
    }
}

/// Month-to-date spend grouped by service.
///
/// Serializes to the payload handed to the summary agent:
/// `{"start","end","currency","total_amount","services":[...]}` with amounts
/// as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub services: Vec<ServiceCost>,
}

impl CostReport {
    /// Builds a report whose total is the exact sum of `services`. The
    /// currency is the first service's unit, or `fallback_currency` when
    /// there are no services.
    pub fn from_services(
        period: ReportPeriod,
        services: Vec<ServiceCost>,
        fallback_currency: &str,
    ) -> Self {
        let total_amount = services.iter().map(|s| s.amount).sum::<Decimal>();
        let currency = services
            .first()
            .map(|s| s.unit.clone())
            .unwrap_or_else(|| fallback_currency.to_string());

        Self {
            start: period.start,
            end: period.end,
            currency,
            total_amount,
            services,
        }
    }

    pub fn period(&self) -> ReportPeriod {
        ReportPeriod::new(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Services by amount, largest first. Equal amounts keep their original
    /// order.
    pub fn sorted_by_amount(&self) -> Vec<&ServiceCost> {
        let mut sorted: Vec<&ServiceCost> = self.services.iter().collect();
        sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
        sorted
    }
}
