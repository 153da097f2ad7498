//! Shared test fixtures: an in-memory price source with rule-based matching.

use archcost::catalog::{Filter, PriceRecord, PriceSource};
use archcost::error::Result;
use async_trait::async_trait;

/// One catalog rule: matches when the query is for `service_code` and every
/// filter in `required` is present in the query's filter set.
pub struct Rule {
    pub service_code: &'static str,
    pub required: Vec<Filter>,
    pub records: Vec<PriceRecord>,
}

/// Deterministic in-memory catalog; first matching rule wins.
pub struct StaticSource {
    pub rules: Vec<Rule>,
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn query(&self, service_code: &str, filters: &[Filter]) -> Result<Vec<PriceRecord>> {
        for rule in &self.rules {
            if rule.service_code == service_code
                && rule.required.iter().all(|r| filters.contains(r))
            {
                return Ok(rule.records.clone());
            }
        }
        Ok(Vec::new())
    }
}

pub fn rec(unit: &str, amount: f64, description: &str) -> PriceRecord {
    PriceRecord {
        unit: unit.to_string(),
        amount,
        description: description.to_string(),
    }
}

pub fn filter(field: &str, value: &str) -> Filter {
    Filter::new(field, value)
}
