//! Pricing catalog query adapter
//!
//! Wraps the AWS Price List API (`GetProducts`) behind the `PriceSource`
//! trait so the aggregation engine can run against an in-memory catalog in
//! tests. Each `PriceList` entry comes back as a JSON string whose on-demand
//! terms bundle one or more price dimensions; the adapter flattens every
//! dimension into a `PriceRecord` and leaves the description-heuristic
//! selection to the resolvers, since the catalog distinguishes dimensions
//! (storage vs. IOPS, requests vs. duration) only by free text.

use crate::error::{ArchcostError, Result};
use crate::retry::ExponentialBackoffPolicy;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_pricing::types::{Filter as ApiFilter, FilterType};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// The Price List API is only served from us-east-1, regardless of the
/// region being priced.
const PRICING_API_REGION: &str = "us-east-1";

/// One on-demand price dimension returned by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// Billing unit as published (Hrs, GB-Mo, Requests, ...)
    pub unit: String,
    /// Price in USD for one unit
    pub amount: f64,
    /// Free-text catalog label; the only way to tell dimensions apart
    pub description: String,
}

/// Exact-match query constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A queryable source of price records
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Query the catalog for a service code under exact-match filters.
    ///
    /// Implementations may fail with transport errors; the price cache
    /// absorbs those, so resolvers only ever observe a (possibly empty)
    /// record list.
    async fn query(&self, service_code: &str, filters: &[Filter]) -> Result<Vec<PriceRecord>>;
}

// Serde view of one PriceList JSON document. Only the on-demand terms are
// deserialized; reserved and savings-plan terms never appear under this key.
#[derive(Debug, Deserialize)]
struct PriceListItem {
    #[serde(default)]
    terms: Terms,
}

#[derive(Debug, Default, Deserialize)]
struct Terms {
    #[serde(rename = "OnDemand", default)]
    on_demand: HashMap<String, OnDemandTerm>,
}

#[derive(Debug, Deserialize)]
struct OnDemandTerm {
    #[serde(rename = "priceDimensions", default)]
    price_dimensions: HashMap<String, PriceDimension>,
}

#[derive(Debug, Deserialize)]
struct PriceDimension {
    #[serde(default)]
    unit: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pricePerUnit", default)]
    price_per_unit: HashMap<String, String>,
}

/// Flatten one PriceList JSON string into price records.
///
/// Dimensions without a parseable USD amount are dropped.
pub fn flatten_price_list(raw: &str) -> Vec<PriceRecord> {
    let Ok(item) = serde_json::from_str::<PriceListItem>(raw) else {
        debug!("Unparseable PriceList entry, skipping");
        return Vec::new();
    };

    let mut records = Vec::new();
    for term in item.terms.on_demand.values() {
        for dimension in term.price_dimensions.values() {
            let Some(usd) = dimension.price_per_unit.get("USD") else {
                continue;
            };
            let Ok(amount) = usd.parse::<f64>() else {
                continue;
            };
            records.push(PriceRecord {
                unit: dimension.unit.clone(),
                amount,
                description: dimension.description.clone(),
            });
        }
    }
    records
}

/// First record whose description matches one of the ordered substring
/// predicates (lowercased). Earlier patterns win over later ones.
pub fn dimension_matching<'a>(
    records: &'a [PriceRecord],
    patterns: &[&str],
) -> Option<&'a PriceRecord> {
    patterns.iter().find_map(|p| {
        records
            .iter()
            .find(|r| r.description.to_lowercase().contains(p))
    })
}

/// First record billed by the hour with a positive amount.
///
/// The positive-amount check skips the $0 artifacts the catalog publishes
/// alongside real hourly rates.
pub fn hourly_dimension(records: &[PriceRecord]) -> Option<&PriceRecord> {
    records.iter().find(|r| {
        let unit = r.unit.to_lowercase();
        (unit.contains("hour") || unit.contains("hr")) && r.amount > 0.0
    })
}

/// Price List API adapter
pub struct AwsPriceSource {
    client: aws_sdk_pricing::Client,
    max_results: i32,
    retry: ExponentialBackoffPolicy,
}

impl AwsPriceSource {
    pub async fn new(max_results: i32) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(PRICING_API_REGION))
            .load()
            .await;
        Self {
            client: aws_sdk_pricing::Client::new(&config),
            max_results: max_results.clamp(1, 100),
            retry: ExponentialBackoffPolicy::for_pricing_api(),
        }
    }

    async fn get_products(&self, service_code: &str, filters: &[Filter]) -> Result<Vec<String>> {
        let mut request = self
            .client
            .get_products()
            .service_code(service_code)
            .max_results(self.max_results);

        for f in filters {
            let api_filter = ApiFilter::builder()
                .r#type(FilterType::TermMatch)
                .field(f.field.as_str())
                .value(f.value.as_str())
                .build()
                .map_err(|e| {
                    ArchcostError::Catalog(format!("invalid filter {}={}: {}", f.field, f.value, e))
                })?;
            request = request.filters(api_filter);
        }

        let response = request.send().await.map_err(|e| {
            ArchcostError::Catalog(format!("GetProducts failed for {}: {}", service_code, e))
        })?;

        Ok(response.price_list().to_vec())
    }
}

#[async_trait]
impl PriceSource for AwsPriceSource {
    async fn query(&self, service_code: &str, filters: &[Filter]) -> Result<Vec<PriceRecord>> {
        let price_list = self
            .retry
            .execute_with_retry(|| self.get_products(service_code, filters))
            .await?;

        let records: Vec<PriceRecord> = price_list
            .iter()
            .flat_map(|raw| flatten_price_list(raw))
            .collect();

        debug!(
            "Catalog returned {} price dimension(s) for {} under {} filter(s)",
            records.len(),
            service_code,
            filters.len()
        );
        Ok(records)
    }
}
