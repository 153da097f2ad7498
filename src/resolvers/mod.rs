//! Service cost resolvers
//!
//! One resolver per service type, registered in a single dispatch table
//! instead of per-script copies. Every resolver is a pure function of
//! (node, catalog snapshot): it extracts attributes through the normalizer
//! with per-service defaults, builds the filter set for its service, picks
//! price dimensions off the catalog response by description heuristics, and
//! computes an hourly cost. A resolver never fails: a missing price yields
//! a zero-cost entry flagged `missing_price_data`, which the aggregation
//! engine turns into a report warning.

pub mod analyzer;
pub mod api_gateway;
pub mod block_storage;
pub mod compute;
pub mod database;
pub mod kv_store;
pub mod load_balancer;
pub mod messaging;
pub mod object_storage;
pub mod serverless;

use crate::architecture::{Node, ServiceType};
use crate::cache::PriceCache;
use crate::catalog::{Filter, PriceRecord};
use crate::report::{round_hourly, CostEntry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a resolver needs besides the node itself
pub struct ResolverCtx<'a> {
    pub cache: &'a PriceCache,
    /// Pricing API location display name, already resolved by the engine
    pub location: String,
}

impl ResolverCtx<'_> {
    /// Query through the per-run cache.
    pub async fn query(&self, service_code: &str, filters: &[Filter]) -> Arc<Vec<PriceRecord>> {
        self.cache.get_or_query(service_code, filters).await
    }

    /// The filter constraints shared by every on-demand lookup.
    pub fn base_filters(&self) -> Vec<Filter> {
        vec![
            Filter::new("location", self.location.as_str()),
            Filter::new("termType", "OnDemand"),
        ]
    }
}

/// Dispatch a node to its resolver. Returns `None` for unrecognized types;
/// the engine records the warning and omits the node from the breakdown.
pub async fn resolve(
    service_type: &ServiceType,
    node: &Node,
    ctx: &ResolverCtx<'_>,
) -> Option<CostEntry> {
    let entry = match service_type {
        ServiceType::Ec2 => compute::resolve(node, ctx).await,
        ServiceType::Rds => database::resolve(node, ctx).await,
        ServiceType::S3 => object_storage::resolve(node, ctx).await,
        ServiceType::Lambda => serverless::resolve(node, ctx).await,
        ServiceType::Ebs => block_storage::resolve(node, ctx).await,
        ServiceType::DynamoDb => kv_store::resolve(node, ctx).await,
        ServiceType::Sqs => messaging::resolve_queue(node, ctx).await,
        ServiceType::Sns => messaging::resolve_topic(node, ctx).await,
        ServiceType::Elb => load_balancer::resolve(node, ctx).await,
        ServiceType::ApiGateway => api_gateway::resolve(node, ctx).await,
        ServiceType::AccessAnalyzer => analyzer::resolve(node, ctx).await,
        ServiceType::Other(_) => return None,
    };
    Some(entry)
}

/// Assemble a breakdown entry; clamps to non-negative and applies the
/// declared 6-decimal entry precision so totals sum without drift.
pub(crate) fn make_entry(
    node: &Node,
    service_type: ServiceType,
    hourly_cost: f64,
    descriptive_fields: BTreeMap<String, String>,
    missing_price_data: bool,
) -> CostEntry {
    CostEntry {
        node_id: node.id.clone(),
        service_type: service_type.tag().to_string(),
        description: node.display_name().to_string(),
        hourly_cost: round_hourly(hourly_cost.max(0.0)),
        descriptive_fields,
        missing_price_data,
    }
}
