//! Aggregation engine
//!
//! Walks an architecture's node list in input order, resolves each node's
//! region and cost, and assembles the final report. Per-node failures
//! (unrecognized types, unmapped regions, missing catalog prices) degrade
//! to warnings so a syntactically valid input always produces a report;
//! the only fatal condition (a missing `nodes` list) is rejected upstream
//! at parse time. The input architecture is never mutated.

use crate::architecture::{Architecture, Node, ServiceType};
use crate::cache::PriceCache;
use crate::catalog::PriceSource;
use crate::normalize::{resolve_region, RegionResolution};
use crate::report::{CostEntry, Report, ReportWarning};
use crate::resolvers::{self, ResolverCtx};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub struct Estimator {
    cache: PriceCache,
    default_region: String,
}

impl Estimator {
    pub fn new(source: Box<dyn PriceSource>, default_region: impl Into<String>) -> Self {
        Self {
            cache: PriceCache::new(source),
            default_region: default_region.into(),
        }
    }

    /// Estimate the cost of every node and produce the aggregated report.
    pub async fn estimate(&self, architecture: &Architecture) -> Report {
        let mut breakdown: Vec<CostEntry> = Vec::new();
        let mut warnings: Vec<ReportWarning> = Vec::new();

        for node in &architecture.nodes {
            let node_id = warning_id(node);

            let Some(service_type) = node.service_type.clone() else {
                warn!("Node '{}' has no type, skipping", node_id);
                warnings.push(ReportWarning {
                    node_id,
                    reason: "missing node type".to_string(),
                });
                continue;
            };

            if let ServiceType::Other(tag) = &service_type {
                warn!("No resolver for node type '{}', skipping '{}'", tag, node_id);
                warnings.push(ReportWarning {
                    node_id,
                    reason: format!("unrecognized node type: {}", tag),
                });
                continue;
            }

            let region = node
                .region_value()
                .map(str::to_string)
                .unwrap_or_else(|| self.default_region.clone());
            let location = match resolve_region(&region) {
                RegionResolution::Location(location) => location,
                RegionResolution::Unmapped(code) => {
                    warn!("Region '{}' is not in the lookup table, skipping pricing for '{}'", code, node_id);
                    breakdown.push(zero_entry(node, &service_type));
                    warnings.push(ReportWarning {
                        node_id,
                        reason: format!("unmapped region: {}", code),
                    });
                    continue;
                }
            };

            let ctx = ResolverCtx {
                cache: &self.cache,
                location,
            };

            if let Some(entry) = resolvers::resolve(&service_type, node, &ctx).await {
                if entry.missing_price_data {
                    warnings.push(ReportWarning {
                        node_id,
                        reason: "missing price data".to_string(),
                    });
                }
                info!(
                    "Resolved '{}' ({}) at ${:.6}/hour",
                    entry.description, entry.service_type, entry.hourly_cost
                );
                breakdown.push(entry);
            }
        }

        Report::from_breakdown(breakdown, warnings)
    }
}

fn warning_id(node: &Node) -> String {
    if node.id.is_empty() {
        node.display_name().to_string()
    } else {
        node.id.clone()
    }
}

/// Entry for a node that was recognized but could not be priced at all
/// (unmapped region): it stays visible in the breakdown at zero cost.
fn zero_entry(node: &Node, service_type: &ServiceType) -> CostEntry {
    CostEntry {
        node_id: node.id.clone(),
        service_type: service_type.tag().to_string(),
        description: node.display_name().to_string(),
        hourly_cost: 0.0,
        descriptive_fields: BTreeMap::new(),
        missing_price_data: true,
    }
}
