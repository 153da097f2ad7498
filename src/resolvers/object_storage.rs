//! Object storage (S3) cost resolver
//!
//! Storage is priced per GB-month with published volume tiers: the first
//! 50 TB, the next 450 TB, and everything beyond. Tier rates are looked up
//! by catalog description text; when a tier-specific rate cannot be found
//! the previous tier's rate applies, degrading to a flat single-tier price.
//! Request charges are negligible next to storage and are omitted.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::{dimension_matching, Filter, PriceRecord};
use crate::normalize::parse_size_gb;
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_STORAGE_GB: f64 = 100.0;
const DEFAULT_STORAGE_CLASS: &str = "Standard";

/// Published tier widths in GB
const TIER1_GB: f64 = 51_200.0; // first 50 TB
const TIER2_GB: f64 = 460_800.0; // next 450 TB

fn storage_dimension(records: &[PriceRecord]) -> Option<&PriceRecord> {
    records.iter().find(|r| {
        r.unit.to_lowercase().contains("gb")
            && r.description.to_lowercase().contains("storage")
            && r.amount > 0.0
    })
}

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let storage_gb = parse_size_gb(
        node.attr(&["Storage", "storageSize", "StorageSize", "Size", "size"]),
        DEFAULT_STORAGE_GB,
    );
    let storage_class = node
        .attr_str(&["storageClass", "StorageClass", "storage_class"])
        .unwrap_or(DEFAULT_STORAGE_CLASS)
        .to_string();

    let mut filters = ctx.base_filters();
    filters.push(Filter::new("volumeType", storage_class.as_str()));
    let records = ctx.query("AmazonS3", &filters).await;

    let Some(tier1) = storage_dimension(&records) else {
        let mut fields = BTreeMap::new();
        fields.insert("storage_gb".to_string(), format!("{}", storage_gb));
        fields.insert("storage_class".to_string(), storage_class);
        return make_entry(node, ServiceType::S3, 0.0, fields, true);
    };
    let tier1_price = tier1.amount;

    let mut monthly = 0.0;
    if storage_gb <= TIER1_GB {
        monthly += storage_gb * tier1_price;
    } else {
        monthly += TIER1_GB * tier1_price;
        let mut remaining = storage_gb - TIER1_GB;

        // Tier rates share one unfiltered-by-class response; fall back to the
        // prior tier when the catalog does not publish a tier description.
        let tier_records = ctx.query("AmazonS3", &ctx.base_filters()).await;
        let tier2_price = dimension_matching(&tier_records, &["next 450 tb", "450 tb"])
            .map(|r| r.amount)
            .unwrap_or(tier1_price);

        if remaining <= TIER2_GB {
            monthly += remaining * tier2_price;
        } else {
            monthly += TIER2_GB * tier2_price;
            remaining -= TIER2_GB;

            let tier3_price = dimension_matching(&tier_records, &["over 500 tb", "500+ tb"])
                .map(|r| r.amount)
                .unwrap_or(tier2_price);
            monthly += remaining * tier3_price;
        }
    }

    let hourly = monthly / HOURS_PER_MONTH;

    let mut fields = BTreeMap::new();
    fields.insert("storage_gb".to_string(), format!("{}", storage_gb));
    fields.insert("storage_class".to_string(), storage_class);
    fields.insert("gb_month_rate".to_string(), format!("{}", tier1_price));

    make_entry(node, ServiceType::S3, hourly, fields, false)
}
