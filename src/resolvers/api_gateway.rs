//! API gateway cost resolver
//!
//! Requests bill per million; an optional dedicated cache bills per
//! GB-month. Both hourly-normalized.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::dimension_matching;
use crate::normalize::{coerce_number, parse_size_gb};
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_MONTHLY_REQUESTS: f64 = 1_000_000.0;

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let requests = coerce_number(
        node.attr(&["RequestsPerMonth", "MonthlyRequests", "monthly_requests"]),
        DEFAULT_MONTHLY_REQUESTS,
    );
    let cache_gb = parse_size_gb(node.attr(&["CacheSize", "cache_size"]), 0.0);

    let records = ctx.query("AmazonApiGateway", &ctx.base_filters()).await;

    let request_price = dimension_matching(&records, &["request", "api call"]);
    let cache_price = dimension_matching(&records, &["cache"]);

    let monthly = (requests / 1_000_000.0) * request_price.map(|r| r.amount).unwrap_or(0.0)
        + cache_gb * cache_price.map(|r| r.amount).unwrap_or(0.0);
    let hourly = monthly / HOURS_PER_MONTH;

    let mut fields = BTreeMap::new();
    fields.insert("monthly_requests".to_string(), format!("{}", requests));
    if cache_gb > 0.0 {
        fields.insert("cache_gb".to_string(), format!("{}", cache_gb));
    }

    make_entry(node, ServiceType::ApiGateway, hourly, fields, request_price.is_none())
}
