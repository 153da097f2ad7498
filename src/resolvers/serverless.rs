//! Serverless function (Lambda) cost resolver
//!
//! Monthly cost = (invocations / 1e6) x per-million request price +
//! invocations x duration x allocated GB x per-GB-second compute price,
//! normalized to hourly. The catalog returns both dimensions in one
//! response, told apart only by description text.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::dimension_matching;
use crate::normalize::{coerce_number, parse_memory_mb};
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_MEMORY_MB: f64 = 128.0;
const DEFAULT_MONTHLY_INVOCATIONS: f64 = 1_000_000.0;
const DEFAULT_DURATION_MS: f64 = 100.0;

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let memory_mb = parse_memory_mb(node.attr(&["Memory", "memory"]), DEFAULT_MEMORY_MB);
    let invocations = coerce_number(
        node.attr(&["Invocations", "MonthlyRequests", "monthly_invocations"]),
        DEFAULT_MONTHLY_INVOCATIONS,
    );
    let duration_ms = coerce_number(
        node.attr(&["AvgDuration", "AverageDuration", "duration_ms"]),
        DEFAULT_DURATION_MS,
    );

    let records = ctx.query("AWSLambda", &ctx.base_filters()).await;

    let request_price = dimension_matching(&records, &["request"]);
    let compute_price = dimension_matching(&records, &["duration", "gb-second"]);

    let monthly_request_cost =
        (invocations / 1_000_000.0) * request_price.map(|r| r.amount).unwrap_or(0.0);
    let gb_seconds = invocations * (duration_ms / 1000.0) * (memory_mb / 1024.0);
    let monthly_compute_cost = gb_seconds * compute_price.map(|r| r.amount).unwrap_or(0.0);

    let hourly = (monthly_request_cost + monthly_compute_cost) / HOURS_PER_MONTH;
    let missing = request_price.is_none() || compute_price.is_none();

    let mut fields = BTreeMap::new();
    fields.insert("memory_mb".to_string(), format!("{}", memory_mb));
    fields.insert("monthly_invocations".to_string(), format!("{}", invocations));
    fields.insert("avg_duration_ms".to_string(), format!("{}", duration_ms));
    fields.insert("gb_seconds".to_string(), format!("{}", gb_seconds));

    make_entry(node, ServiceType::Lambda, hourly, fields, missing)
}
