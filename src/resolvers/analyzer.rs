//! Access analyzer cost resolver
//!
//! Flat per-analyzer monthly charge x count, hourly-normalized.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::dimension_matching;
use crate::normalize::coerce_number;
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_ANALYZER_COUNT: f64 = 1.0;

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let count = coerce_number(
        node.attr(&["AnalyzerCount", "analyzer_count"]),
        DEFAULT_ANALYZER_COUNT,
    );

    let records = ctx.query("AWSAccessAnalyzer", &ctx.base_filters()).await;
    let monthly_price = dimension_matching(&records, &["analyzer"]).or_else(|| records.first());

    let hourly = count * monthly_price.map(|r| r.amount).unwrap_or(0.0) / HOURS_PER_MONTH;

    let mut fields = BTreeMap::new();
    fields.insert("analyzer_count".to_string(), format!("{}", count));

    make_entry(
        node,
        ServiceType::AccessAnalyzer,
        hourly,
        fields,
        monthly_price.is_none(),
    )
}
