//! Load balancer (ELB) cost resolver
//!
//! Hourly cost = flat per-hour rate + consumed capacity units x the LCU
//! rate. Capacity unit count comes from the node; it is an estimate the
//! upstream generator produces, not something the catalog can tell us.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::{dimension_matching, Filter};
use crate::normalize::coerce_number;
use crate::report::CostEntry;
use std::collections::BTreeMap;

const DEFAULT_LB_TYPE: &str = "application";

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let lb_type = node
        .attr_str(&["LoadBalancerType", "lb_type"])
        .unwrap_or(DEFAULT_LB_TYPE)
        .to_lowercase();
    let lcu_count = coerce_number(
        node.attr(&["LCUCount", "lcu_count", "CapacityUnits"]),
        0.0,
    );

    let mut filters = ctx.base_filters();
    filters.push(Filter::new("productFamily", "Load Balancer"));
    let records = ctx.query("AWSELB", &filters).await;

    let lcu_price = dimension_matching(&records, &["lcu", "capacity unit"]);
    // The flat rate and the LCU rate are both billed in hours; keep the LCU
    // dimension out of the flat pick.
    let flat_rate = records.iter().find(|r| {
        let unit = r.unit.to_lowercase();
        let desc = r.description.to_lowercase();
        (unit.contains("hour") || unit.contains("hr"))
            && !desc.contains("lcu")
            && !desc.contains("capacity unit")
            && r.amount > 0.0
    });

    let hourly = flat_rate.map(|r| r.amount).unwrap_or(0.0)
        + lcu_count * lcu_price.map(|r| r.amount).unwrap_or(0.0);

    let mut fields = BTreeMap::new();
    fields.insert("load_balancer_type".to_string(), lb_type);
    fields.insert("capacity_units".to_string(), format!("{}", lcu_count));

    make_entry(node, ServiceType::Elb, hourly, fields, flat_rate.is_none())
}
