//! Key-value store (DynamoDB) cost resolver
//!
//! Provisioned capacity bills per unit-hour, storage per GB-month. When the
//! catalog response lacks an explicit read-capacity dimension, the read
//! price is approximated as half the write price.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::dimension_matching;
use crate::normalize::{coerce_number, parse_size_gb};
use crate::report::{CostEntry, HOURS_PER_MONTH};
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_READ_UNITS: f64 = 5.0;
const DEFAULT_WRITE_UNITS: f64 = 5.0;
const DEFAULT_STORAGE_GB: f64 = 20.0;

fn capacity_units(node: &Node, flat_keys: &[&str], nested_key: &str, default: f64) -> f64 {
    // Some generators nest capacity under a "Throughput" object
    if let Some(value) = node.attr(flat_keys) {
        return coerce_number(Some(value), default);
    }
    node.attr(&["Throughput"])
        .and_then(Value::as_object)
        .and_then(|t| t.get(nested_key))
        .map(|v| coerce_number(Some(v), default))
        .unwrap_or(default)
}

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let read_units = capacity_units(
        node,
        &["ReadCapacityUnits", "read_units"],
        "ReadCapacityUnits",
        DEFAULT_READ_UNITS,
    );
    let write_units = capacity_units(
        node,
        &["WriteCapacityUnits", "write_units"],
        "WriteCapacityUnits",
        DEFAULT_WRITE_UNITS,
    );
    let storage_gb = parse_size_gb(
        node.attr(&["Storage", "StorageGB", "storage_gb"]),
        DEFAULT_STORAGE_GB,
    );

    let records = ctx.query("AmazonDynamoDB", &ctx.base_filters()).await;

    let write_price = dimension_matching(&records, &["write capacity unit", "write capacity"]);
    let read_price = dimension_matching(&records, &["read capacity unit", "read capacity"])
        .map(|r| r.amount)
        .or_else(|| write_price.map(|w| w.amount * 0.5));
    let storage_price = dimension_matching(&records, &["storage"]);

    let capacity_hourly = read_units * read_price.unwrap_or(0.0)
        + write_units * write_price.map(|r| r.amount).unwrap_or(0.0);
    let storage_hourly =
        storage_gb * storage_price.map(|r| r.amount).unwrap_or(0.0) / HOURS_PER_MONTH;

    let hourly = capacity_hourly + storage_hourly;
    let missing = write_price.is_none() || storage_price.is_none();

    let mut fields = BTreeMap::new();
    fields.insert("read_capacity_units".to_string(), format!("{}", read_units));
    fields.insert("write_capacity_units".to_string(), format!("{}", write_units));
    fields.insert("storage_gb".to_string(), format!("{}", storage_gb));

    make_entry(node, ServiceType::DynamoDb, hourly, fields, missing)
}
