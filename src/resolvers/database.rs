//! Managed database (RDS) cost resolver
//!
//! Hourly cost = instance rate (doubled under multi-AZ) + storage at its
//! GB-month rate / 730 + a backup surcharge of 10% of the storage cost
//! scaled by the retention window relative to the 7-day default.

use super::{block_storage, make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::{hourly_dimension, Filter};
use crate::normalize::{coerce_number, parse_size_gb};
use crate::report::CostEntry;
use std::collections::BTreeMap;

const DEFAULT_INSTANCE_CLASS: &str = "db.t3.medium";
const DEFAULT_ENGINE: &str = "MySQL";
const DEFAULT_STORAGE_GB: f64 = 20.0;
const DEFAULT_STORAGE_TYPE: &str = "gp3";
const DEFAULT_RETENTION_DAYS: f64 = 7.0;

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let instance_class = node
        .attr_str(&["DBInstanceClass", "InstanceType", "instance_class"])
        .unwrap_or(DEFAULT_INSTANCE_CLASS)
        .to_string();
    let engine = node
        .attr_str(&["DBEngine", "engine", "Engine"])
        .unwrap_or(DEFAULT_ENGINE)
        .to_string();
    let multi_az = node.attr_bool(&["MultiAZ", "multi_az"]);
    let storage_gb = parse_size_gb(
        node.attr(&["Storage", "storage_size", "StorageSize"]),
        DEFAULT_STORAGE_GB,
    );
    let storage_type = node
        .attr_str(&["StorageType", "storage_type"])
        .unwrap_or(DEFAULT_STORAGE_TYPE)
        .to_string();
    let iops = coerce_number(node.attr(&["IOPS", "Iops"]), 0.0);
    let retention_days = coerce_number(
        node.attr(&["BackupRetention", "backup_retention"]),
        DEFAULT_RETENTION_DAYS,
    );

    let mut filters = ctx.base_filters();
    filters.push(Filter::new("instanceType", instance_class.as_str()));
    filters.push(Filter::new("databaseEngine", engine.as_str()));
    filters.push(Filter::new("deploymentOption", "Single-AZ"));

    let records = ctx.query("AmazonRDS", &filters).await;
    let rate = hourly_dimension(&records);

    let mut instance_hourly = rate.map(|r| r.amount).unwrap_or(0.0);
    if multi_az {
        instance_hourly *= 2.0;
    }

    // RDS storage is EBS underneath, so it prices off the same catalog rows
    let (storage_hourly, storage_missing) =
        block_storage::volume_hourly(ctx, &storage_type, storage_gb, iops, 0.0).await;

    let backup_hourly = storage_hourly * 0.1 * (retention_days / DEFAULT_RETENTION_DAYS);

    let hourly = instance_hourly + storage_hourly + backup_hourly;
    let missing = rate.is_none() || storage_missing;

    let mut fields = BTreeMap::new();
    fields.insert("instance_class".to_string(), instance_class);
    fields.insert("engine".to_string(), engine);
    fields.insert(
        "deployment".to_string(),
        if multi_az { "Multi-AZ" } else { "Single-AZ" }.to_string(),
    );
    fields.insert("storage_gb".to_string(), format!("{}", storage_gb));
    fields.insert("storage_type".to_string(), storage_type);
    fields.insert("backup_retention_days".to_string(), format!("{}", retention_days));

    make_entry(node, ServiceType::Rds, hourly, fields, missing)
}
