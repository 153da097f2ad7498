//! Compute instance (EC2) cost resolver

use super::{block_storage, make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::{hourly_dimension, Filter};
use crate::normalize::{coerce_number, parse_size_gb};
use crate::report::CostEntry;
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_INSTANCE_TYPE: &str = "t3.medium";
const DEFAULT_OS: &str = "Linux";
const DEFAULT_TENANCY: &str = "Shared";

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let instance_type = node
        .attr_str(&["InstanceType", "instance_type", "size"])
        .unwrap_or(DEFAULT_INSTANCE_TYPE)
        .to_string();
    let os = node
        .attr_str(&["os", "OperatingSystem", "operating_system"])
        .unwrap_or(DEFAULT_OS)
        .to_string();
    let tenancy = node
        .attr_str(&["tenancy", "Tenancy"])
        .unwrap_or(DEFAULT_TENANCY)
        .to_string();
    let quantity = coerce_number(node.attr(&["quantity", "Quantity", "count"]), 1.0);

    let mut filters = ctx.base_filters();
    filters.push(Filter::new("instanceType", instance_type.as_str()));
    filters.push(Filter::new("operatingSystem", os.as_str()));
    filters.push(Filter::new("tenancy", tenancy.as_str()));
    filters.push(Filter::new("preInstalledSw", "NA"));
    filters.push(Filter::new("capacityStatus", "Used"));

    let records = ctx.query("AmazonEC2", &filters).await;
    let rate = hourly_dimension(&records);

    let mut missing = rate.is_none();
    let mut hourly = rate.map(|r| r.amount).unwrap_or(0.0) * quantity;

    // Attached block storage, only when declared on the node
    let mut volume_hourly_total = 0.0;
    if let Some(volumes) = node.attr(&["EBSVolumes", "ebs_volumes"]).and_then(Value::as_array) {
        for volume in volumes {
            let volume_type = volume
                .get("VolumeType")
                .and_then(Value::as_str)
                .unwrap_or("gp3");
            let size_gb = parse_size_gb(volume.get("VolumeSize"), 20.0);
            let iops = coerce_number(volume.get("IOPS"), 0.0);
            let throughput = coerce_number(volume.get("Throughput"), 0.0);

            let (cost, volume_missing) =
                block_storage::volume_hourly(ctx, volume_type, size_gb, iops, throughput).await;
            volume_hourly_total += cost;
            missing = missing || volume_missing;
        }
    }
    hourly += volume_hourly_total;

    let mut fields = BTreeMap::new();
    fields.insert("instance_type".to_string(), instance_type);
    fields.insert("operating_system".to_string(), os);
    fields.insert("tenancy".to_string(), tenancy);
    fields.insert("quantity".to_string(), format!("{}", quantity));
    if volume_hourly_total > 0.0 {
        fields.insert(
            "attached_storage_hourly".to_string(),
            format!("{:.6}", volume_hourly_total),
        );
    }

    make_entry(node, ServiceType::Ec2, hourly, fields, missing)
}
