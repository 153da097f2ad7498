//! Block volume (EBS) cost resolver
//!
//! Storage is billed per GB-month; the catalog bundles storage, IOPS and
//! throughput charges for a volume type into one response, distinguished
//! only by description text. Provisioned-IOPS types (io1/io2) pay per
//! provisioned IOPS; gp3 pays for throughput above the 125 MB/s baseline.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::Filter;
use crate::normalize::{coerce_number, parse_size_gb};
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_VOLUME_TYPE: &str = "gp3";
const DEFAULT_VOLUME_SIZE_GB: f64 = 20.0;
const GP3_BASELINE_THROUGHPUT_MBPS: f64 = 125.0;

/// Hourly cost of a single volume. Shared with the compute and database
/// resolvers for attached storage.
pub(crate) async fn volume_hourly(
    ctx: &ResolverCtx<'_>,
    volume_type: &str,
    size_gb: f64,
    iops: f64,
    throughput_mbps: f64,
) -> (f64, bool) {
    let mut filters = ctx.base_filters();
    filters.push(Filter::new("productFamily", "Storage"));
    filters.push(Filter::new("volumeApiName", volume_type));

    let records = ctx.query("AmazonEC2", &filters).await;

    // Classify each dimension once, storage first: an io2 storage row reads
    // "Provisioned IOPS io2 storage" and must not be mistaken for the IOPS
    // charge.
    let mut storage_price = None;
    let mut iops_price = None;
    let mut throughput_price = None;
    for record in records.iter() {
        let desc = record.description.to_lowercase();
        if desc.contains("storage") || desc.contains("volume") {
            storage_price.get_or_insert(record.amount);
        } else if desc.contains("iops") {
            iops_price.get_or_insert(record.amount);
        } else if desc.contains("throughput") {
            throughput_price.get_or_insert(record.amount);
        }
    }

    let Some(storage_price) = storage_price else {
        return (0.0, true);
    };

    let mut monthly = size_gb * storage_price;

    let volume_type = volume_type.to_lowercase();
    if matches!(volume_type.as_str(), "io1" | "io2") && iops > 0.0 {
        if let Some(p) = iops_price {
            monthly += iops * p;
        }
    }
    if volume_type == "gp3" && throughput_mbps > GP3_BASELINE_THROUGHPUT_MBPS {
        if let Some(p) = throughput_price {
            monthly += (throughput_mbps - GP3_BASELINE_THROUGHPUT_MBPS) * p;
        }
    }

    (monthly / HOURS_PER_MONTH, false)
}

pub async fn resolve(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let volume_type = node
        .attr_str(&["VolumeType", "volume_type"])
        .unwrap_or(DEFAULT_VOLUME_TYPE)
        .to_string();
    let size_gb = parse_size_gb(
        node.attr(&["VolumeSize", "VolumeSizeGB", "volume_size", "Size"]),
        DEFAULT_VOLUME_SIZE_GB,
    );
    let iops = coerce_number(node.attr(&["IOPS", "Iops", "iops"]), 0.0);
    let throughput = coerce_number(node.attr(&["Throughput", "throughput"]), 0.0);
    let count = coerce_number(node.attr(&["VolumeCount", "volume_count", "count"]), 1.0);

    let (per_volume, missing) = volume_hourly(ctx, &volume_type, size_gb, iops, throughput).await;
    let hourly = per_volume * count;

    let mut fields = BTreeMap::new();
    fields.insert("volume_type".to_string(), volume_type);
    fields.insert("volume_size_gb".to_string(), format!("{}", size_gb));
    fields.insert("volume_count".to_string(), format!("{}", count));
    if iops > 0.0 {
        fields.insert("provisioned_iops".to_string(), format!("{}", iops));
    }
    if throughput > 0.0 {
        fields.insert("throughput_mbps".to_string(), format!("{}", throughput));
    }

    make_entry(node, ServiceType::Ebs, hourly, fields, missing)
}
