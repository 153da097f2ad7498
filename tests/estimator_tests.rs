//! End-to-end aggregation engine tests over an in-memory catalog
//!
//! Exercises the estimation pipeline: region resolution, resolver dispatch,
//! graceful degradation for unknown types and missing prices, and the
//! hourly/monthly/yearly conversion invariants.

mod common;

use archcost::architecture::Architecture;
use archcost::engine::Estimator;
use archcost::report::HOURS_PER_MONTH;
use common::{filter, rec, Rule, StaticSource};
use serde_json::json;

fn ec2_micro_source() -> StaticSource {
    StaticSource {
        rules: vec![Rule {
            service_code: "AmazonEC2",
            required: vec![
                filter("instanceType", "t3.micro"),
                filter("location", "Asia Pacific (Mumbai)"),
                filter("termType", "OnDemand"),
            ],
            records: vec![rec(
                "Hrs",
                0.0116,
                "$0.0116 per On Demand Linux t3.micro Instance Hour",
            )],
        }],
    }
}

fn arch(nodes: serde_json::Value) -> Architecture {
    Architecture::from_value(json!({ "nodes": nodes })).unwrap()
}

#[tokio::test]
async fn test_compute_instance_with_known_price() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "us-east-1");
    let architecture = arch(json!([
        {"id": "web", "type": "compute-instance", "region": "ap-south-1", "size": "t3.micro"}
    ]));

    let report = estimator.estimate(&architecture).await;

    assert_eq!(report.service_breakdown.len(), 1);
    let entry = &report.service_breakdown[0];
    assert!((entry.hourly_cost - 0.0116).abs() < 1e-9);
    assert!((report.estimated_monthly_cost_usd - 8.468).abs() < 1e-3);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_unmapped_region_degrades_to_zero_plus_warning() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "us-east-1");
    let architecture = arch(json!([
        {"id": "rover", "type": "AmazonEC2", "region": "mars-west-1", "InstanceType": "t3.micro"}
    ]));

    let report = estimator.estimate(&architecture).await;

    assert_eq!(report.service_breakdown.len(), 1);
    assert_eq!(report.service_breakdown[0].hourly_cost, 0.0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].node_id, "rover");
    assert!(report.warnings[0].reason.contains("unmapped region"));
    assert_eq!(report.total_hourly_cost_usd, 0.0);
}

#[tokio::test]
async fn test_managed_database_with_multi_az() {
    let source = StaticSource {
        rules: vec![
            Rule {
                service_code: "AmazonRDS",
                required: vec![
                    filter("instanceType", "db.t3.medium"),
                    filter("deploymentOption", "Single-AZ"),
                ],
                records: vec![rec("Hrs", 0.05, "USD per db.t3.medium Single-AZ instance hour")],
            },
            Rule {
                service_code: "AmazonEC2",
                required: vec![filter("productFamily", "Storage"), filter("volumeApiName", "gp3")],
                records: vec![rec("GB-Mo", 0.10, "per GB-month of General Purpose gp3 storage")],
            },
        ],
    };
    let estimator = Estimator::new(Box::new(source), "us-east-1");
    let architecture = arch(json!([
        {"id": "db", "type": "AmazonRDS", "DBInstanceClass": "db.t3.medium",
         "Storage": 100, "MultiAZ": true, "BackupRetention": 7}
    ]));

    let report = estimator.estimate(&architecture).await;

    // instance doubled: 0.10; storage 100 * 0.10 / 730; backup = storage * 0.1
    let storage_hourly = 100.0 * 0.10 / HOURS_PER_MONTH;
    let expected = 0.10 + storage_hourly + storage_hourly * 0.1;
    let entry = &report.service_breakdown[0];
    assert!((entry.hourly_cost - expected).abs() < 1e-6);
    assert!((entry.hourly_cost - 0.1151).abs() < 1e-3);
}

#[tokio::test]
async fn test_mixed_architecture_skips_unrecognized_type() {
    let source = StaticSource {
        rules: vec![
            Rule {
                service_code: "AmazonEC2",
                required: vec![filter("instanceType", "t3.micro")],
                records: vec![rec("Hrs", 0.0116, "On Demand Linux t3.micro")],
            },
            Rule {
                service_code: "AmazonS3",
                required: vec![filter("volumeType", "Standard")],
                records: vec![rec("GB-Mo", 0.023, "per GB-month of storage used")],
            },
        ],
    };
    let estimator = Estimator::new(Box::new(source), "us-east-1");
    let architecture = arch(json!([
        {"id": "web", "type": "AmazonEC2", "InstanceType": "t3.micro"},
        {"id": "bucket", "type": "AmazonS3", "Storage": 100},
        {"id": "mystery", "type": "AmazonQuantumThing"}
    ]));

    let report = estimator.estimate(&architecture).await;

    assert_eq!(report.service_breakdown.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].node_id, "mystery");
    assert!(report.warnings[0].reason.contains("unrecognized node type"));

    let sum: f64 = report.service_breakdown.iter().map(|e| e.hourly_cost).sum();
    assert_eq!(report.total_hourly_cost_usd, sum);
}

#[tokio::test]
async fn test_empty_catalog_yields_zero_cost_and_warning() {
    let estimator = Estimator::new(Box::new(StaticSource { rules: vec![] }), "us-east-1");
    let architecture = arch(json!([
        {"id": "web", "type": "AmazonEC2", "InstanceType": "t3.micro"}
    ]));

    let report = estimator.estimate(&architecture).await;

    assert_eq!(report.service_breakdown.len(), 1);
    assert_eq!(report.service_breakdown[0].hourly_cost, 0.0);
    assert!(report.service_breakdown[0].missing_price_data);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].reason, "missing price data");
}

#[tokio::test]
async fn test_conversion_invariants() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "ap-south-1");
    let architecture = arch(json!([
        {"id": "web", "type": "AmazonEC2", "InstanceType": "t3.micro", "quantity": 3}
    ]));

    let report = estimator.estimate(&architecture).await;

    assert_eq!(
        report.estimated_monthly_cost_usd,
        report.total_hourly_cost_usd * HOURS_PER_MONTH
    );
    assert_eq!(
        report.estimated_yearly_cost_usd,
        report.estimated_monthly_cost_usd * 12.0
    );
}

#[tokio::test]
async fn test_estimation_is_idempotent() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "ap-south-1");
    let architecture = arch(json!([
        {"id": "web", "type": "AmazonEC2", "InstanceType": "t3.micro"},
        {"id": "mystery", "type": "SomethingElse"},
        {"id": "rover", "type": "AmazonEC2", "region": "mars-west-1"}
    ]));

    let first = estimator.estimate(&architecture).await;
    let second = estimator.estimate(&architecture).await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_node_without_type_is_warned_and_omitted() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "ap-south-1");
    let architecture = arch(json!([{"id": "untyped"}]));

    let report = estimator.estimate(&architecture).await;

    assert!(report.service_breakdown.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].reason, "missing node type");
}

#[tokio::test]
async fn test_default_region_applied_when_node_omits_one() {
    let estimator = Estimator::new(Box::new(ec2_micro_source()), "ap-south-1");
    let architecture = arch(json!([
        {"id": "web", "type": "AmazonEC2", "InstanceType": "t3.micro"}
    ]));

    let report = estimator.estimate(&architecture).await;

    // ap-south-1 resolves to the Mumbai display name the rule requires
    assert!((report.total_hourly_cost_usd - 0.0116).abs() < 1e-9);
}

#[test]
fn test_missing_nodes_list_is_fatal() {
    let err = Architecture::from_json_str(r#"{"title": "no nodes here"}"#).unwrap_err();
    assert!(matches!(
        err,
        archcost::error::ArchcostError::Structural(_)
    ));
}
