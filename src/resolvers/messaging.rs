//! Queue (SQS) and topic (SNS) cost resolvers
//!
//! Both bill per million requests, hourly-normalized. SNS additionally
//! carries a flat per-topic charge when the catalog publishes one; SQS has
//! no per-queue charge, the queue count is kept for display only.

use super::{make_entry, ResolverCtx};
use crate::architecture::{Node, ServiceType};
use crate::catalog::{dimension_matching, Filter};
use crate::normalize::coerce_number;
use crate::report::{CostEntry, HOURS_PER_MONTH};
use std::collections::BTreeMap;

const DEFAULT_MONTHLY_REQUESTS: f64 = 1_000_000.0;
const DEFAULT_TOPIC_COUNT: f64 = 5.0;

pub async fn resolve_queue(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let requests = coerce_number(
        node.attr(&["RequestsPerMonth", "MonthlyRequests", "monthly_requests"]),
        DEFAULT_MONTHLY_REQUESTS,
    );
    let queue_count = coerce_number(node.attr(&["QueueCount", "queue_count"]), 1.0);

    let records = ctx.query("AmazonSQS", &ctx.base_filters()).await;
    let request_price = dimension_matching(&records, &["request"]);

    let hourly = (requests / 1_000_000.0) * request_price.map(|r| r.amount).unwrap_or(0.0)
        / HOURS_PER_MONTH;

    let mut fields = BTreeMap::new();
    fields.insert("monthly_requests".to_string(), format!("{}", requests));
    fields.insert("queue_count".to_string(), format!("{}", queue_count));

    make_entry(node, ServiceType::Sqs, hourly, fields, request_price.is_none())
}

pub async fn resolve_topic(node: &Node, ctx: &ResolverCtx<'_>) -> CostEntry {
    let publishes = coerce_number(
        node.attr(&["RequestsPerMonth", "monthly_publishes", "MonthlyPublishes"]),
        DEFAULT_MONTHLY_REQUESTS,
    );
    let topic_count = coerce_number(
        node.attr(&["TopicCount", "topic_count"]),
        DEFAULT_TOPIC_COUNT,
    );

    let records = ctx.query("AmazonSNS", &ctx.base_filters()).await;
    let delivery_price = dimension_matching(&records, &["request", "delivery"]);

    let mut topic_filters = ctx.base_filters();
    topic_filters.push(Filter::new("productFamily", "Topic"));
    let topic_records = ctx.query("AmazonSNS", &topic_filters).await;
    let topic_price = topic_records.first();

    let monthly = (publishes / 1_000_000.0) * delivery_price.map(|r| r.amount).unwrap_or(0.0)
        + topic_count * topic_price.map(|r| r.amount).unwrap_or(0.0);
    let hourly = monthly / HOURS_PER_MONTH;

    let mut fields = BTreeMap::new();
    fields.insert("monthly_publishes".to_string(), format!("{}", publishes));
    fields.insert("topic_count".to_string(), format!("{}", topic_count));

    make_entry(node, ServiceType::Sns, hourly, fields, delivery_price.is_none())
}
