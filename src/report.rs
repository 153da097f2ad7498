//! Architecture cost report
//!
//! Output shape for one estimation run: per-node breakdown entries, report
//! warnings for every degraded node, and hourly/monthly/yearly totals. The
//! stored totals are exact (monthly = hourly x 730, yearly = monthly x 12);
//! rounding to the declared precision (6 decimal places hourly, 2 monthly)
//! happens only at text-rendering time so that re-running a fixed input
//! against a fixed catalog snapshot serializes byte-identically.

use chrono::Utc;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::style;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed average hours per month used for all hourly<->monthly conversion.
/// Not calendar-accurate; kept constant for reproducibility.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Round to the declared per-entry precision (6 decimal places)
pub fn round_hourly(amount: f64) -> f64 {
    (amount * 1e6).round() / 1e6
}

/// One resolver's output for one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub node_id: String,
    pub service_type: String,
    pub description: String,
    /// Always >= 0; zero when the catalog had no matching price
    pub hourly_cost: f64,
    /// The attribute values the resolver actually used, for audit/display
    pub descriptive_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub missing_price_data: bool,
}

/// One degraded node and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub node_id: String,
    pub reason: String,
}

/// Aggregated output of one estimation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_hourly_cost_usd: f64,
    pub estimated_monthly_cost_usd: f64,
    pub estimated_yearly_cost_usd: f64,
    pub service_breakdown: Vec<CostEntry>,
    pub warnings: Vec<ReportWarning>,
}

impl Report {
    /// Build a report from breakdown entries, deriving the totals.
    pub fn from_breakdown(service_breakdown: Vec<CostEntry>, warnings: Vec<ReportWarning>) -> Self {
        let total_hourly: f64 = service_breakdown.iter().map(|e| e.hourly_cost).sum();
        let monthly = total_hourly * HOURS_PER_MONTH;
        Self {
            total_hourly_cost_usd: total_hourly,
            estimated_monthly_cost_usd: monthly,
            estimated_yearly_cost_usd: monthly * 12.0,
            service_breakdown,
            warnings,
        }
    }

    /// Render a human-readable summary with the breakdown table.
    pub fn render_text(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Node", "Service", "Hourly Cost", "Details"]);

        for entry in &self.service_breakdown {
            let details = entry
                .descriptive_fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            let cost = if entry.missing_price_data {
                format!("${:.6} (no price data)", entry.hourly_cost)
            } else {
                format!("${:.6}", entry.hourly_cost)
            };
            table.add_row(vec![
                Cell::new(&entry.description),
                Cell::new(&entry.service_type),
                Cell::new(cost),
                Cell::new(details),
            ]);
        }

        let mut out = String::new();
        out.push_str(&format!(
            "{}\n",
            style("=== AWS Cost Estimation Summary ===").bold()
        ));
        out.push_str(&format!("Generated at: {}\n\n", Utc::now().to_rfc3339()));
        out.push_str(&table.to_string());
        out.push('\n');
        out.push_str(&format!(
            "Total Hourly Cost:  {}\n",
            style(format!("${:.6}", self.total_hourly_cost_usd)).green()
        ));
        out.push_str(&format!(
            "Estimated Monthly:  {}\n",
            style(format_currency(self.estimated_monthly_cost_usd)).green()
        ));
        out.push_str(&format!(
            "Estimated Yearly:   {}\n",
            style(format_currency(self.estimated_yearly_cost_usd)).green()
        ));

        if !self.warnings.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                style("Warnings (zero-cost entries are not necessarily free):").yellow()
            ));
            for w in &self.warnings {
                out.push_str(&format!("  - {}: {}\n", w.node_id, w.reason));
            }
        }
        out
    }
}

/// Format a dollar amount with thousands separators and 2 decimal places
pub fn format_currency(amount: f64) -> String {
    let total_cents = (amount.abs() * 100.0).round() as u64;
    let (whole, cents) = (total_cents / 100, total_cents % 100);
    let mut digits = whole.to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let split = digits.len() - 3;
        grouped = format!(",{}{}", &digits[split..], grouped);
        digits.truncate(split);
    }
    grouped = format!("{}{}", digits, grouped);
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("${}{}.{:02}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, cost: f64) -> CostEntry {
        CostEntry {
            node_id: id.to_string(),
            service_type: "AmazonEC2".to_string(),
            description: id.to_string(),
            hourly_cost: cost,
            descriptive_fields: BTreeMap::new(),
            missing_price_data: false,
        }
    }

    #[test]
    fn test_totals_derive_exactly() {
        let report = Report::from_breakdown(vec![entry("a", 0.01), entry("b", 0.02)], vec![]);
        let sum: f64 = report.service_breakdown.iter().map(|e| e.hourly_cost).sum();
        assert_eq!(report.total_hourly_cost_usd, sum);
        assert_eq!(
            report.estimated_monthly_cost_usd,
            report.total_hourly_cost_usd * HOURS_PER_MONTH
        );
        assert_eq!(
            report.estimated_yearly_cost_usd,
            report.estimated_monthly_cost_usd * 12.0
        );
    }

    #[test]
    fn test_empty_breakdown() {
        let report = Report::from_breakdown(vec![], vec![]);
        assert_eq!(report.total_hourly_cost_usd, 0.0);
        assert_eq!(report.estimated_monthly_cost_usd, 0.0);
    }

    #[test]
    fn test_round_hourly() {
        assert_eq!(round_hourly(0.12345678), 0.123457);
        assert_eq!(round_hourly(0.0), 0.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(8.47), "$8.47");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn test_render_text_includes_warnings() {
        let report = Report::from_breakdown(
            vec![entry("web", 0.0116)],
            vec![ReportWarning {
                node_id: "db".to_string(),
                reason: "unmapped region: mars-west-1".to_string(),
            }],
        );
        let text = report.render_text();
        assert!(text.contains("mars-west-1"));
        assert!(text.contains("$0.011600"));
    }
}
