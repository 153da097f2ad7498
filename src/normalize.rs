//! Attribute normalization
//!
//! Architecture nodes arrive from an LLM generator, so service-specific
//! fields show up in whatever shape the model produced: sizes as "100GB",
//! "2TB" or bare numbers, memory as "256MB", counts as "2 million", regions
//! as either codes or catalog display names. Everything here converts those
//! into canonical numeric values, falling back to a caller-supplied default
//! instead of failing.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

const GB_PER_TB: f64 = 1024.0;
const MB_PER_GB: f64 = 1024.0;

fn leading_number(s: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\s*(\d+\.?\d*|\.\d+)").expect("valid regex"));
    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parse a storage size attribute ("100GB", "500MB", "2TB", bare number) into GB.
///
/// A bare number is taken as GB. Unparseable input returns `default`.
pub fn parse_size_gb(value: Option<&Value>, default: f64) -> f64 {
    let Some(value) = value else { return default };
    if let Some(n) = value.as_f64() {
        return n;
    }
    let Some(s) = value.as_str() else { return default };
    let upper = s.trim().to_uppercase();
    let Some(num) = leading_number(&upper) else {
        return default;
    };
    if upper.contains("TB") {
        num * GB_PER_TB
    } else if upper.contains("MB") {
        num / MB_PER_GB
    } else {
        // "GB" suffix or no unit at all
        num
    }
}

/// Parse a memory size attribute ("256MB", "1GB", bare number) into MB.
pub fn parse_memory_mb(value: Option<&Value>, default: f64) -> f64 {
    let Some(value) = value else { return default };
    if let Some(n) = value.as_f64() {
        return n;
    }
    let Some(s) = value.as_str() else { return default };
    let upper = s.trim().to_uppercase();
    let Some(num) = leading_number(&upper) else {
        return default;
    };
    if upper.contains("GB") {
        num * MB_PER_GB
    } else {
        // "MB" suffix or no unit at all
        num
    }
}

/// Convert almost-anything to a float, for counts and quantities.
///
/// Numbers pass through. Strings are reduced to their leading numeric token
/// with `TB`, `million` and `billion` magnitude words applied. Total failure
/// returns `default`; this never errors, per the open-shape input contract.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    let Some(value) = value else { return default };
    if let Some(n) = value.as_f64() {
        return n;
    }
    let Some(s) = value.as_str() else { return default };
    let lower = s.trim().to_lowercase();
    if lower.is_empty() {
        return default;
    }
    let Some(num) = leading_number(&lower) else {
        return default;
    };
    if lower.contains("tb") || lower.contains("terabyte") {
        num * GB_PER_TB
    } else if lower.contains("billion") {
        num * 1_000_000_000.0
    } else if lower.contains("million") {
        num * 1_000_000.0
    } else {
        num
    }
}

/// Outcome of region resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionResolution {
    /// Pricing API location display name, e.g. "Asia Pacific (Mumbai)"
    Location(String),
    /// Region not present in the lookup table; callers skip pricing and warn
    Unmapped(String),
}

fn region_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("us-east-1", "US East (N. Virginia)"),
            ("us-east-2", "US East (Ohio)"),
            ("us-west-1", "US West (N. California)"),
            ("us-west-2", "US West (Oregon)"),
            ("ap-south-1", "Asia Pacific (Mumbai)"),
            ("ap-northeast-1", "Asia Pacific (Tokyo)"),
            ("ap-northeast-2", "Asia Pacific (Seoul)"),
            ("ap-southeast-1", "Asia Pacific (Singapore)"),
            ("ap-southeast-2", "Asia Pacific (Sydney)"),
            ("ca-central-1", "Canada (Central)"),
            ("eu-central-1", "EU (Frankfurt)"),
            ("eu-west-1", "EU (Ireland)"),
            ("eu-west-2", "EU (London)"),
            ("eu-west-3", "EU (Paris)"),
            ("sa-east-1", "South America (Sao Paulo)"),
        ])
    })
}

/// Map an AWS region code to its Pricing API location display name.
///
/// Values that already are a known display name pass through unchanged.
/// Unknown codes produce `Unmapped` rather than an error; the node is
/// skipped for pricing and surfaced in the report warnings.
pub fn resolve_region(region: &str) -> RegionResolution {
    let table = region_table();
    if let Some(location) = table.get(region) {
        return RegionResolution::Location((*location).to_string());
    }
    if table.values().any(|v| *v == region) {
        return RegionResolution::Location(region.to_string());
    }
    RegionResolution::Unmapped(region.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_size_gb_units() {
        assert_eq!(parse_size_gb(Some(&json!("2TB")), 0.0), 2048.0);
        assert_eq!(parse_size_gb(Some(&json!("512MB")), 0.0), 0.5);
        assert_eq!(parse_size_gb(Some(&json!("100GB")), 0.0), 100.0);
        assert_eq!(parse_size_gb(Some(&json!("100")), 0.0), 100.0);
        assert_eq!(parse_size_gb(Some(&json!(100)), 0.0), 100.0);
        assert_eq!(parse_size_gb(Some(&json!(1.5)), 0.0), 1.5);
    }

    #[test]
    fn test_parse_size_gb_fallback() {
        assert_eq!(parse_size_gb(Some(&json!("bogus")), 20.0), 20.0);
        assert_eq!(parse_size_gb(Some(&json!(null)), 20.0), 20.0);
        assert_eq!(parse_size_gb(None, 20.0), 20.0);
    }

    #[test]
    fn test_parse_size_gb_case_insensitive() {
        assert_eq!(parse_size_gb(Some(&json!("2tb")), 0.0), 2048.0);
        assert_eq!(parse_size_gb(Some(&json!("50 gb")), 0.0), 50.0);
    }

    #[test]
    fn test_parse_memory_mb() {
        assert_eq!(parse_memory_mb(Some(&json!("256MB")), 128.0), 256.0);
        assert_eq!(parse_memory_mb(Some(&json!("1GB")), 128.0), 1024.0);
        assert_eq!(parse_memory_mb(Some(&json!(512)), 128.0), 512.0);
        assert_eq!(parse_memory_mb(Some(&json!("oops")), 128.0), 128.0);
    }

    #[test]
    fn test_coerce_number_magnitudes() {
        assert_eq!(coerce_number(Some(&json!("2 million")), 0.0), 2_000_000.0);
        assert_eq!(coerce_number(Some(&json!("1 billion")), 0.0), 1_000_000_000.0);
        assert_eq!(coerce_number(Some(&json!("3 TB")), 0.0), 3072.0);
        assert_eq!(coerce_number(Some(&json!(42)), 0.0), 42.0);
        assert_eq!(coerce_number(Some(&json!("17")), 0.0), 17.0);
    }

    #[test]
    fn test_coerce_number_fallback() {
        assert_eq!(coerce_number(Some(&json!("")), 5.0), 5.0);
        assert_eq!(coerce_number(Some(&json!("many")), 0.0), 0.0);
        assert_eq!(coerce_number(Some(&json!({"a": 1})), 1.0), 1.0);
        assert_eq!(coerce_number(None, 9.0), 9.0);
    }

    #[test]
    fn test_resolve_region_code() {
        assert_eq!(
            resolve_region("ap-south-1"),
            RegionResolution::Location("Asia Pacific (Mumbai)".to_string())
        );
        assert_eq!(
            resolve_region("us-east-1"),
            RegionResolution::Location("US East (N. Virginia)".to_string())
        );
    }

    #[test]
    fn test_resolve_region_display_name_passthrough() {
        assert_eq!(
            resolve_region("EU (Frankfurt)"),
            RegionResolution::Location("EU (Frankfurt)".to_string())
        );
    }

    #[test]
    fn test_resolve_region_unmapped() {
        assert_eq!(
            resolve_region("mars-west-1"),
            RegionResolution::Unmapped("mars-west-1".to_string())
        );
    }
}
