//! Property tests for attribute normalization

use archcost::normalize::{coerce_number, parse_memory_mb, parse_size_gb, resolve_region};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn size_gb_suffix_scales_by_1024(n in 1u32..10_000) {
        let tb = parse_size_gb(Some(&json!(format!("{}TB", n))), 0.0);
        let gb = parse_size_gb(Some(&json!(format!("{}GB", n))), 0.0);
        prop_assert_eq!(tb, gb * 1024.0);
    }

    #[test]
    fn size_gb_bare_number_is_gb(n in 0u32..1_000_000) {
        let from_str = parse_size_gb(Some(&json!(n.to_string())), 0.0);
        let from_num = parse_size_gb(Some(&json!(n)), 0.0);
        prop_assert_eq!(from_str, n as f64);
        prop_assert_eq!(from_num, n as f64);
    }

    #[test]
    fn size_gb_never_panics_and_falls_back(s in "\\PC*") {
        let v = parse_size_gb(Some(&json!(s)), 42.0);
        // Either parsed to a finite number or the fallback
        prop_assert!(v.is_finite());
    }

    #[test]
    fn memory_gb_is_1024x_mb(n in 1u32..1024) {
        let gb = parse_memory_mb(Some(&json!(format!("{}GB", n))), 0.0);
        let mb = parse_memory_mb(Some(&json!(format!("{}MB", n))), 0.0);
        prop_assert_eq!(gb, mb * 1024.0);
    }

    #[test]
    fn coerce_number_never_panics(s in "\\PC*") {
        let v = coerce_number(Some(&json!(s)), 0.0);
        prop_assert!(v.is_finite());
    }

    #[test]
    fn coerce_number_million_scales(n in 1u32..1000) {
        let v = coerce_number(Some(&json!(format!("{} million", n))), 0.0);
        prop_assert_eq!(v, n as f64 * 1_000_000.0);
    }

    #[test]
    fn resolve_region_never_panics(s in "\\PC*") {
        let _ = resolve_region(&s);
    }
}

#[test]
fn documented_parse_examples() {
    assert_eq!(parse_size_gb(Some(&json!("2TB")), 0.0), 2048.0);
    assert_eq!(parse_size_gb(Some(&json!("512MB")), 0.0), 0.5);
    assert_eq!(parse_size_gb(Some(&json!("100")), 0.0), 100.0);
    assert_eq!(parse_size_gb(Some(&json!("bogus")), 7.5), 7.5);
}
