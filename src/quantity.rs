//! Parsing and comparison of Kubernetes resource quantity strings.
//!
//! Quota usage vectors carry opaque `Quantity` strings ("100m", "2", "512Mi").
//! The quota comparator only needs a partial order per resource name, so
//! quantities are normalized to `f64` in base units before comparing.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::warn;

/// Parse a Kubernetes quantity string to a base-unit value.
///
/// Examples:
/// - `"100m"` -> `0.1`
/// - `"2"` -> `2.0`
/// - `"128Mi"` -> `134217728.0`
/// - `"1G"` -> `1000000000.0`
/// - `"12e3"` -> `12000.0`
///
/// Suffixes are case-sensitive: `m` is milli, `k M G T P E` are decimal,
/// `Ki Mi Gi Ti Pi Ei` are binary. Exponent forms parse as plain floats.
#[must_use]
pub fn parse_quantity(quantity: &str) -> Option<f64> {
    let quantity = quantity.trim();

    if quantity.is_empty() {
        return None;
    }

    // Binary suffixes first so "Mi" is not read as a decimal "M" quantity
    // with trailing garbage.
    const BINARY: [(&str, f64); 6] = [
        ("Ki", 1024.0),
        ("Mi", 1024.0 * 1024.0),
        ("Gi", 1024.0 * 1024.0 * 1024.0),
        ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
        ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
        ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ];
    for (suffix, multiplier) in BINARY {
        if let Some(digits) = quantity.strip_suffix(suffix) {
            return digits.parse::<f64>().ok().map(|value| value * multiplier);
        }
    }

    const DECIMAL: [(&str, f64); 7] = [
        ("m", 1e-3),
        ("k", 1e3),
        ("M", 1e6),
        ("G", 1e9),
        ("T", 1e12),
        ("P", 1e15),
        ("E", 1e18),
    ];
    for (suffix, multiplier) in DECIMAL {
        if let Some(digits) = quantity.strip_suffix(suffix) {
            return digits.parse::<f64>().ok().map(|value| value * multiplier);
        }
    }

    // Plain integers, decimals and exponent notation ("12e3").
    quantity.parse::<f64>().ok()
}

/// Compare two quantities, `a <= b`.
///
/// Unparseable quantities are logged and treated as not comparable, so a
/// malformed usage value can never satisfy a sync expectation.
#[must_use]
pub fn less_than_or_equal(a: &Quantity, b: &Quantity) -> bool {
    match (parse_quantity(&a.0), parse_quantity(&b.0)) {
        (Some(left), Some(right)) => left <= right,
        _ => {
            warn!("uncomparable quantities {:?} and {:?}", a.0, b.0);
            false
        }
    }
}
