//! # Tax Rate Resolution
//!
//! Picks the tax rate for a destination from a set of location rules.
//!
//! ## Specificity Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve("BD", "Dhaka", "Dhaka")                                        │
//! │                                                                         │
//! │  1. (BD, Dhaka, Dhaka)   exact city          ── miss                    │
//! │  2. (BD, Dhaka, "")      region-wide         ── HIT → 7.5%              │
//! │  3. (BD, "",    "")      country-wide        (not reached)              │
//! │  4. is_default row                            (not reached)             │
//! │  5. 0                                         (not reached)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first match wins. Resolution never fails: with no match and no
//! default row the rate is zero. Location parts are compared trimmed and
//! ASCII case-insensitively, so "dhaka" and "Dhaka " select the same row.
//! When several rows share a key, the first one in the given slice wins;
//! the repository hands rules over oldest first.

use serde::Serialize;

use crate::types::{TaxRate, TaxRateRule};

/// How a rule matched a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMatch {
    City,
    Region,
    Country,
    Default,
    /// Nothing matched; the rate is zero.
    None,
}

/// Resolves the tax rate for `(country, region, city)`.
pub fn resolve_tax_rate(rules: &[TaxRateRule], country: &str, region: &str, city: &str) -> TaxRate {
    resolve_tax_rule(rules, country, region, city)
        .0
        .map(TaxRateRule::rate)
        .unwrap_or_default()
}

/// Resolves the matching rule itself, plus how it matched.
pub fn resolve_tax_rule<'a>(
    rules: &'a [TaxRateRule],
    country: &str,
    region: &str,
    city: &str,
) -> (Option<&'a TaxRateRule>, TaxMatch) {
    let country = country.trim();
    let region = region.trim();
    let city = city.trim();

    let find = |want_region: &str, want_city: &str| {
        rules.iter().find(|rule| {
            same(&rule.country, country) && same(&rule.region, want_region) && same(&rule.city, want_city)
        })
    };

    if !country.is_empty() {
        if !city.is_empty() {
            if let Some(rule) = find(region, city) {
                return (Some(rule), TaxMatch::City);
            }
        }
        if !region.is_empty() {
            if let Some(rule) = find(region, "") {
                return (Some(rule), TaxMatch::Region);
            }
        }
        if let Some(rule) = find("", "") {
            return (Some(rule), TaxMatch::Country);
        }
    }

    match rules.iter().find(|rule| rule.is_default) {
        Some(rule) => (Some(rule), TaxMatch::Default),
        None => (None, TaxMatch::None),
    }
}

#[inline]
fn same(stored: &str, wanted: &str) -> bool {
    stored.trim().eq_ignore_ascii_case(wanted)
}

// =============================================================================
// Unit Tests
// =============================================================================
