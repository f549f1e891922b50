//! Vendor identification.
//!
//! A process-wide, read-only registry loaded once and never mutated after
//! first use, applied to vendor lookups.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Category;

/// A resolved vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
    pub canonical_name: String,
    pub category: Category,
}

struct RegistryEntry {
    canonical_name: &'static str,
    category: Category,
}

/// Alphabetically-keyed by registrable domain.
static REGISTRY: Lazy<BTreeMap<&'static str, RegistryEntry>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        "amazon.com",
        RegistryEntry {
            canonical_name: "Amazon",
            category: Category::Retail,
        },
    );
    m.insert(
        "apple.com",
        RegistryEntry {
            canonical_name: "Apple",
            category: Category::Software,
        },
    );
    m.insert(
        "doordash.com",
        RegistryEntry {
            canonical_name: "DoorDash",
            category: Category::Groceries,
        },
    );
    m.insert(
        "ebay.com",
        RegistryEntry {
            canonical_name: "eBay",
            category: Category::Retail,
        },
    );
    m.insert(
        "grubhub.com",
        RegistryEntry {
            canonical_name: "Grubhub",
            category: Category::Groceries,
        },
    );
    m.insert(
        "instacart.com",
        RegistryEntry {
            canonical_name: "Instacart",
            category: Category::Groceries,
        },
    );
    m.insert(
        "lyft.com",
        RegistryEntry {
            canonical_name: "Lyft",
            category: Category::RideShare,
        },
    );
    m.insert(
        "netflix.com",
        RegistryEntry {
            canonical_name: "Netflix",
            category: Category::Streaming,
        },
    );
    m.insert(
        "spotify.com",
        RegistryEntry {
            canonical_name: "Spotify",
            category: Category::Streaming,
        },
    );
    m.insert(
        "target.com",
        RegistryEntry {
            canonical_name: "Target",
            category: Category::Retail,
        },
    );
    m.insert(
        "uber.com",
        RegistryEntry {
            canonical_name: "Uber",
            category: Category::RideShare,
        },
    );
    m.insert(
        "walmart.com",
        RegistryEntry {
            canonical_name: "Walmart",
            category: Category::Retail,
        },
    );
    m
});

/// Fixed subject-pattern fallback table, tried in order when the domain
/// registry misses entirely. Re-ordering this list is a breaking change.
static SUBJECT_PATTERNS: Lazy<Vec<(Regex, &'static str, Category)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)\buber\b").unwrap(),
            "Uber",
            Category::RideShare,
        ),
        (
            Regex::new(r"(?i)\blyft\b").unwrap(),
            "Lyft",
            Category::RideShare,
        ),
        (
            Regex::new(r"(?i)\bamazon\b").unwrap(),
            "Amazon",
            Category::Retail,
        ),
        (
            Regex::new(r"(?i)\bnetflix\b").unwrap(),
            "Netflix",
            Category::Streaming,
        ),
    ]
});

/// Returns whether `domain` (or one of its registrable-suffix strips) is a
/// known commerce domain — used by the quick filter.
pub fn is_commerce_domain(domain: &str) -> bool {
    lookup_by_domain(domain).is_some()
}

fn lookup_by_domain(domain: &str) -> Option<Vendor> {
    let domain = domain.to_lowercase();
    let mut labels: Vec<&str> = domain.split('.').collect();
    while !labels.is_empty() {
        let candidate = labels.join(".");
        if let Some(entry) = REGISTRY.get(candidate.as_str()) {
            return Some(Vendor {
                canonical_name: entry.canonical_name.to_string(),
                category: entry.category.clone(),
            });
        }
        labels.remove(0);
    }
    None
}

/// Identify the vendor behind a commerce email: domain registry (with
/// successive-label stripping), then subject-pattern fallback, then a
/// Title-cased derivation from the registrable domain with category
/// Unknown.
pub fn identify_vendor(sender_domain: &str, subject: &str) -> Vendor {
    if let Some(vendor) = lookup_by_domain(sender_domain) {
        return vendor;
    }
    for (pattern, name, category) in SUBJECT_PATTERNS.iter() {
        if pattern.is_match(subject) {
            return Vendor {
                canonical_name: name.to_string(),
                category: category.clone(),
            };
        }
    }
    Vendor {
        canonical_name: title_case_domain(sender_domain),
        category: Category::Unknown,
    }
}

fn title_case_domain(domain: &str) -> String {
    let registrable = registrable_label(domain);
    let mut chars = registrable.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}

fn registrable_label(domain: &str) -> String {
    let labels: Vec<&str> = domain.to_lowercase().split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2].to_string()
    } else {
        labels.first().unwrap_or(&"unknown").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_domain_match() {
        let v = identify_vendor("amazon.com", "your order shipped");
        assert_eq!(v.canonical_name, "Amazon");
        assert_eq!(v.category, Category::Retail);
    }

    #[test]
    fn subdomain_strips_to_registry_hit() {
        let v = identify_vendor("orders.amazon.com", "your order shipped");
        assert_eq!(v.canonical_name, "Amazon");
    }

    #[test]
    fn subject_pattern_fallback_on_domain_miss() {
        let v = identify_vendor("notifications.unknown-mailer.net", "Your Uber trip receipt");
        assert_eq!(v.canonical_name, "Uber");
        assert_eq!(v.category, Category::RideShare);
    }

    #[test]
    fn final_fallback_title_cases_domain() {
        let v = identify_vendor("shop.mycompany.io", "thanks for shopping");
        assert_eq!(v.canonical_name, "Mycompany");
        assert_eq!(v.category, Category::Unknown);
    }
}
