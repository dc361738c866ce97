//! Shared test fixtures: catalog payload builders.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let payload = catalog_payload("abc", 3, 2);
//! let snapshot = CatalogSnapshot::from_payload(payload).unwrap();
//! assert_eq!(snapshot.featured.len(), 3);
//! ```
//!
//! Icon URLs follow `https://cdn.example/<slug>/featured.png`, which the
//! mock asset provider in [`crate::imaging::backend::tests`] answers with a
//! solid square.

use serde_json::{Value, json};

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// A single-item listing as the catalog reports it.
pub fn item_entry(name: &str, rarity: &str, kind: &str, price: u64) -> Value {
    let slug = slug(name);
    json!({
        "regularPrice": price,
        "finalPrice": price,
        "bundle": null,
        "items": [{
            "id": format!("cid_{slug}"),
            "name": name,
            "rarity": { "value": rarity, "displayValue": rarity },
            "type": { "value": kind, "displayValue": kind },
            "images": {
                "smallIcon": format!("https://cdn.example/{slug}/small.png"),
                "icon": format!("https://cdn.example/{slug}/icon.png"),
                "featured": format!("https://cdn.example/{slug}/featured.png"),
            },
        }],
    })
}

/// A bundle listing whose first item is an epic outfit.
pub fn bundle_entry(name: &str, price: u64) -> Value {
    let mut entry = item_entry(&format!("{name} Outfit"), "epic", "outfit", price);
    entry["bundle"] = json!({
        "name": name,
        "info": "Bundle",
        "image": format!("https://cdn.example/bundles/{}.png", slug(name)),
    });
    entry
}

/// `featured` + `daily` generated entries, cycling through a few rarities.
pub fn catalog_payload(hash: &str, featured: usize, daily: usize) -> Value {
    const RARITIES: &[&str] = &["legendary", "epic", "rare", "uncommon"];
    let section = |prefix: &str, n: usize| -> Vec<Value> {
        (0..n)
            .map(|i| {
                item_entry(
                    &format!("{prefix} Item {i}"),
                    RARITIES[i % RARITIES.len()],
                    if i % 2 == 0 { "outfit" } else { "emote" },
                    800 + 100 * i as u64,
                )
            })
            .collect()
    };
    json!({
        "status": 200,
        "data": {
            "hash": hash,
            "date": "2026-10-18T00:00:00Z",
            "featured": { "name": "Featured", "entries": section("Featured", featured) },
            "daily": { "name": "Daily", "entries": section("Daily", daily) },
        },
    })
}
