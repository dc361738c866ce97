//! Catalog payload schema and entry validation.
//!
//! The catalog endpoint answers with
//!
//! ```json
//! { "data": { "hash": "…", "featured": { "entries": [ … ] }, "daily": { "entries": [ … ] } } }
//! ```
//!
//! The envelope is parsed strictly: a missing `data.hash` makes the whole
//! payload unusable. Entries are kept as raw JSON and validated one at a time
//! by [`Entry::parse`], so a single malformed listing only costs its own card.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why an entry could not be turned into a card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("malformed entry: {0}")]
    Malformed(String),
    #[error("missing field `{0}`")]
    Missing(&'static str),
}

/// One parsed catalog state. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub hash: String,
    /// Raw featured entries, in catalog order.
    pub featured: Vec<Value>,
    /// Raw daily entries, in catalog order.
    pub daily: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<ShopData>,
}

#[derive(Debug, Deserialize)]
struct ShopData {
    hash: Option<String>,
    featured: Option<SectionData>,
    daily: Option<SectionData>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionData {
    #[serde(default)]
    entries: Vec<Value>,
}

/// Envelope-level parse failure.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog payload has no `data.hash`")]
    MissingHash,
}

impl CatalogSnapshot {
    /// Parse a full response body (the object holding `data`).
    pub fn from_payload(payload: Value) -> Result<Self, PayloadError> {
        let envelope: Envelope = serde_json::from_value(payload)?;
        let data = envelope.data.ok_or(PayloadError::MissingHash)?;
        let hash = data.hash.ok_or(PayloadError::MissingHash)?;
        Ok(Self {
            hash,
            featured: data.featured.unwrap_or_default().entries,
            daily: data.daily.unwrap_or_default().entries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.daily.is_empty()
    }
}

/// A validated catalog listing, ready to be drawn as one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Display name, lowercase as resolved (the renderer uppercases).
    pub item_name: String,
    /// Lowercase rarity id, e.g. `"legendary"`.
    pub rarity_id: String,
    /// Lowercase category id, e.g. `"outfit"`; `"bundle"` for bundles.
    pub category_id: String,
    pub final_price: u64,
    pub icon_url: String,
    pub is_bundle: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    final_price: Option<u64>,
    #[serde(default)]
    items: Vec<WireItem>,
    bundle: Option<WireBundle>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    name: Option<String>,
    rarity: Option<WireValue>,
    #[serde(rename = "type")]
    kind: Option<WireValue>,
    images: Option<WireImages>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireImages {
    featured: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireBundle {
    name: Option<String>,
    image: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Entry {
    /// Validate one raw entry.
    ///
    /// Display fields come from the first item of the listing. When the
    /// listing is a bundle, the bundle's own name and image replace the
    /// item's, and the category becomes `"bundle"`.
    pub fn parse(raw: &Value) -> Result<Self, SkipReason> {
        let wire: WireEntry = serde_json::from_value(raw.clone())
            .map_err(|e| SkipReason::Malformed(e.to_string()))?;

        let final_price = wire.final_price.ok_or(SkipReason::Missing("finalPrice"))?;
        let item = wire.items.into_iter().next().ok_or(SkipReason::Missing("items"))?;

        let mut item_name = non_empty(item.name).ok_or(SkipReason::Missing("items[0].name"))?;
        let rarity_id = item
            .rarity
            .and_then(|r| non_empty(r.value))
            .ok_or(SkipReason::Missing("items[0].rarity.value"))?;
        let mut category_id = item
            .kind
            .and_then(|k| non_empty(k.value))
            .ok_or(SkipReason::Missing("items[0].type.value"))?;
        let images = item.images.ok_or(SkipReason::Missing("items[0].images"))?;
        let mut icon_url = non_empty(images.featured)
            .or_else(|| non_empty(images.icon))
            .ok_or(SkipReason::Missing("items[0].images.icon"))?;

        let is_bundle = wire.bundle.is_some();
        if let Some(bundle) = wire.bundle {
            icon_url = non_empty(bundle.image).ok_or(SkipReason::Missing("bundle.image"))?;
            item_name = non_empty(bundle.name).ok_or(SkipReason::Missing("bundle.name"))?;
            category_id = "bundle".to_string();
        }

        Ok(Self {
            item_name: item_name.to_lowercase(),
            rarity_id: rarity_id.to_lowercase(),
            category_id: category_id.to_lowercase(),
            final_price,
            icon_url,
            is_bundle,
        })
    }
}
