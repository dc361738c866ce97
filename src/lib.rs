//! # Item Shop
//!
//! Watches the Fortnite item shop and, whenever the catalog changes, renders
//! it as one shareable JPEG and posts it to Twitter.
//!
//! # Architecture: One Poll Cycle
//!
//! ```text
//! 1. Track     catalog API  →  CatalogSnapshot   (hash changed since last commit?)
//! 2. Render    snapshot     →  itemshop.jpeg     (grid of rarity-styled cards)
//! 3. Publish   itemshop.jpeg → tweet             (optional, OAuth 1.0a)
//! ```
//!
//! The [`bot`] runs the cycle on a fixed interval. Only the last committed
//! catalog hash survives between cycles; everything else is recomputed from
//! the fetched payload, so a failed render or publish is simply retried on the
//! next poll.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`tracker`] | Polls the catalog endpoint, detects new catalogs by hash |
//! | [`catalog`] | Catalog payload shape: snapshot split into sections, per-entry parsing |
//! | [`layout`] | Pure grid geometry: canvas size and card origins |
//! | [`rarity`] | Rarity → accent color and template asset names |
//! | [`card`] | Draws one 310×510 item card |
//! | [`shop`] | Composes background, title and both card sections; writes the JPEG |
//! | [`imaging`] | Asset and typeface seams plus the pixel operations behind them |
//! | [`cache`] | On-disk icon cache keyed by URL hash |
//! | [`publish`] | Caption, publisher policy and the OAuth-signed Twitter client |
//! | [`date`] | Localized date labels for the title and caption |
//! | [`bot`] | The poll/render/publish loop and its commit policy |
//! | [`config`] | `configuration.json` loading, stock defaults, validation |
//! | [`output`] | CLI output formatting for `render` and `check` |
//!
//! # Design Decisions
//!
//! ## Trait Seams at Every Side Effect
//!
//! Network and filesystem access sit behind small traits:
//! [`tracker::CatalogSource`], [`imaging::AssetProvider`], [`imaging::Typeface`]
//! and [`publish::SocialClient`]. The rendering code only sees the traits, so
//! the whole cycle runs in tests against in-memory assets, a block typeface
//! and a recording client.
//!
//! ## Degrade, Don't Abort
//!
//! A missing background, rarity template or currency glyph falls back and
//! logs a warning. A malformed entry skips its card. Only an empty catalog,
//! an unusable font or a failed write aborts the render, and none of these
//! stop the loop.
//!
//! ## Blocking I/O on One Thread
//!
//! The loop polls at most every few seconds and does one thing at a time, so
//! it uses blocking `reqwest` on tokio's blocking pool. The main thread only
//! waits for Ctrl-C or for the loop to die.

pub mod bot;
pub mod cache;
pub mod card;
pub mod catalog;
pub mod config;
pub mod date;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod publish;
pub mod rarity;
pub mod shop;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_helpers;
