//! Image composition primitives, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** templates, icons | `image::ImageReader`, `image::load_from_memory` |
//! | **Resize** icons, background | Lanczos3 cover resize |
//! | **Stack** layers | `imageops::replace` / `imageops::overlay` |
//! | **Text** | `rusttype` glyph coverage blended onto the canvas |
//! | **Encode** | baseline JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Encoding quality and per-category icon frames
//! - **Backend**: [`AssetProvider`] and [`Typeface`] traits
//! - **Operations**: Paste, text fitting and encoding built on the above
//! - **Disk assets / typeface**: the production backends

pub mod backend;
pub mod calculations;
pub mod disk_assets;
pub mod operations;
pub mod params;
pub mod typeface;

pub use backend::{AssetError, AssetProvider, Typeface};
pub use disk_assets::{AssetAudit, DiskAssets};
pub use operations::{FittedText, fit_text, save_jpeg};
pub use params::{IconFrame, Quality};
pub use typeface::RustTypeface;
