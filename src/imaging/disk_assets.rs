//! Assets from the local assets directory, icons over HTTP.
//!
//! ```text
//! assets/
//! ├── fonts/
//! │   ├── BurbankBigRegular-Black.ttf
//! │   └── LuckiestGuy-Regular.ttf      # fallback
//! └── images/
//!     ├── background.png
//!     ├── vbucks.png
//!     └── shopTemplates/
//!         ├── CommonBG.png
//!         ├── CommonOV.png
//!         └── …                        # <Rarity>BG.png / <Rarity>OV.png
//! ```
//!
//! Icons with an `http://` or `https://` location are downloaded with a
//! blocking `reqwest` client (optionally through the [`IconCache`]); any
//! other location is read from the images directory. Local names must stay
//! relative: absolute paths and `..` components are rejected.

use super::backend::{AssetError, AssetProvider};
use super::typeface::{FALLBACK_FONT, PRIMARY_FONT};
use crate::cache::{CacheStats, IconCache};
use crate::rarity::{FALLBACK_STEM, RARITY_STYLES, template_path};
use image::{ImageReader, RgbaImage};
use std::path::{Component, Path, PathBuf};

pub const IMAGES_DIR: &str = "images";
pub const FONTS_DIR: &str = "fonts";
pub const BACKGROUND_ASSET: &str = "background.png";
pub const CURRENCY_ASSET: &str = "vbucks.png";

pub struct DiskAssets {
    root: PathBuf,
    http: reqwest::blocking::Client,
    cache: Option<IconCache>,
}

fn decode(bytes: &[u8], name: &str) -> Result<RgbaImage, AssetError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Decode {
            name: name.to_string(),
            source,
        })
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

impl DiskAssets {
    pub fn new(root: &Path) -> Result<Self, AssetError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("item-shop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            root: root.to_path_buf(),
            http,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: IconCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.root.join(FONTS_DIR)
    }

    pub fn cache_stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(IconCache::stats)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn remote_icon(&self, url: &str) -> Result<RgbaImage, AssetError> {
        if let Some(cache) = &self.cache
            && let Some(bytes) = cache.get(url)
        {
            match decode(&bytes, url) {
                Ok(img) => return Ok(img),
                Err(e) => {
                    tracing::warn!(url, error = %e, "cached icon unreadable, downloading again");
                    cache.evict(url);
                }
            }
        }

        let bytes = self.download(url)?;
        let img = decode(&bytes, url)?;
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(url, &bytes)
        {
            tracing::warn!(url, error = %e, "failed to cache icon");
        }
        Ok(img)
    }

    /// Report which well-known assets resolve on disk.
    pub fn audit(&self) -> AssetAudit {
        let images = self.images_dir();
        let mut names = vec![BACKGROUND_ASSET.to_string(), CURRENCY_ASSET.to_string()];
        let mut stems: Vec<&str> = RARITY_STYLES.iter().map(|(_, s)| s.asset_stem).collect();
        stems.push(FALLBACK_STEM);
        stems.sort_unstable();
        stems.dedup();
        for stem in stems {
            names.push(template_path(stem, "BG"));
            names.push(template_path(stem, "OV"));
        }

        let fonts = self.fonts_dir();
        AssetAudit {
            images: names
                .into_iter()
                .map(|name| {
                    let present = images.join(&name).is_file();
                    (name, present)
                })
                .collect(),
            fonts: [PRIMARY_FONT, FALLBACK_FONT]
                .into_iter()
                .map(|name| (name.to_string(), fonts.join(name).is_file()))
                .collect(),
        }
    }
}

/// Presence of each expected asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAudit {
    pub images: Vec<(String, bool)>,
    pub fonts: Vec<(String, bool)>,
}

impl AssetAudit {
    /// Rendering works (with fallbacks) as long as one font loads and the
    /// Common templates exist.
    pub fn is_renderable(&self) -> bool {
        let font_ok = self.fonts.iter().any(|(_, present)| *present);
        let common_ok = [template_path(FALLBACK_STEM, "BG"), template_path(FALLBACK_STEM, "OV")]
            .iter()
            .all(|needed| {
                self.images
                    .iter()
                    .any(|(name, present)| name == needed && *present)
            });
        font_ok && common_ok
    }
}

impl AssetProvider for DiskAssets {
    fn image(&self, name: &str) -> Result<RgbaImage, AssetError> {
        if !is_contained(name) {
            return Err(AssetError::OutsideAssets(name.to_string()));
        }
        let path = self.images_dir().join(name);
        ImageReader::open(&path)?
            .decode()
            .map(|img| img.to_rgba8())
            .map_err(|source| AssetError::Decode {
                name: name.to_string(),
                source,
            })
    }

    fn icon(&self, location: &str) -> Result<RgbaImage, AssetError> {
        if is_remote(location) {
            self.remote_icon(location)
        } else {
            self.image(location)
        }
    }
}

/// True when `name` joined onto a directory stays inside it.
fn is_contained(name: &str) -> bool {
    let mut components = Path::new(name).components().peekable();
    components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn write_png(path: &Path, w: u32, h: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn opens_image_relative_to_images_dir() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("images/shopTemplates/EpicBG.png"), 310, 510);

        let assets = DiskAssets::new(tmp.path()).unwrap();
        let img = assets.image("shopTemplates/EpicBG.png").unwrap();
        assert_eq!(img.dimensions(), (310, 510));
    }

    #[test]
    fn missing_image_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let assets = DiskAssets::new(tmp.path()).unwrap();
        assert!(matches!(
            assets.image("background.png"),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn corrupt_image_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("images")).unwrap();
        std::fs::write(tmp.path().join("images/vbucks.png"), b"nope").unwrap();
        let assets = DiskAssets::new(tmp.path()).unwrap();
        assert!(assets.image("vbucks.png").is_err());
    }

    #[test]
    fn local_icon_reads_from_images_dir() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("images/icons/local.png"), 64, 32);
        let assets = DiskAssets::new(tmp.path()).unwrap();
        assert_eq!(
            assets.icon("icons/local.png").unwrap().dimensions(),
            (64, 32)
        );
    }

    #[test]
    fn local_icon_cannot_leave_images_dir() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("secret.png"), 8, 8);
        write_png(&tmp.path().join("images/icons/local.png"), 8, 8);
        let assets = DiskAssets::new(tmp.path()).unwrap();

        let absolute = tmp.path().join("secret.png");
        for location in [
            "../secret.png",
            "icons/../../secret.png",
            absolute.to_str().unwrap(),
            "",
        ] {
            assert!(
                matches!(assets.icon(location), Err(AssetError::OutsideAssets(_))),
                "{location:?} should be rejected"
            );
        }
        assert!(assets.icon("./icons/local.png").is_ok());
    }

    #[test]
    fn cached_icon_skips_download() {
        let tmp = TempDir::new().unwrap();
        let cache = IconCache::open(&tmp.path().join("cache")).unwrap();
        let url = "https://cdn.invalid/icon.png";
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255]))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        cache.put(url, &bytes).unwrap();

        let assets = DiskAssets::new(tmp.path()).unwrap().with_cache(cache);
        assert_eq!(assets.icon(url).unwrap().dimensions(), (8, 8));
        assert_eq!(assets.cache_stats().unwrap().hits(), 1);
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://fortnite-api.com/images/x.png"));
        assert!(is_remote("http://localhost/x.png"));
        assert!(!is_remote("icons/x.png"));
    }

    #[test]
    fn audit_reports_presence() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("images/shopTemplates/CommonBG.png"), 2, 2);
        write_png(&tmp.path().join("images/shopTemplates/CommonOV.png"), 2, 2);
        std::fs::create_dir_all(tmp.path().join("fonts")).unwrap();
        std::fs::write(tmp.path().join("fonts").join(FALLBACK_FONT), b"x").unwrap();

        let audit = DiskAssets::new(tmp.path()).unwrap().audit();
        assert!(audit.is_renderable());
        assert!(
            audit
                .images
                .contains(&("shopTemplates/CommonBG.png".to_string(), true))
        );
        assert!(
            audit
                .images
                .contains(&("shopTemplates/EpicOV.png".to_string(), false))
        );
        assert!(audit.fonts.contains(&(PRIMARY_FONT.to_string(), false)));
    }

    #[test]
    fn audit_without_fonts_is_not_renderable() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("images/shopTemplates/CommonBG.png"), 2, 2);
        write_png(&tmp.path().join("images/shopTemplates/CommonOV.png"), 2, 2);
        assert!(!DiskAssets::new(tmp.path()).unwrap().audit().is_renderable());
    }
}
