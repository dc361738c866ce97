//! Card styling per rarity.
//!
//! Each rarity maps to an accent color (used for the category label) and an
//! asset stem naming its card template pair under `shopTemplates/`:
//! `<Stem>BG.png` is laid under the icon and `<Stem>OV.png` over it.
//!
//! Unknown rarities resolve to [`RarityStyle::DEFAULT`]: white accent with
//! the Common templates.

use image::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityStyle {
    pub accent: [u8; 3],
    pub asset_stem: &'static str,
}

impl RarityStyle {
    pub const DEFAULT: RarityStyle = RarityStyle {
        accent: [255, 255, 255],
        asset_stem: FALLBACK_STEM,
    };

    pub fn accent_rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.accent;
        Rgba([r, g, b, 255])
    }

    /// Relative asset path of the card background template.
    pub fn background_asset(&self) -> String {
        template_path(self.asset_stem, "BG")
    }

    /// Relative asset path of the card overlay template.
    pub fn overlay_asset(&self) -> String {
        template_path(self.asset_stem, "OV")
    }
}

/// Template stem every rarity falls back to when its own assets are missing.
pub const FALLBACK_STEM: &str = "Common";

pub fn template_path(stem: &str, kind: &str) -> String {
    format!("shopTemplates/{stem}{kind}.png")
}

const fn style(r: u8, g: u8, b: u8, asset_stem: &'static str) -> RarityStyle {
    RarityStyle {
        accent: [r, g, b],
        asset_stem,
    }
}

/// Known rarity ids (lowercase, as the catalog reports them) and their styles.
pub const RARITY_STYLES: &[(&str, RarityStyle)] = &[
    ("frozen", style(148, 223, 255, "Frozen")),
    ("lava", style(234, 141, 35, "Lava")),
    ("legendary", style(211, 120, 65, "Legendary")),
    ("slurp", style(0, 233, 176, "Slurp")),
    ("dark", style(251, 34, 223, "Dark")),
    ("starwars", style(231, 196, 19, "Starwars")),
    ("marvel", style(197, 51, 52, "Marvel")),
    ("dc", style(84, 117, 199, "Dc")),
    ("icon", style(54, 183, 183, "Icon")),
    ("shadow", style(113, 113, 113, "Shadow")),
    ("gaminglegends", style(117, 129, 209, "GamingLegends")),
    ("epic", style(177, 91, 226, "Epic")),
    ("rare", style(73, 172, 242, "Rare")),
    ("uncommon", style(96, 170, 58, "Uncommon")),
    ("common", style(190, 190, 190, "Common")),
];

/// Look up the style for a rarity id, case-insensitively.
///
/// Returns `None` for unknown ids; see [`style_for`] for the defaulting variant.
pub fn lookup(rarity: &str) -> Option<RarityStyle> {
    RARITY_STYLES
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(rarity))
        .map(|(_, style)| *style)
}

/// Style for a rarity id, with a warning and [`RarityStyle::DEFAULT`] on miss.
pub fn style_for(rarity: &str) -> RarityStyle {
    lookup(rarity).unwrap_or_else(|| {
        tracing::warn!(rarity, "unknown rarity, using default card style");
        RarityStyle::DEFAULT
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_every_known_rarity() {
        assert_eq!(RARITY_STYLES.len(), 15);
        let ids: HashSet<&str> = RARITY_STYLES.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), RARITY_STYLES.len(), "duplicate rarity id");
    }

    #[test]
    fn every_style_names_template_assets() {
        for (id, style) in RARITY_STYLES {
            assert!(!style.asset_stem.is_empty(), "{id} has no asset stem");
            assert!(style.background_asset().ends_with("BG.png"));
            assert!(style.overlay_asset().ends_with("OV.png"));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("Legendary"), lookup("legendary"));
        assert_eq!(lookup("EPIC").unwrap().accent, [177, 91, 226]);
    }

    #[test]
    fn gaming_legends_keeps_camel_case_assets() {
        let style = lookup("gaminglegends").unwrap();
        assert_eq!(
            style.background_asset(),
            "shopTemplates/GamingLegendsBG.png"
        );
    }

    #[test]
    fn unknown_rarity_uses_default() {
        assert_eq!(lookup("mythic"), None);
        let style = style_for("mythic");
        assert_eq!(style, RarityStyle::DEFAULT);
        assert_eq!(style.accent, [255, 255, 255]);
        assert_eq!(style.overlay_asset(), "shopTemplates/CommonOV.png");
    }

    #[test]
    fn common_is_grey_not_default_white() {
        assert_eq!(style_for("common").accent, [190, 190, 190]);
        assert_eq!(style_for("common").accent_rgba(), Rgba([190, 190, 190, 255]));
    }
}
