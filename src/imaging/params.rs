//! Parameter types for rendering.
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 85). Clamped on construction.
//! - [`IconFrame`]: the box an item icon is scaled to cover, and how far
//!   from the card top it sits. Depends on the item category.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Icon placement inside a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconFrame {
    pub width: u32,
    pub height: u32,
    /// Distance from the card top to the icon top.
    pub top: i64,
}

impl IconFrame {
    /// Frame for a lowercase category id.
    ///
    /// Outfits and emotes are tall character renders and hug the top edge;
    /// wraps get a smaller box; everything else uses the full card width.
    pub fn for_category(category: &str) -> Self {
        match category {
            "outfit" | "emote" => Self {
                width: 285,
                height: 365,
                top: 0,
            },
            "wrap" => Self {
                width: 230,
                height: 310,
                top: 15,
            },
            _ => Self {
                width: 310,
                height: 390,
                top: 15,
            },
        }
    }
}
