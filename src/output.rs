//! CLI output formatting.
//!
//! # Render
//!
//! ```text
//! Featured
//! 001 Featured Item 1 → (20, 350)
//! 002 Featured Item 2 → (350, 350)
//!
//! Daily
//! 001 Daily Item 1 → (1020, 350)
//!
//! Skipped
//!     Daily #2: entry is missing finalPrice
//!
//! Icons: 3 cached, 2 downloaded (5 total)
//! Generated itemshop.jpeg (2010x880, 3 cards)
//! ```
//!
//! # Check
//!
//! ```text
//! Config
//!     configuration.json
//! Images
//!     ok       background.png
//!     missing  vbucks.png
//! Fonts
//!     ok       BurbankBigRegular-Black.ttf
//!     missing  LuckiestGuy-Regular.ttf
//! Ready to render
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::cache::CacheStats;
use crate::imaging::AssetAudit;
use crate::layout::Section;
use crate::shop::RenderReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn section_title(section: Section) -> &'static str {
    match section {
        Section::Featured => "Featured",
        Section::Daily => "Daily",
    }
}

fn presence_line(name: &str, present: bool) -> String {
    let status = if present { "ok" } else { "missing" };
    format!("{}{:<8} {}", indent(1), status, name)
}

// ============================================================================
// render
// ============================================================================

pub fn format_render_report(
    report: &RenderReport,
    output: &Path,
    cache: Option<&CacheStats>,
) -> Vec<String> {
    let mut lines = Vec::new();

    for section in [Section::Featured, Section::Daily] {
        let placed: Vec<_> = report.placed_in(section).collect();
        if placed.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section_title(section).to_string());
        for card in placed {
            lines.push(format!(
                "{} {} → ({}, {})",
                format_index(card.slot + 1),
                card.name,
                card.x,
                card.y
            ));
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &report.skipped {
            lines.push(format!(
                "{}{} #{}: {}",
                indent(1),
                section_title(skipped.section),
                skipped.position + 1,
                skipped.reason
            ));
        }
    }

    lines.push(String::new());
    if let Some(stats) = cache
        && stats.total() > 0
    {
        lines.push(format!("Icons: {}", stats));
    }
    lines.push(format!(
        "Generated {} ({}x{}, {} cards)",
        output.display(),
        report.width,
        report.height,
        report.placed.len()
    ));
    lines
}

pub fn print_render_report(report: &RenderReport, output: &Path, cache: Option<&CacheStats>) {
    for line in format_render_report(report, output, cache) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// `config_found` is false when the bot runs on stock defaults.
pub fn format_asset_check(config: &Path, config_found: bool, audit: &AssetAudit) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];
    if config_found {
        lines.push(format!("{}{}", indent(1), config.display()));
    } else {
        lines.push(format!(
            "{}{} (not found, using defaults)",
            indent(1),
            config.display()
        ));
    }

    lines.push("Images".to_string());
    lines.extend(audit.images.iter().map(|(n, p)| presence_line(n, *p)));
    lines.push("Fonts".to_string());
    lines.extend(audit.fonts.iter().map(|(n, p)| presence_line(n, *p)));

    lines.push(if audit.is_renderable() {
        "Ready to render".to_string()
    } else {
        "Not renderable: needs a font and the Common templates".to_string()
    });
    lines
}

pub fn print_asset_check(config: &Path, config_found: bool, audit: &AssetAudit) {
    for line in format_asset_check(config, config_found, audit) {
        println!("{}", line);
    }
}
