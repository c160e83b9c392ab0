//! # glyphcut
//!
//! Font subsetting and WOFF transcoding for diagrams rendered to SVG.
//!
//! A rendered diagram only draws a handful of distinct characters, but the
//! font that draws them is often hundreds of kilobytes. glyphcut reduces
//! the font to the glyphs the diagram's text needs (including glyphs
//! pulled in by composite glyphs), wraps it in WOFF, and hands back bytes
//! or a `data:` URI for the stylesheet.
//!
//! ## Architecture
//!
//! ```text
//! font bytes + corpus
//!       ↓
//!   [font::sfnt]     — table directory, checksums
//!   [font::cmap]     — code point → glyph
//!   [font::glyf]     — composite closure, glyph renumbering
//!   [font::subset]   — table rebuilders
//!   [font::writer]   — SFNT assembly, checksumAdjustment
//!       ↓
//!   [font::woff]     — WOFF 1.0 container
//!       ↓
//!   [font::embed]    — data: URI
//! ```

pub mod error;
pub mod font;
pub mod options;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{FontError, Result};
pub use font::embed::{embed_font, woff_data_uri};
pub use font::SubsetFont;
pub use options::FontOptions;

/// Subset a TrueType font to the glyphs needed for the distinct
/// characters of `corpus`, returning a complete SFNT.
pub fn subset(font: &[u8], corpus: &str) -> Result<Vec<u8>> {
    Ok(font::subset::subset_font(font, corpus)?.data)
}

/// Like [`subset`], also returning the old → new glyph id mapping.
pub fn subset_with_map(font: &[u8], corpus: &str) -> Result<SubsetFont> {
    font::subset::subset_font(font, corpus)
}

/// Wrap a complete SFNT in a WOFF 1.0 container.
pub fn to_woff(font: &[u8]) -> Result<Vec<u8>> {
    font::woff::encode(font)
}

/// [`to_woff`] with an explicit DEFLATE level (0-10).
pub fn to_woff_with_level(font: &[u8], level: u8) -> Result<Vec<u8>> {
    font::woff::encode_with_level(font, level)
}

/// Unwrap a WOFF 1.0 file back into an SFNT.
pub fn from_woff(woff: &[u8]) -> Result<Vec<u8>> {
    font::woff::decode(woff)
}

/// `to_woff(subset(font, corpus))`.
pub fn subset_to_woff(font: &[u8], corpus: &str) -> Result<Vec<u8>> {
    to_woff(&subset(font, corpus)?)
}
