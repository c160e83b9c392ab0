//! # Font Engine
//!
//! Binary-level TrueType handling for fonts inlined into generated SVG:
//! subsetting to the glyphs a diagram actually draws, and transcoding to
//! WOFF. Every operation is a pure function from input bytes to output
//! bytes; nothing is shared between calls.
//!
//! ```text
//! corpus ──► cmap ──► glyf dependency closure ──► table rebuilders
//!                                                      │
//!                          WOFF encoder ◄── SFNT writer ◄┘
//! ```

pub mod bytes;
pub mod cmap;
pub mod embed;
pub mod glyf;
pub mod metrics;
pub mod sfnt;
pub mod subset;
pub mod woff;
pub mod writer;

pub use cmap::CharMap;
pub use glyf::GlyphRemap;
pub use sfnt::{FontDirectory, TableRecord, Tag};
pub use subset::SubsetFont;
pub use writer::SfntBuilder;
