//! Structured error types for the font engine.
//!
//! Every failure is deterministic for a given input, so nothing here is
//! retryable. Callers decide whether to fall back to the full font.

use crate::font::sfnt::Tag;
use thiserror::Error;

/// The unified error type returned by all public glyphcut functions.
#[derive(Debug, Error)]
pub enum FontError {
    /// Structurally invalid input: truncated buffer, a table outside the
    /// buffer, a missing required table, or an unsupported outline format.
    #[error("Malformed font: {0}")]
    MalformedFont(String),

    /// The preferred Unicode cmap subtable is not format 4.
    #[error("Unsupported cmap subtable format {format} (only format 4 is supported)")]
    UnsupportedCmapFormat { format: u16 },

    /// A composite glyph references a component past the end of the font.
    #[error(
        "Composite glyph {glyph} references glyph {component}, but the font only has {num_glyphs} glyphs"
    )]
    InvalidGlyphReference {
        glyph: u16,
        component: u16,
        num_glyphs: u16,
    },

    /// A table's recorded checksum disagrees with its contents.
    #[error("Checksum mismatch in '{tag}' table: recorded {recorded:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        tag: Tag,
        recorded: u32,
        computed: u32,
    },

    /// An options document failed to parse.
    #[error("Failed to parse font options: {source}{}", hint_suffix(.hint))]
    InvalidOptions {
        source: serde_json::Error,
        hint: String,
    },
}

impl FontError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FontError::MalformedFont(msg.into())
    }

    /// Whether a caller may reasonably fall back to embedding the
    /// unsubset font after this error.
    pub fn allows_full_font_fallback(&self) -> bool {
        matches!(
            self,
            FontError::MalformedFont(_)
                | FontError::InvalidGlyphReference { .. }
                | FontError::UnsupportedCmapFormat { .. }
        )
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FontError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the options schema. Expected camelCase fields: subset, compressionLevel, fallbackToFullFont.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FontError::InvalidOptions { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
