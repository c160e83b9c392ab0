//! Caller-facing options for font embedding.
//!
//! Deserialized from camelCase JSON, e.g.
//! `{ "subset": true, "compressionLevel": 9, "fallbackToFullFont": false }`.
//! Every field is optional.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::font::woff::DEFAULT_COMPRESSION_LEVEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontOptions {
    /// Subset to the corpus before encoding. When false the whole font
    /// is embedded.
    pub subset: bool,
    /// DEFLATE level for WOFF tables, 0-10.
    pub compression_level: u8,
    /// Embed the full font when the subsetter rejects it.
    pub fallback_to_full_font: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            subset: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            fallback_to_full_font: true,
        }
    }
}

impl FontOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
