//! Inline font embedding for generated SVG stylesheets.

use base64::Engine;

use crate::error::Result;
use crate::options::FontOptions;

const WOFF_DATA_URI_PREFIX: &str = "data:application/font-woff;base64,";

/// `data:` URI for a WOFF file, ready for an `@font-face { src: url(...) }`.
pub fn woff_data_uri(woff: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(woff);
    let mut uri = String::with_capacity(WOFF_DATA_URI_PREFIX.len() + encoded.len());
    uri.push_str(WOFF_DATA_URI_PREFIX);
    uri.push_str(&encoded);
    uri
}

/// Subset (optionally), encode as WOFF, and return a data URI.
///
/// With `fallback_to_full_font`, a font the subsetter cannot handle is
/// embedded whole instead. Checksum failures from the WOFF encoder are
/// never downgraded.
pub fn embed_font(font: &[u8], corpus: &str, options: &FontOptions) -> Result<String> {
    let sfnt = if options.subset {
        match super::subset::subset_font(font, corpus) {
            Ok(subset) => subset.data,
            Err(e) if options.fallback_to_full_font && e.allows_full_font_fallback() => {
                tracing::warn!(error = %e, "font subsetting failed; embedding the full font");
                font.to_vec()
            }
            Err(e) => return Err(e),
        }
    } else {
        font.to_vec()
    };

    let woff = super::woff::encode_with_level(&sfnt, options.compression_level)?;
    Ok(woff_data_uri(&woff))
}
