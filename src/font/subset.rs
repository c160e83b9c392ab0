//! # TrueType Font Subsetter
//!
//! Strips a TrueType font to the glyphs needed to draw a corpus of text.
//! Diagrams usually use a few dozen distinct characters, so a 100-300KB
//! font typically shrinks to a few KB before being inlined into SVG.
//!
//! The subsetter rebuilds a valid TrueType file with glyph ids renumbered
//! densely from 0, in ascending order of the original ids.
//!
//! ## Approach
//!
//! 1. Resolve each distinct code point of the corpus through the cmap
//! 2. Close the glyph set over composite glyph components
//! 3. Rebuild glyf, loca, hmtx, cmap, post, head, hhea and maxp
//! 4. Copy hinting and naming tables through untouched
//! 5. Assemble with correct checksums and alignment

use std::collections::BTreeSet;

use super::bytes::{write_u16, write_u32, Reader};
use super::cmap::{encode_format4, CharMap};
use super::glyf::{rebuild_glyf, resolve_dependencies, GlyphRemap, GlyphTable};
use super::metrics::{build_loca, parse_loca, rebuild_hmtx, HmtxSummary, HorizontalMetrics, LocaFormat};
use super::sfnt::{FontDirectory, Tag};
use super::writer::{SfntBuilder, HEAD_CHECKSUM_ADJUSTMENT_OFFSET};
use crate::error::{FontError, Result};

const HEAD_LEN: usize = 54;
const HEAD_INDEX_TO_LOC_FORMAT_OFFSET: usize = 50;
const HHEA_LEN: usize = 36;
const HHEA_ADVANCE_WIDTH_MAX_OFFSET: usize = 10;
const HHEA_NUM_H_METRICS_OFFSET: usize = 34;
const MAXP_NUM_GLYPHS_OFFSET: usize = 4;
const POST_LEN: usize = 32;
/// italicAngle, underlinePosition, underlineThickness, isFixedPitch.
const POST_KEPT_FIELDS: std::ops::Range<usize> = 4..16;
const POST_VERSION_3: u32 = 0x0003_0000;

/// Tables copied byte-for-byte when the source font has them.
pub const PASS_THROUGH_TABLES: [Tag; 6] = [Tag::NAME, Tag::CVT, Tag::FPGM, Tag::PREP, Tag::GASP, Tag::OS2];

/// Result of subsetting a font.
#[derive(Debug, Clone)]
pub struct SubsetFont {
    /// The subset TrueType file bytes.
    pub data: Vec<u8>,
    /// Maps original glyph ids to the new contiguous ids.
    pub glyph_map: GlyphRemap,
}

/// Subset a TrueType font to the glyphs needed for the distinct
/// characters of `corpus`.
pub fn subset_font(font: &[u8], corpus: &str) -> Result<SubsetFont> {
    let dir = FontDirectory::parse(font)?;
    if !dir.contains(Tag::GLYF) || !dir.contains(Tag::LOCA) {
        return Err(FontError::malformed(
            "font has no glyf/loca tables (CFF outlines are not supported)",
        ));
    }

    let head = dir.require(Tag::HEAD)?;
    if head.len() < HEAD_LEN {
        return Err(FontError::malformed(format!("head table is {} bytes", head.len())));
    }
    let loca_format = LocaFormat::from_head_field(
        Reader::at(head, HEAD_INDEX_TO_LOC_FORMAT_OFFSET, "head")?.read_i16()?,
    )?;
    let maxp = dir.require(Tag::MAXP)?;
    let num_glyphs = Reader::at(maxp, MAXP_NUM_GLYPHS_OFFSET, "maxp")?.read_u16()?;
    if num_glyphs == 0 {
        return Err(FontError::malformed("maxp.numGlyphs is zero"));
    }

    let loca = parse_loca(dir.require(Tag::LOCA)?, loca_format, num_glyphs)?;
    let glyphs = GlyphTable::new(dir.require(Tag::GLYF)?, loca)?;
    let char_map = CharMap::parse(dir.require(Tag::CMAP)?, num_glyphs)?;

    let used: BTreeSet<u32> = corpus.chars().map(u32::from).collect();
    let seeds: Vec<u16> = used.iter().filter_map(|&c| char_map.glyph(c)).collect();
    let glyph_map = resolve_dependencies(&glyphs, seeds)?;

    let (new_glyf, new_offsets) = rebuild_glyf(&glyphs, &glyph_map)?;
    let new_loca_format = LocaFormat::for_glyf_len(new_glyf.len());
    let new_loca = build_loca(&new_offsets, new_loca_format);

    let hhea = dir.require(Tag::HHEA)?;
    if hhea.len() < HHEA_LEN {
        return Err(FontError::malformed(format!("hhea table is {} bytes", hhea.len())));
    }
    let num_h_metrics = Reader::at(hhea, HHEA_NUM_H_METRICS_OFFSET, "hhea")?.read_u16()?;
    let metrics = HorizontalMetrics::parse(dir.require(Tag::HMTX)?, num_h_metrics, num_glyphs)?;
    let (new_hmtx, hmtx_summary) = rebuild_hmtx(&metrics, glyph_map.old_ids());

    let new_cmap = encode_format4(&subset_cmap_entries(&char_map, &glyph_map))?;

    let mut builder = SfntBuilder::new(dir.sfnt_version);
    builder
        .add_table(Tag::CMAP, new_cmap)
        .add_table(Tag::GLYF, new_glyf)
        .add_table(Tag::LOCA, new_loca)
        .add_table(Tag::HMTX, new_hmtx)
        .add_table(Tag::HEAD, rebuild_head(head, new_loca_format))
        .add_table(Tag::HHEA, rebuild_hhea(hhea, hmtx_summary))
        .add_table(Tag::MAXP, rebuild_maxp(maxp, glyph_map.len() as u16))
        .add_table(Tag::POST, rebuild_post(dir.table(Tag::POST)));

    for tag in PASS_THROUGH_TABLES {
        if let Some(table) = dir.table(tag) {
            builder.add_table(tag, table.to_vec());
        }
    }

    let data = builder.finish();

    tracing::debug!(
        code_points = used.len(),
        glyphs_in = num_glyphs,
        glyphs_out = glyph_map.len(),
        bytes_in = font.len(),
        bytes_out = data.len(),
        loca = ?new_loca_format,
        "subset font"
    );

    Ok(SubsetFont { data, glyph_map })
}

/// Every BMP code point of every retained glyph except `.notdef`, mapped
/// to the glyph's new id.
fn subset_cmap_entries(char_map: &CharMap, glyph_map: &GlyphRemap) -> Vec<(u16, u16)> {
    glyph_map
        .iter()
        .filter(|&(old, _)| old != 0)
        .flat_map(move |(old, new)| {
            char_map
                .chars(old)
                .iter()
                .filter(|&&c| c < 0xFFFF)
                .map(move |&c| (c as u16, new))
        })
        .collect()
}

// ─── Small Table Rebuilders ─────────────────────────────────────

fn rebuild_head(head: &[u8], loca_format: LocaFormat) -> Vec<u8> {
    let mut new_head = head.to_vec();
    write_u32(&mut new_head, HEAD_CHECKSUM_ADJUSTMENT_OFFSET, 0);
    write_u16(
        &mut new_head,
        HEAD_INDEX_TO_LOC_FORMAT_OFFSET,
        loca_format.head_field() as u16,
    );
    new_head
}

fn rebuild_hhea(hhea: &[u8], summary: HmtxSummary) -> Vec<u8> {
    let mut new_hhea = hhea.to_vec();
    write_u16(&mut new_hhea, HHEA_ADVANCE_WIDTH_MAX_OFFSET, summary.advance_width_max);
    write_u16(&mut new_hhea, HHEA_NUM_H_METRICS_OFFSET, summary.num_metrics);
    new_hhea
}

fn rebuild_maxp(maxp: &[u8], num_glyphs: u16) -> Vec<u8> {
    let mut new_maxp = maxp.to_vec();
    write_u16(&mut new_maxp, MAXP_NUM_GLYPHS_OFFSET, num_glyphs);
    new_maxp
}

/// Version 3.0 `post`: no glyph names, fixed header fields preserved.
fn rebuild_post(post: Option<&[u8]>) -> Vec<u8> {
    let mut data = vec![0u8; POST_LEN];
    write_u32(&mut data, 0, POST_VERSION_3);
    if let Some(src) = post.and_then(|p| p.get(POST_KEPT_FIELDS)) {
        data[POST_KEPT_FIELDS].copy_from_slice(src);
    }
    data
}
