//! # Character Map (cmap)
//!
//! Reads the font's Unicode format 4 subtable into a bidirectional
//! code point ↔ glyph mapping, and encodes the reduced format 4 table
//! written into subset fonts.
//!
//! Format 4 layout (all u16):
//!
//! ```text
//! format, length, language, segCountX2, searchRange, entrySelector, rangeShift,
//! endCode[segCount], reservedPad, startCode[segCount],
//! idDelta[segCount], idRangeOffset[segCount], glyphIdArray[...]
//! ```

use std::collections::BTreeMap;

use super::bytes::{peek_u16, Reader};
use super::sfnt::search_params;
use crate::error::{FontError, Result};

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_WINDOWS_BMP: u16 = 1;

const FORMAT4_HEADER_LEN: usize = 16;
/// Most segments whose subtable length still fits in a u16.
pub const MAX_FORMAT4_SEGMENTS: usize = (u16::MAX as usize - FORMAT4_HEADER_LEN) / 8;

/// Code point ↔ glyph index mapping read from a font's cmap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    to_glyph: BTreeMap<u32, u16>,
    /// Several code points may share a glyph (e.g. composed and
    /// decomposed forms), so the inverse is one-to-many.
    to_chars: BTreeMap<u16, Vec<u32>>,
}

impl CharMap {
    /// Parse the preferred Unicode subtable of a `cmap` table.
    ///
    /// Preference order is (3, 1) Windows Unicode BMP, then the first
    /// platform 0 record. Mappings to glyphs at or beyond `num_glyphs`
    /// are dropped.
    pub fn parse(cmap: &[u8], num_glyphs: u16) -> Result<Self> {
        let subtable = find_unicode_subtable(cmap)?;

        let mut r = Reader::new(subtable, "cmap format 4");
        let format = r.read_u16()?;
        if format != 4 {
            return Err(FontError::UnsupportedCmapFormat { format });
        }
        let length = r.read_u16()? as usize;
        // Clamp to the bytes actually present; some fonts overstate length.
        let subtable = &subtable[..length.min(subtable.len())];
        let mut r = Reader::at(subtable, 6, "cmap format 4")?;

        let seg_count = (r.read_u16()? / 2) as usize;
        r.skip(6)?; // searchRange, entrySelector, rangeShift

        let end_codes = read_u16_array(&mut r, seg_count)?;
        r.skip(2)?; // reservedPad
        let start_codes = read_u16_array(&mut r, seg_count)?;
        let id_deltas = read_u16_array(&mut r, seg_count)?;
        let range_offsets_pos = r.position();
        let id_range_offsets = read_u16_array(&mut r, seg_count)?;

        let mut map = CharMap::default();
        let mut dropped = 0usize;

        for seg in 0..seg_count {
            let start = start_codes[seg] as u32;
            let end = end_codes[seg] as u32;
            let delta = id_deltas[seg];
            let range_offset = id_range_offsets[seg] as usize;

            for code in start..=end {
                let glyph = if range_offset == 0 {
                    (code as u16).wrapping_add(delta)
                } else {
                    // idRangeOffset is relative to its own position in the table.
                    let addr = range_offsets_pos
                        + seg * 2
                        + range_offset
                        + (code - start) as usize * 2;
                    match peek_u16(subtable, addr) {
                        Some(0) | None => 0,
                        Some(g) => g.wrapping_add(delta),
                    }
                };

                if glyph == 0 {
                    continue;
                }
                if glyph >= num_glyphs {
                    dropped += 1;
                    continue;
                }
                map.insert(code, glyph);
            }
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                num_glyphs,
                "cmap entries point past the glyph count; treating them as .notdef"
            );
        }

        Ok(map)
    }

    fn insert(&mut self, code: u32, glyph: u16) {
        // First mapping wins if segments overlap.
        if self.to_glyph.contains_key(&code) {
            return;
        }
        self.to_glyph.insert(code, glyph);
        self.to_chars.entry(glyph).or_default().push(code);
    }

    /// Glyph index for a code point, if the font maps it.
    pub fn glyph(&self, code: u32) -> Option<u16> {
        self.to_glyph.get(&code).copied()
    }

    /// All code points mapped to `glyph`, ascending.
    pub fn chars(&self, glyph: u16) -> &[u32] {
        self.to_chars.get(&glyph).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.to_glyph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_glyph.is_empty()
    }

    /// Iterate `(code point, glyph)` pairs in code point order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.to_glyph.iter().map(|(&c, &g)| (c, g))
    }
}

fn read_u16_array(r: &mut Reader<'_>, count: usize) -> Result<Vec<u16>> {
    (0..count).map(|_| r.read_u16()).collect()
}

fn find_unicode_subtable(cmap: &[u8]) -> Result<&[u8]> {
    let mut r = Reader::new(cmap, "cmap header");
    r.skip(2)?; // version
    let num_tables = r.read_u16()?;

    let mut windows_bmp = None;
    let mut unicode = None;
    for _ in 0..num_tables {
        let platform = r.read_u16()?;
        let encoding = r.read_u16()?;
        let offset = r.read_u32()? as usize;
        if platform == PLATFORM_WINDOWS && encoding == ENCODING_WINDOWS_BMP && windows_bmp.is_none() {
            windows_bmp = Some(offset);
        } else if platform == PLATFORM_UNICODE && unicode.is_none() {
            unicode = Some(offset);
        }
    }

    let offset = windows_bmp
        .or(unicode)
        .ok_or_else(|| FontError::malformed("cmap has no Unicode subtable"))?;
    cmap.get(offset..)
        .filter(|s| s.len() >= 2)
        .ok_or_else(|| FontError::malformed(format!("cmap subtable offset {} out of range", offset)))
}

// ─── Format 4 Encoding ──────────────────────────────────────────

/// A run of consecutive code points mapped to consecutive glyph ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u16,
    pub end: u16,
    /// Glyph id of `start`.
    pub glyph: u16,
}

/// Split sorted `(code, glyph)` pairs into maximal runs where both the
/// code and the glyph increase by exactly one per step.
pub fn segments(mappings: &[(u16, u16)]) -> Vec<Segment> {
    let mut segs: Vec<Segment> = Vec::new();
    for &(code, glyph) in mappings {
        if let Some(last) = segs.last_mut() {
            let next_glyph = last.glyph.wrapping_add(last.end.wrapping_sub(last.start)).wrapping_add(1);
            if last.end.checked_add(1) == Some(code) && glyph == next_glyph {
                last.end = code;
                continue;
            }
        }
        segs.push(Segment {
            start: code,
            end: code,
            glyph,
        });
    }
    segs
}

/// Build a complete `cmap` table holding one (3, 1) format 4 subtable.
///
/// Pairs mapping to glyph 0 and the code point U+FFFF are skipped; the
/// mandatory 0xFFFF terminator segment is appended.
///
/// Fails with `MalformedFont` when the segments do not fit the subtable's
/// u16 length field.
pub fn encode_format4(mappings: &[(u16, u16)]) -> Result<Vec<u8>> {
    let mut sorted: Vec<(u16, u16)> = mappings
        .iter()
        .copied()
        .filter(|&(code, glyph)| glyph != 0 && code != 0xFFFF)
        .collect();
    sorted.sort_unstable();
    sorted.dedup_by_key(|(code, _)| *code);

    let mut segs = segments(&sorted);
    // Terminator: 0xFFFF + 1 wraps to glyph 0.
    segs.push(Segment {
        start: 0xFFFF,
        end: 0xFFFF,
        glyph: 0,
    });

    if segs.len() > MAX_FORMAT4_SEGMENTS {
        return Err(FontError::malformed(format!(
            "{} cmap segments exceed the format 4 limit of {}",
            segs.len(),
            MAX_FORMAT4_SEGMENTS
        )));
    }

    let seg_count = segs.len() as u16;
    let (search_range, entry_selector, range_shift) = search_params(seg_count, 2);
    let subtable_len = FORMAT4_HEADER_LEN + segs.len() * 8;

    let mut subtable: Vec<u8> = Vec::with_capacity(subtable_len);
    subtable.extend_from_slice(&4u16.to_be_bytes()); // format
    subtable.extend_from_slice(&(subtable_len as u16).to_be_bytes());
    subtable.extend_from_slice(&0u16.to_be_bytes()); // language
    subtable.extend_from_slice(&(seg_count * 2).to_be_bytes());
    subtable.extend_from_slice(&search_range.to_be_bytes());
    subtable.extend_from_slice(&entry_selector.to_be_bytes());
    subtable.extend_from_slice(&range_shift.to_be_bytes());

    for s in &segs {
        subtable.extend_from_slice(&s.end.to_be_bytes());
    }
    subtable.extend_from_slice(&0u16.to_be_bytes()); // reservedPad
    for s in &segs {
        subtable.extend_from_slice(&s.start.to_be_bytes());
    }
    for s in &segs {
        let delta = s.glyph.wrapping_sub(s.start);
        subtable.extend_from_slice(&delta.to_be_bytes());
    }
    for _ in &segs {
        subtable.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset
    }

    let mut cmap: Vec<u8> = Vec::with_capacity(12 + subtable.len());
    cmap.extend_from_slice(&0u16.to_be_bytes()); // version
    cmap.extend_from_slice(&1u16.to_be_bytes()); // numTables
    cmap.extend_from_slice(&PLATFORM_WINDOWS.to_be_bytes());
    cmap.extend_from_slice(&ENCODING_WINDOWS_BMP.to_be_bytes());
    cmap.extend_from_slice(&12u32.to_be_bytes()); // subtable offset
    cmap.extend_from_slice(&subtable);
    Ok(cmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_runs() {
        let pairs = [(0x41, 5), (0x42, 6), (0x43, 7), (0x45, 8), (0x46, 20)];
        let segs = segments(&pairs);
        assert_eq!(
            segs,
            vec![
                Segment { start: 0x41, end: 0x43, glyph: 5 },
                Segment { start: 0x45, end: 0x45, glyph: 8 },
                Segment { start: 0x46, end: 0x46, glyph: 20 },
            ]
        );
    }

    #[test]
    fn test_encode_single_char() {
        let cmap = encode_format4(&[(0x61, 1)]).unwrap();
        assert_eq!(peek_u16(&cmap, 0), Some(0)); // version
        assert_eq!(peek_u16(&cmap, 2), Some(1)); // numTables
        assert_eq!(peek_u16(&cmap, 4), Some(3));
        assert_eq!(peek_u16(&cmap, 6), Some(1));
        assert_eq!(peek_u16(&cmap, 12), Some(4)); // format
        assert_eq!(peek_u16(&cmap, 18), Some(4)); // segCountX2: 'a' + terminator
    }

    #[test]
    fn test_encode_then_parse() {
        let pairs = [(0x20, 1), (0x41, 2), (0x42, 3), (0x43, 4), (0x7A, 9), (0xE9, 5)];
        let cmap = encode_format4(&pairs).unwrap();
        let map = CharMap::parse(&cmap, 10).unwrap();
        for &(code, glyph) in &pairs {
            assert_eq!(map.glyph(code as u32), Some(glyph), "code {:#x}", code);
        }
        assert_eq!(map.len(), pairs.len());
        assert_eq!(map.glyph(0x44), None);
        assert_eq!(map.glyph(0xFFFF), None);
    }

    #[test]
    fn test_encode_skips_notdef_and_ffff() {
        let cmap = encode_format4(&[(0x41, 0), (0xFFFF, 3), (0x42, 1)]).unwrap();
        let map = CharMap::parse(&cmap, 4).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.glyph(0x42), Some(1));
    }

    #[test]
    fn test_parse_glyph_id_array() {
        // One segment 0x30..=0x32 using idRangeOffset, plus the terminator.
        let mut sub = Vec::new();
        for v in [4u16, 0, 0, 4, 4, 1, 0] {
            sub.extend_from_slice(&v.to_be_bytes());
        }
        for v in [0x32u16, 0xFFFF, 0, 0x30, 0xFFFF, 0, 1, 4, 0, 7, 0, 9] {
            sub.extend_from_slice(&v.to_be_bytes());
        }
        let len = sub.len() as u16;
        sub[2..4].copy_from_slice(&len.to_be_bytes());

        let mut cmap = Vec::new();
        for v in [0u16, 1, 0, 3] {
            cmap.extend_from_slice(&v.to_be_bytes());
        }
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(&sub);

        let map = CharMap::parse(&cmap, 20).unwrap();
        assert_eq!(map.glyph(0x30), Some(7));
        assert_eq!(map.glyph(0x31), None); // array entry 0
        assert_eq!(map.glyph(0x32), Some(9));
    }

    #[test]
    fn test_parse_inverse_many_to_one() {
        let cmap = encode_format4(&[(0x41, 3), (0xC5, 3), (0x42, 4)]).unwrap();
        let map = CharMap::parse(&cmap, 5).unwrap();
        assert_eq!(map.chars(3), &[0x41, 0xC5]);
        assert_eq!(map.chars(4), &[0x42]);
        assert!(map.chars(2).is_empty());
    }

    #[test]
    fn test_parse_drops_out_of_range_glyphs() {
        let cmap = encode_format4(&[(0x41, 1), (0x42, 50)]).unwrap();
        let map = CharMap::parse(&cmap, 10).unwrap();
        assert_eq!(map.glyph(0x41), Some(1));
        assert_eq!(map.glyph(0x42), None);
    }

    #[test]
    fn test_unsupported_format() {
        let mut cmap = Vec::new();
        for v in [0u16, 1, 3, 1] {
            cmap.extend_from_slice(&v.to_be_bytes());
        }
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(&12u16.to_be_bytes());
        cmap.extend_from_slice(&[0u8; 14]);
        let err = CharMap::parse(&cmap, 10).unwrap_err();
        assert!(matches!(err, FontError::UnsupportedCmapFormat { format: 12 }));
    }

    #[test]
    fn test_prefers_windows_bmp_over_unicode() {
        let win = encode_format4(&[(0x41, 1)]).unwrap();
        let uni = encode_format4(&[(0x41, 2)]).unwrap();
        let win_sub = &win[12..];
        let uni_sub = &uni[12..];

        let mut cmap = Vec::new();
        for v in [0u16, 2] {
            cmap.extend_from_slice(&v.to_be_bytes());
        }
        // Unicode record first in the directory, Windows second.
        cmap.extend_from_slice(&0u16.to_be_bytes());
        cmap.extend_from_slice(&3u16.to_be_bytes());
        cmap.extend_from_slice(&20u32.to_be_bytes());
        cmap.extend_from_slice(&3u16.to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&((20 + uni_sub.len()) as u32).to_be_bytes());
        cmap.extend_from_slice(uni_sub);
        cmap.extend_from_slice(win_sub);

        let map = CharMap::parse(&cmap, 5).unwrap();
        assert_eq!(map.glyph(0x41), Some(1));
    }

    #[test]
    fn test_missing_unicode_subtable() {
        let mut cmap = Vec::new();
        for v in [0u16, 1, 1, 0] {
            cmap.extend_from_slice(&v.to_be_bytes());
        }
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(&encode_format4(&[]).unwrap()[12..]);
        assert!(matches!(
            CharMap::parse(&cmap, 5),
            Err(FontError::MalformedFont(_))
        ));
    }

    #[test]
    fn test_encode_rejects_too_many_segments() {
        // Every other code point, so no runs merge.
        let pairs: Vec<(u16, u16)> = (0..MAX_FORMAT4_SEGMENTS as u16)
            .map(|i| (0x100 + i * 2, i + 1))
            .collect();
        let err = encode_format4(&pairs).unwrap_err();
        assert!(matches!(err, FontError::MalformedFont(ref m) if m.contains("format 4 limit")));

        // One fewer leaves room for the terminator.
        let cmap = encode_format4(&pairs[1..]).unwrap();
        let declared = peek_u16(&cmap, 14).unwrap() as usize;
        assert_eq!(declared, cmap.len() - 12);
        let map = CharMap::parse(&cmap, MAX_FORMAT4_SEGMENTS as u16 + 1).unwrap();
        assert_eq!(map.len(), MAX_FORMAT4_SEGMENTS - 1);
        assert_eq!(map.glyph(0x100 + 2), Some(2));
    }
}
